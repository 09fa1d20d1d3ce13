#![forbid(unsafe_code)]

//! Source File Scanner (sfs): lists the raw data files waiting in a
//! directory, skipping the upload template.
//!
//! A listing keeps the entries of one directory whose names end with the
//! target extension (`.xlsx` by default) and differ from the exclusion
//! filename, optionally prefixed with the directory string.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use source_file_scanner::prelude::*;
//!
//! let request = ListingRequest::default()
//!     .with_directory("/data/raw/")
//!     .with_exclude_name("template.xlsx");
//! let files = list_source_files(&request);
//! ```
//!
//! Zero-argument use in a preconfigured environment reads
//! `RAW_DATA_BASE_DIR` and `UPLOAD_TEMPLATE`:
//!
//! ```rust,no_run
//! use source_file_scanner::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let request = ListingRequest::from(&ScannerConfig::from_env()?);
//! let files = try_list_source_files(&request)?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod scanner;
