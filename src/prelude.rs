//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use source_file_scanner::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, ScannerConfig};
pub use crate::core::errors::{Result, SfsError};

// Scanner
pub use crate::scanner::listing::{
    ListingRequest, list_source_files, list_source_files_with, try_list_source_files,
};

// Logger
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
