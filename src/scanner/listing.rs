//! Single-directory listing filtered by extension, minus the upload template.
//!
//! Two entry points share one scan:
//! - [`try_list_source_files`] returns a structured [`SfsError`] on failure.
//! - [`list_source_files`] never fails: it prints a one-line diagnostic to
//!   stdout and returns whatever was collected before the failure.
//!
//! Only entry names are inspected. Entries whose names are not valid UTF-8
//! cannot be returned as `String`; when such a name would otherwise match, the
//! best-effort listing reports it as [`SfsError::NonUtf8Name`] and moves on.

#![allow(missing_docs)]

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use crate::core::config::{DEFAULT_EXTENSION, ScannerConfig};
use crate::core::errors::{Result, SfsError};

/// Inputs of one listing. Reads no environment; callers populate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// Directory to list; `None` or empty means "not set".
    pub directory: Option<String>,
    /// Entry name compared by exact equality and never returned.
    pub exclude_name: Option<String>,
    /// Case-sensitive suffix every returned name ends with.
    pub extension: String,
    /// Return `directory + name` instead of `name`.
    pub full_path: bool,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            directory: None,
            exclude_name: None,
            extension: DEFAULT_EXTENSION.to_string(),
            full_path: true,
        }
    }
}

impl From<&ScannerConfig> for ListingRequest {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            exclude_name: config.exclude_name.clone(),
            extension: config.extension.clone(),
            full_path: config.full_path,
        }
    }
}

impl ListingRequest {
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    #[must_use]
    pub fn with_exclude_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_full_path(mut self, full_path: bool) -> Self {
        self.full_path = full_path;
        self
    }

    fn directory(&self) -> Option<&str> {
        self.directory.as_deref().filter(|dir| !dir.is_empty())
    }
}

/// Whether an entry name passes the exclusion and extension filters.
#[must_use]
pub fn entry_matches(name: &str, request: &ListingRequest) -> bool {
    request.exclude_name.as_deref() != Some(name) && name.ends_with(request.extension.as_str())
}

/// Format a matching entry name for output.
///
/// Full-path mode concatenates verbatim: `"/data"` + `"a.xlsx"` is `"/dataa.xlsx"`.
#[must_use]
pub fn format_entry(name: &str, request: &ListingRequest) -> String {
    match request.directory() {
        Some(dir) if request.full_path => format!("{dir}{name}"),
        _ => name.to_string(),
    }
}

/// List matching entries, or report why the directory could not be listed.
///
/// Entries with non-UTF-8 names are skipped without notice.
pub fn try_list_source_files(request: &ListingRequest) -> Result<Vec<String>> {
    let mut files = Vec::new();
    scan_into(request, &mut files, &mut |_: &SfsError| {})?;
    Ok(files)
}

/// Best-effort listing: never fails, prints a diagnostic line on failure.
pub fn list_source_files(request: &ListingRequest) -> Vec<String> {
    list_source_files_with(request, |err| {
        println!("[SFS-SCANNER] {}", err.diagnostic());
    })
}

/// Best-effort listing with a caller-supplied diagnostic sink.
///
/// `report` sees every skipped entry (see [`SfsError::is_skipped_entry`])
/// followed by at most one failure. The returned names are those collected
/// before the failure, which is empty unless reading failed mid-directory.
pub fn list_source_files_with<F>(request: &ListingRequest, mut report: F) -> Vec<String>
where
    F: FnMut(&SfsError),
{
    let mut files = Vec::new();
    if let Err(err) = scan_into(request, &mut files, &mut report) {
        report(&err);
    }
    files
}

fn scan_into(
    request: &ListingRequest,
    files: &mut Vec<String>,
    report: &mut dyn FnMut(&SfsError),
) -> Result<()> {
    let directory = request.directory().ok_or(SfsError::DirectoryUnset)?;
    let dir_path = Path::new(directory);

    match dir_path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(SfsError::DirectoryNotFound {
                path: dir_path.to_path_buf(),
            });
        }
        Err(err) => return Err(SfsError::io(dir_path, err)),
    }

    let entries = fs::read_dir(dir_path).map_err(|err| SfsError::io(dir_path, err))?;
    collect_matches(
        dir_path,
        entries.map(|entry| entry.map(|e| e.file_name())),
        request,
        files,
        report,
    )
}

fn collect_matches<I>(
    dir_path: &Path,
    names: I,
    request: &ListingRequest,
    files: &mut Vec<String>,
    report: &mut dyn FnMut(&SfsError),
) -> Result<()>
where
    I: IntoIterator<Item = io::Result<OsString>>,
{
    for name in names {
        let name = name.map_err(|err| SfsError::io(dir_path, err))?;
        let Some(utf8) = name.to_str() else {
            if entry_matches(&name.to_string_lossy(), request) {
                report(&SfsError::NonUtf8Name {
                    path: dir_path.join(&name),
                });
            }
            continue;
        };
        if entry_matches(utf8, request) {
            files.push(format_entry(utf8, request));
        }
    }
    Ok(())
}
