//! Source tree scanner.
//!
//! Walks the base directory bottom-up and produces one [`DirectoryRecord`]
//! per directory, listing its immediate subdirectories and the files whose
//! name ends with the requested extension.
//!
//! Names are kept as [`OsString`]s so files whose names are not valid UTF-8
//! are still found. Symlinked directories are listed as subdirectories of
//! their parent but are not descended into.

use anyhow::Result;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Contents of one directory of the source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Directory path, as reached from the scan base.
    pub root: PathBuf,
    /// Names of immediate subdirectories.
    pub subdirectories: Vec<OsString>,
    /// Names of immediate files matching the source extension.
    pub files: Vec<OsString>,
}

impl DirectoryRecord {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }
}

/// Exact, case-sensitive `.<extension>` suffix check on the raw name bytes.
pub fn has_extension(name: &OsStr, extension: &str) -> bool {
    let name = name.as_encoded_bytes();
    let extension = extension.as_bytes();
    name.len() > extension.len()
        && name.ends_with(extension)
        && name[..name.len() - extension.len()].ends_with(b".")
}

/// Scan `base` and return a record for every directory in the tree.
///
/// Records come out bottom-up: a directory's record follows the records of
/// all its descendants, and `base` itself is last. Entries that cannot be read
/// are skipped.
pub fn scan_tree(base: &Path, extension: &str) -> Result<Vec<DirectoryRecord>> {
    if extension.is_empty() {
        anyhow::bail!("Source extension cannot be empty");
    }
    if !base.exists() {
        anyhow::bail!("Base directory does not exist: {:?}", base);
    }
    if !base.is_dir() {
        anyhow::bail!("Base path is not a directory: {:?}", base);
    }

    info!("Scanning {:?} for .{} files", base, extension);

    let mut pending: HashMap<PathBuf, DirectoryRecord> = HashMap::new();
    let mut records = Vec::new();

    for entry in WalkDir::new(base).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        // Symlinks are not followed, so only real directories get a record.
        let walked_dir = entry.file_type().is_dir();

        if entry.depth() > 0 {
            if let Some(parent) = entry.path().parent() {
                let name = entry.file_name();
                let record = pending
                    .entry(parent.to_path_buf())
                    .or_insert_with(|| DirectoryRecord::new(parent.to_path_buf()));
                if walked_dir || (entry.path_is_symlink() && entry.path().is_dir()) {
                    if !walked_dir {
                        debug!("Listing symlinked directory {:?}", entry.path());
                    }
                    record.subdirectories.push(name.to_os_string());
                } else if has_extension(name, extension) {
                    record.files.push(name.to_os_string());
                }
            }
        }

        if walked_dir {
            let record = pending
                .remove(entry.path())
                .unwrap_or_else(|| DirectoryRecord::new(entry.path().to_path_buf()));
            records.push(record);
        }
    }

    let file_count: usize = records.iter().map(|r| r.files.len()).sum();
    info!(
        "Scan complete: {} directories, {} matching files",
        records.len(),
        file_count
    );

    Ok(records)
}
