use std::path::{Path, PathBuf};

use log::debug;
use walkdir::{DirEntry, WalkDir};

use crate::RunOptions;

/// Leading character of hidden files and directories
pub const HIDDEN_MARKER: char = '.';

pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

fn is_hidden_entry(entry: &DirEntry) -> bool {
    is_hidden(&entry.file_name().to_string_lossy())
}

/// Recursively list the files under `root`.
///
/// Hidden entries are pruned before descent, so nothing inside a hidden
/// directory is ever visited. The root itself is never treated as hidden,
/// and a root that is a file yields just that file. Every call performs a
/// fresh walk; sibling order is whatever the filesystem returns.
pub fn walk<'a>(
    root: &Path,
    options: &'a RunOptions,
) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| {
            if entry.depth() == 0 || !is_hidden_entry(entry) {
                return true;
            }
            if options.debug {
                debug!("Skipping hidden entry {}", entry.path().display());
            }
            false
        })
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => Some(Ok(entry.into_path())),
            Err(err) => Some(Err(err)),
        })
}
