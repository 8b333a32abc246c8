//! Plugin discovery on search paths

use std::fs;
use std::path::{Path, PathBuf};

/// Check if a path looks like a dynamic library
pub fn is_library_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("so") | Some("dylib") | Some("dll")
    )
}

/// Expand search paths into plugin library paths.
///
/// Directories contribute their library files in name order; any other
/// path is kept as given so a missing file surfaces as a load error on
/// activation. Unreadable directories are skipped with a warning.
pub fn discover_plugins<I, P>(search_paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut found = Vec::new();

    for path in search_paths {
        let path = path.as_ref();
        if !path.is_dir() {
            found.push(path.to_path_buf());
            continue;
        }

        match fs::read_dir(path) {
            Ok(entries) => {
                let mut libraries: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && is_library_file(p))
                    .collect();
                libraries.sort();
                log::debug!("Found {} plugin(s) in '{}'", libraries.len(), path.display());
                found.extend(libraries);
            }
            Err(e) => log::warn!("Cannot scan plugin directory '{}': {}", path.display(), e),
        }
    }

    found
}
