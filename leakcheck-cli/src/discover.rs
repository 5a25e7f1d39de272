//! Recursive filesystem discovery of source files (spec.md §6.1), the
//! external collaborator that turns CLI positional arguments into a
//! concrete file list for the core pipeline.
//!
//! A file argument is yielded directly (subject to extension filtering); a
//! directory argument is walked recursively, pruning any directory matched
//! by an exclusion before descending into it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{LeakcheckError, Result};

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "h", "hpp", "cc", "cxx", "hxx"];

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True when `path`'s basename, an interior path component, or a
/// trailing-separator-plus-name suffix matches one of `excludes`.
fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    if excludes.is_empty() {
        return false;
    }
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .map(|name| excludes.iter().any(|ex| ex == name))
            .unwrap_or(false)
    })
}

/// Discovers every source file reachable from `paths`, pruning any
/// directory matched by `excludes`, in input-path order, deduplicated by
/// canonicalized absolute path (falling back to the as-given path if
/// canonicalization fails, e.g. a dangling symlink).
pub fn discover(paths: &[PathBuf], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for path in paths {
        if path.is_file() {
            if has_source_extension(path) {
                push_unique(&mut seen, &mut out, path.clone());
            }
            continue;
        }

        let walker = WalkDir::new(path)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), excludes));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    // A failure reading the root path itself means the scan
                    // can't proceed at all; a failure deeper in the tree
                    // (e.g. an unreadable subdirectory) is tolerated and the
                    // rest of the walk continues.
                    if source.depth() == 0 {
                        return Err(LeakcheckError::Walk {
                            path: path.clone(),
                            source,
                        });
                    }
                    tracing::warn!(path = %path.display(), error = %source, "skipping unreadable entry");
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry_path.is_file() && has_source_extension(entry_path) {
                push_unique(&mut seen, &mut out, entry_path.to_path_buf());
            }
        }
    }

    Ok(out)
}

fn push_unique(seen: &mut HashSet<PathBuf>, out: &mut Vec<PathBuf>, path: PathBuf) {
    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
    if seen.insert(key.clone()) {
        out.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let full = dir.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, "").unwrap();
    }

    #[test]
    fn finds_recognized_extensions_only() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.cpp");
        touch(tmp.path(), "b.txt");
        touch(tmp.path(), "c.hpp");

        let found = discover(&[tmp.path().to_path_buf()], &[]).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.cpp".to_string()));
        assert!(names.contains(&"c.hpp".to_string()));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Weird.CPP");

        let found = discover(&[tmp.path().to_path_buf()], &[]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn excluded_directory_is_pruned() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "keep/a.cpp");
        touch(tmp.path(), "vendor/skip.cpp");

        let found = discover(&[tmp.path().to_path_buf()], &["vendor".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name().unwrap(), "a.cpp");
    }

    #[test]
    fn a_single_file_path_is_yielded_directly_even_if_excluded_elsewhere() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "only.cpp");
        let file = tmp.path().join("only.cpp");

        let found = discover(&[file.clone()], &[]).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn duplicate_paths_are_deduplicated() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.cpp");
        let file = tmp.path().join("a.cpp");

        let found = discover(&[file.clone(), file.clone()], &[]).unwrap();
        assert_eq!(found.len(), 1);
    }
}
