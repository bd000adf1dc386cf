//! Input discovery: turn CLI path arguments into [`SourceInput`]s.
//!
//! - A directory is walked recursively; only files with a known source
//!   extension are taken, and vendored/VCS directories are skipped.
//! - An argument containing `*`, `?` or `[` is expanded as a glob.
//! - Anything else is taken as a file, even when its extension is unknown,
//!   so the report can say why it was skipped.

use crate::engine::SourceInput;
use crate::error::Error;
use crate::language::profile_for_path;
use glob::glob;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".sift",
    "node_modules",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
];

/// Resolve `args` (relative to `repo_root` when not absolute) into a sorted,
/// de-duplicated file list. No arguments means the whole repo root.
pub fn discover(args: &[String], repo_root: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = BTreeSet::new();
    let roots: Vec<String> = if args.is_empty() {
        vec![".".to_string()]
    } else {
        args.to_vec()
    };
    for arg in &roots {
        let path = if arg == "." {
            repo_root.to_path_buf()
        } else if Path::new(arg).is_absolute() {
            PathBuf::from(arg)
        } else {
            repo_root.join(arg)
        };
        if arg.contains(['*', '?', '[']) {
            let pattern = path.to_string_lossy().to_string();
            let entries = glob(&pattern).map_err(|source| Error::Pattern {
                pattern: arg.clone(),
                source,
            })?;
            for p in entries.flatten() {
                let rel = p.strip_prefix(repo_root).unwrap_or(&p);
                if p.is_file() && !in_skipped_dir(rel) {
                    files.insert(p);
                }
            }
        } else if path.is_dir() {
            walk(&path, &mut files)?;
        } else {
            files.insert(path);
        }
    }
    debug!(count = files.len(), "discovered files");
    Ok(files.into_iter().collect())
}

fn walk(dir: &Path, files: &mut BTreeSet<PathBuf>) -> Result<(), Error> {
    let pattern = dir.join("**").join("*").to_string_lossy().to_string();
    let entries = glob(&pattern).map_err(|source| Error::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    for p in entries.flatten() {
        let rel = p.strip_prefix(dir).unwrap_or(&p);
        if p.is_file() && !in_skipped_dir(rel) && profile_for_path(&p).is_some() {
            files.insert(p);
        }
    }
    Ok(())
}

fn in_skipped_dir(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n)),
        _ => false,
    })
}

/// Path shown in reports: relative to `repo_root` when inside it.
pub fn display_path(path: &Path, repo_root: &Path) -> String {
    let shown = match pathdiff::diff_paths(path, repo_root) {
        Some(rel) if !rel.starts_with("..") => rel,
        _ => path.to_path_buf(),
    };
    shown.to_string_lossy().replace('\\', "/")
}

/// Read every file in parallel. Read failures are kept per file.
pub fn read_inputs(files: &[PathBuf], repo_root: &Path) -> Vec<SourceInput> {
    files
        .par_iter()
        .map(|p| SourceInput {
            path: display_path(p, repo_root),
            text: fs::read_to_string(p),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "x = 1\n").unwrap();
    }

    #[test]
    fn test_directory_walk_filters_and_sorts() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/b.py");
        touch(root, "src/a.ts");
        touch(root, "README.md");
        touch(root, "node_modules/pkg/index.js");
        touch(root, ".git/hooks/pre-commit.sh");
        let files = discover(&[], root).unwrap();
        let shown: Vec<String> = files.iter().map(|p| display_path(p, root)).collect();
        assert_eq!(shown, vec!["src/a.ts", "src/b.py"]);
    }

    #[test]
    fn test_explicit_files_and_globs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "notes.txt");
        touch(root, "lib/one.py");
        touch(root, "lib/two.py");
        touch(root, "lib/three.js");
        let files = discover(&["notes.txt".into(), "lib/*.py".into()], root).unwrap();
        let shown: Vec<String> = files.iter().map(|p| display_path(p, root)).collect();
        assert_eq!(shown, vec!["lib/one.py", "lib/two.py", "notes.txt"]);
    }

    #[test]
    fn test_missing_file_becomes_read_error() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let files = discover(&["nope.py".into()], root).unwrap();
        let inputs = read_inputs(&files, root);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].path, "nope.py");
        assert!(inputs[0].text.is_err());
    }

    #[test]
    fn test_bad_glob_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover(&["src/[".into()], dir.path()),
            Err(Error::Pattern { .. })
        ));
    }
}
