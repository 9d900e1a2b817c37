//! Recursive directory creation, like `mkdir -p`.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::spec::IoFsError;
use crate::util::validate_path_syntax;

/// Ensure a directory exists at `dir`, creating any missing ancestors.
///
/// Succeeds without touching the filesystem when `dir` already is a directory, including a
/// symlink to one. Fails with [`IoFsError::AlreadyExistsAsNonDirectory`] when `dir` or one of
/// its ancestors exists as something else.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<(), IoFsError> {
    let path_dir = dir.as_ref();
    validate_path_syntax(path_dir)?;
    create_missing_dirs(path_dir)?;
    Ok(())
}

/// Create `path_dir` and its missing ancestors, root-most first.
///
/// Returns how many directories were created.
pub(crate) fn create_missing_dirs(path_dir: &Path) -> Result<u64, IoFsError> {
    let mut l_missing = Vec::new();

    for path_cursor in path_dir.ancestors() {
        if path_cursor.as_os_str().is_empty() {
            break;
        }
        match fs::metadata(path_cursor) {
            Ok(meta) if meta.is_dir() => break,
            Ok(_) => {
                return Err(IoFsError::AlreadyExistsAsNonDirectory {
                    path: path_cursor.to_path_buf(),
                });
            }
            Err(e) if is_missing_error(&e) => {
                // A dangling symlink stats as missing but still occupies the name.
                if fs::symlink_metadata(path_cursor).is_ok() {
                    return Err(IoFsError::AlreadyExistsAsNonDirectory {
                        path: path_cursor.to_path_buf(),
                    });
                }
                l_missing.push(path_cursor);
            }
            Err(e) => return Err(IoFsError::io(path_cursor, e)),
        }
    }

    if l_missing.is_empty() {
        trace!("Directory already exists: `{}`", path_dir.display());
        return Ok(0);
    }

    let mut n_created = 0;
    for path_missing in l_missing.into_iter().rev() {
        match fs::create_dir(path_missing) {
            Ok(()) => {
                debug!("Created directory `{}`", path_missing.display());
                n_created += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                // Lost a race with a concurrent creator; fine as long as it is a directory.
                if !fs::metadata(path_missing).is_ok_and(|meta| meta.is_dir()) {
                    return Err(IoFsError::AlreadyExistsAsNonDirectory {
                        path: path_missing.to_path_buf(),
                    });
                }
            }
            Err(e) => return Err(IoFsError::io(path_missing, e)),
        }
    }
    Ok(n_created)
}

/// `NotFound`, or `NotADirectory` raised because some ancestor is a file; the walk towards the
/// root finds and reports that ancestor.
fn is_missing_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
