use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::{FileTime, set_file_times};
use tracing::trace;

use crate::spec::IoFsError;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Reject paths the filesystem would refuse or silently truncate.
pub(crate) fn validate_path_syntax(path: &Path) -> Result<(), IoFsError> {
    if path.as_os_str().is_empty() {
        return Err(IoFsError::invalid_path(path, "path must not be empty"));
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        if path.as_os_str().as_bytes().contains(&0) {
            return Err(IoFsError::invalid_path(path, "path contains a NUL byte"));
        }
    }
    #[cfg(not(unix))]
    {
        let c_path = path.to_string_lossy();
        if c_path.contains('\0') {
            return Err(IoFsError::invalid_path(path, "path contains a NUL byte"));
        }
        #[cfg(windows)]
        for component in path.components() {
            if let std::path::Component::Normal(part) = component
                && part
                    .to_string_lossy()
                    .chars()
                    .any(|c| matches!(c, '<' | '>' | '"' | '|' | '?' | '*'))
            {
                return Err(IoFsError::invalid_path(
                    path,
                    "path contains a character reserved on Windows",
                ));
            }
        }
    }

    Ok(())
}

/// Final component of `path`, failing for paths like `..` or `/` that have none.
pub(crate) fn basename_of(path: &Path) -> Result<&OsStr, IoFsError> {
    path.file_name()
        .ok_or_else(|| IoFsError::invalid_path(path, "path has no base name"))
}

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Absolute form of `path` with its longest existing parent chain canonicalized.
///
/// The final component is never resolved, so a symlink compares as the link itself.
fn _normalize_parent_path(path: &Path) -> PathBuf {
    let path_abs = _absolutize_path(path);
    let Some(name_last) = path_abs.file_name() else {
        return fs::canonicalize(&path_abs).unwrap_or(path_abs);
    };

    let mut l_tail = vec![name_last];
    let mut path_cursor = path_abs.parent();
    while let Some(path_parent) = path_cursor {
        if let Ok(mut path_resolved) = fs::canonicalize(path_parent) {
            for part in l_tail.iter().rev() {
                path_resolved.push(part);
            }
            return path_resolved;
        }
        match path_parent.file_name() {
            Some(name_parent) => l_tail.push(name_parent),
            None => break,
        }
        path_cursor = path_parent.parent();
    }
    path_abs
}

/// `true` when `path_dst` is `path_src` itself or, for directories, lies beneath it.
pub(crate) fn is_copy_into_self(path_src: &Path, path_dst: &Path, if_src_is_dir: bool) -> bool {
    let path_src_resolved = _normalize_parent_path(path_src);
    let path_dst_resolved = _normalize_parent_path(path_dst);
    if path_src_resolved == path_dst_resolved {
        return true;
    }
    if_src_is_dir && path_dst_resolved.starts_with(&path_src_resolved)
}

/// `true` when the existing directory `path_dir` resolves to `path_root_resolved` or below it.
///
/// `path_root_resolved` must already be canonical.
pub(crate) fn is_dir_inside(
    path_dir: &Path,
    path_root_resolved: &Path,
) -> Result<bool, IoFsError> {
    let path_dir_resolved =
        fs::canonicalize(path_dir).map_err(|e| IoFsError::io(path_dir, e))?;
    Ok(path_dir_resolved.starts_with(path_root_resolved))
}

/// `true` when both paths name the same file on disk, e.g. hard links of one inode.
pub(crate) fn is_same_entry(path_src: &Path, path_dst: &Path) -> Result<bool, IoFsError> {
    same_file::is_same_file(path_src, path_dst).map_err(|e| IoFsError::io(path_dst, e))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region EntryPrimitives

/// Remove a non-directory entry (file, symlink, special file) before replacing it.
pub(crate) fn remove_entry(path: &Path) -> Result<(), IoFsError> {
    trace!("Removing `{}` before replacement", path.display());
    fs::remove_file(path).map_err(|e| IoFsError::io(path, e))
}

/// Recreate the symlink at `path_src` as `path_dst`, keeping the raw target string.
pub(crate) fn create_symbolic_link(path_src: &Path, path_dst: &Path) -> Result<(), IoFsError> {
    let target = fs::read_link(path_src).map_err(|e| IoFsError::io(path_src, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        symlink(&target, path_dst).map_err(|e| IoFsError::io(path_dst, e))
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let res = if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        };
        res.map_err(|e| IoFsError::io(path_dst, e))
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        Err(IoFsError::Unsupported {
            path: path_src.to_path_buf(),
        })
    }
}

/// Stream bytes (and permission bits) from `path_file_src` to `path_file_dst`.
///
/// Returns the number of bytes copied.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_timestamps: bool,
) -> Result<u64, IoFsError> {
    let n_bytes =
        fs::copy(path_file_src, path_file_dst).map_err(|e| IoFsError::io(path_file_dst, e))?;
    if if_preserve_timestamps {
        apply_timestamps(path_file_src, path_file_dst)?;
    }
    Ok(n_bytes)
}

fn apply_timestamps(path_file_src: &Path, path_file_dst: &Path) -> Result<(), IoFsError> {
    let stat_src = fs::metadata(path_file_src).map_err(|e| IoFsError::io(path_file_src, e))?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
        .map_err(|e| IoFsError::io(path_file_dst, e))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::Path;

    use super::testing::{TestDir, write_text};
    use super::{
        basename_of, is_copy_into_self, is_dir_inside, is_same_entry, validate_path_syntax,
    };
    use crate::spec::EnumIoFsErrorKind;

    #[test]
    fn validate_rejects_empty_and_nul_paths() {
        let err = validate_path_syntax(Path::new("")).expect_err("empty must fail");
        assert_eq!(err.kind(), EnumIoFsErrorKind::InvalidPath);

        let err = validate_path_syntax(Path::new("dir\0name")).expect_err("nul must fail");
        assert_eq!(err.kind(), EnumIoFsErrorKind::InvalidPath);

        assert!(validate_path_syntax(Path::new("plain/dir")).is_ok());
    }

    #[test]
    fn basename_ignores_trailing_separator() {
        assert_eq!(
            basename_of(Path::new("a/src/")).expect("basename"),
            OsStr::new("src")
        );
        assert!(basename_of(Path::new("..")).is_err());
    }

    #[test]
    fn copy_into_self_detects_same_path_and_subdirectory() {
        let tmp = TestDir::new();
        let src = tmp.path().join("src");
        write_text(&src.join("a.txt"), "a");

        assert!(is_copy_into_self(&src, &src, true));
        assert!(is_copy_into_self(&src, &src.join("nested/deeper"), true));
        assert!(!is_copy_into_self(&src, &tmp.path().join("src_copy"), true));
        assert!(!is_copy_into_self(
            &src.join("a.txt"),
            &src.join("b.txt"),
            false
        ));
        assert!(!is_copy_into_self(&src.join("a.txt"), &src.join("a.txt/x"), false));
    }

    #[cfg(unix)]
    #[test]
    fn copy_into_self_sees_through_symlinked_parent() {
        use std::os::unix::fs::symlink;

        let tmp = TestDir::new();
        let src = tmp.path().join("src");
        write_text(&src.join("a.txt"), "a");
        symlink(&src, tmp.path().join("alias")).expect("create symlink");

        assert!(is_copy_into_self(
            &src,
            &tmp.path().join("alias").join("inner"),
            true
        ));
    }

    #[cfg(unix)]
    #[test]
    fn same_entry_detects_hard_links() {
        let tmp = TestDir::new();
        let path_a = tmp.path().join("a.txt");
        let path_b = tmp.path().join("b.txt");
        let path_c = tmp.path().join("c.txt");
        write_text(&path_a, "same");
        write_text(&path_c, "same");
        std::fs::hard_link(&path_a, &path_b).expect("hard link");

        assert!(is_same_entry(&path_a, &path_b).expect("compare"));
        assert!(!is_same_entry(&path_a, &path_c).expect("compare"));
    }

    #[test]
    fn dir_inside_compares_resolved_paths() {
        let tmp = TestDir::new();
        let path_root = tmp.path().join("root");
        std::fs::create_dir_all(path_root.join("sub")).expect("mkdir");
        let path_root_resolved = std::fs::canonicalize(&path_root).expect("canonicalize");

        assert!(is_dir_inside(&path_root, &path_root_resolved).expect("check"));
        assert!(is_dir_inside(&path_root.join("sub"), &path_root_resolved).expect("check"));
        assert!(!is_dir_inside(tmp.path(), &path_root_resolved).expect("check"));
    }
}
