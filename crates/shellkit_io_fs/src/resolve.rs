//! `cp`-style destination resolution.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::kind::{classify, classify_target};
use crate::spec::{EnumPathKind, IoFsError};
use crate::util::{basename_of, validate_path_syntax};

/// Compute the literal path a copy of `source` to `destination` writes to.
///
/// An existing directory (or symlink to one) at `destination` means "copy into": the result
/// is `destination/<basename of source>`. Anything else, including a missing path, is used
/// verbatim. The kind of `source` plays no part. Read-only.
pub fn resolve_destination<P, Q>(source: P, destination: Q) -> Result<PathBuf, IoFsError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = source.as_ref();
    let path_dst = destination.as_ref();
    validate_path_syntax(path_dst)?;

    let b_is_dir = match classify(path_dst)? {
        EnumPathKind::Directory => true,
        EnumPathKind::Symlink => classify_target(path_dst)? == EnumPathKind::Directory,
        EnumPathKind::Missing | EnumPathKind::File | EnumPathKind::Special => false,
    };
    if !b_is_dir {
        return Ok(path_dst.to_path_buf());
    }

    let path_resolved = path_dst.join(basename_of(path_src)?);
    trace!(
        "Destination `{}` is a directory; copying into `{}`",
        path_dst.display(),
        path_resolved.display()
    );
    Ok(path_resolved)
}

#[cfg(test)]
mod tests {
    use super::resolve_destination;
    use crate::spec::EnumIoFsErrorKind;
    use crate::util::testing::{TestDir, write_text};

    #[test]
    fn missing_destination_is_used_verbatim() {
        let tmp = TestDir::new();
        let path_dst = tmp.path().join("absent");

        for source in ["a/foo", "a/dir/", "whatever"] {
            assert_eq!(
                resolve_destination(source, &path_dst).expect("resolve"),
                path_dst
            );
        }
    }

    #[test]
    fn existing_directory_receives_source_basename() {
        let tmp = TestDir::new();

        assert_eq!(
            resolve_destination("a/foo", tmp.path()).expect("resolve"),
            tmp.path().join("foo")
        );
        assert_eq!(
            resolve_destination("a/src/", tmp.path()).expect("resolve"),
            tmp.path().join("src")
        );
    }

    #[test]
    fn existing_file_is_used_verbatim() {
        let tmp = TestDir::new();
        let path_dst = tmp.path().join("target.txt");
        write_text(&path_dst, "bar");

        assert_eq!(
            resolve_destination("a/dir", &path_dst).expect("resolve"),
            path_dst
        );
    }

    #[test]
    fn directory_destination_requires_source_basename() {
        let tmp = TestDir::new();

        let err = resolve_destination("..", tmp.path()).expect_err("no basename");
        assert_eq!(err.kind(), EnumIoFsErrorKind::InvalidPath);
    }

    #[test]
    fn resolve_does_not_touch_filesystem() {
        let tmp = TestDir::new();
        let path_dst = tmp.path().join("x").join("y");

        let path_resolved = resolve_destination("src", &path_dst).expect("resolve");
        assert_eq!(path_resolved, path_dst);
        assert!(!tmp.path().join("x").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_directory_counts_as_directory() {
        use std::os::unix::fs::symlink;

        let tmp = TestDir::new();
        let path_real = tmp.path().join("real");
        std::fs::create_dir(&path_real).expect("mkdir");
        let path_link = tmp.path().join("link");
        symlink(&path_real, &path_link).expect("create symlink");
        let path_link_file = tmp.path().join("link_file");
        write_text(&tmp.path().join("file.txt"), "x");
        symlink(tmp.path().join("file.txt"), &path_link_file).expect("create symlink");

        assert_eq!(
            resolve_destination("foo", &path_link).expect("resolve"),
            path_link.join("foo")
        );
        assert_eq!(
            resolve_destination("foo", &path_link_file).expect("resolve"),
            path_link_file
        );
    }
}
