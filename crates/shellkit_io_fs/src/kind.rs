//! Path classification.

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

use crate::spec::{EnumPathKind, IoFsError};

/// Classify `path` without following a symlink at its final component.
///
/// A missing path yields [`EnumPathKind::Missing`]; any other metadata failure (permission
/// denied, a parent component that is not a directory) is returned as [`IoFsError::Io`].
pub fn classify<P: AsRef<Path>>(path: P) -> Result<EnumPathKind, IoFsError> {
    let path = path.as_ref();
    let enum_kind = match fs::symlink_metadata(path) {
        Ok(meta) => EnumPathKind::from_file_type(meta.file_type()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => EnumPathKind::Missing,
        Err(e) => return Err(IoFsError::io(path, e)),
    };
    trace!("Classified `{}` as {enum_kind}", path.display());
    Ok(enum_kind)
}

/// Classify what `path` ultimately points at, following symlinks.
///
/// Never returns [`EnumPathKind::Symlink`]; a dangling link is [`EnumPathKind::Missing`].
pub fn classify_target<P: AsRef<Path>>(path: P) -> Result<EnumPathKind, IoFsError> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) => Ok(EnumPathKind::from_file_type(meta.file_type())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EnumPathKind::Missing),
        Err(e) => Err(IoFsError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, classify_target};
    use crate::spec::{EnumIoFsErrorKind, EnumPathKind};
    use crate::util::testing::{TestDir, write_text};

    #[test]
    fn classify_reports_each_kind() {
        let tmp = TestDir::new();
        let path_file = tmp.path().join("file.txt");
        write_text(&path_file, "x");

        assert_eq!(classify(tmp.path()).expect("dir"), EnumPathKind::Directory);
        assert_eq!(classify(&path_file).expect("file"), EnumPathKind::File);
        assert_eq!(
            classify(tmp.path().join("absent")).expect("missing"),
            EnumPathKind::Missing
        );
    }

    #[cfg(unix)]
    #[test]
    fn classify_inspects_the_link_not_its_target() {
        use std::os::unix::fs::symlink;

        let tmp = TestDir::new();
        let path_dir = tmp.path().join("real");
        std::fs::create_dir(&path_dir).expect("mkdir");
        let path_link = tmp.path().join("link");
        symlink(&path_dir, &path_link).expect("create symlink");
        let path_dangling = tmp.path().join("dangling");
        symlink(tmp.path().join("nowhere"), &path_dangling).expect("create symlink");

        assert_eq!(classify(&path_link).expect("link"), EnumPathKind::Symlink);
        assert_eq!(
            classify_target(&path_link).expect("link target"),
            EnumPathKind::Directory
        );
        assert_eq!(
            classify(&path_dangling).expect("dangling"),
            EnumPathKind::Symlink
        );
        assert_eq!(
            classify_target(&path_dangling).expect("dangling target"),
            EnumPathKind::Missing
        );
    }

    #[cfg(unix)]
    #[test]
    fn classify_propagates_not_a_directory() {
        let tmp = TestDir::new();
        let path_file = tmp.path().join("file.txt");
        write_text(&path_file, "x");

        let err = classify(path_file.join("child")).expect_err("must fail");
        assert_eq!(err.kind(), EnumIoFsErrorKind::Io);
        assert_eq!(err.path(), path_file.join("child"));
    }
}
