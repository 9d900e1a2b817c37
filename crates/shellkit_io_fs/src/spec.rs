//! Path kinds, copy options and the error taxonomy shared by every operation.

use std::fmt;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// What a path currently denotes on disk.
///
/// Recomputed on demand; the filesystem is the only source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPathKind {
    /// Nothing exists at the path.
    Missing,
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (the link itself, not its target).
    Symlink,
    /// FIFO, socket, device node or any other non-regular entry.
    Special,
}

impl EnumPathKind {
    pub(crate) fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Special
        }
    }
}

impl fmt::Display for EnumPathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_name = match self {
            Self::Missing => "missing",
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Special => "special file",
        };
        f.write_str(c_name)
    }
}

/// Flat tag for [`IoFsError`], convenient for callers that only branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumIoFsErrorKind {
    NotFound,
    AlreadyExists,
    AlreadyExistsAsNonDirectory,
    TypeMismatch,
    InvalidPath,
    CopyIntoSelf,
    Unsupported,
    Io,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for [`crate::copy_path`] and [`crate::cp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecCopyOptions {
    /// Replace existing destination files (and file-like symlinks) instead of failing.
    pub force: bool,
    /// Carry access/modification times of copied regular files over to the destination.
    pub preserve_timestamps: bool,
}

/// Failure of a directory-ensure or copy call.
///
/// Every variant names the path the failure concerns.
#[derive(Debug, Error)]
pub enum IoFsError {
    /// Copy source does not exist.
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// Destination entry exists and `force` is not set.
    #[error("Destination already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },
    /// Directory creation is blocked by an existing non-directory entry.
    #[error("Path exists and is not a directory: {}", path.display())]
    AlreadyExistsAsNonDirectory { path: PathBuf },
    /// Source and destination kinds cannot be reconciled (e.g. file over directory).
    #[error(
        "Cannot copy {kind_src} {} over {kind_dst} {}",
        path_src.display(),
        path_dst.display()
    )]
    TypeMismatch {
        path_src: PathBuf,
        kind_src: EnumPathKind,
        path_dst: PathBuf,
        kind_dst: EnumPathKind,
    },
    /// Path syntax rejected before reaching the filesystem.
    #[error("Invalid path {path:?}: {message}")]
    InvalidPath { path: PathBuf, message: String },
    /// Destination is the source itself or lies inside the source directory.
    #[error(
        "Cannot copy {} into itself or one of its subdirectories: {}",
        path_src.display(),
        path_dst.display()
    )]
    CopyIntoSelf { path_src: PathBuf, path_dst: PathBuf },
    /// Source entry kind is not copyable (sockets, FIFOs, devices).
    #[error("Unsupported file type: {}", path.display())]
    Unsupported { path: PathBuf },
    /// Underlying filesystem call failed.
    #[error("Failed to access {}: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}

impl IoFsError {
    pub(crate) fn io(path: &Path, err: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            err,
        }
    }

    pub(crate) fn invalid_path(path: &Path, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Failure class without the payload.
    pub fn kind(&self) -> EnumIoFsErrorKind {
        match self {
            Self::NotFound { .. } => EnumIoFsErrorKind::NotFound,
            Self::AlreadyExists { .. } => EnumIoFsErrorKind::AlreadyExists,
            Self::AlreadyExistsAsNonDirectory { .. } => {
                EnumIoFsErrorKind::AlreadyExistsAsNonDirectory
            }
            Self::TypeMismatch { .. } => EnumIoFsErrorKind::TypeMismatch,
            Self::InvalidPath { .. } => EnumIoFsErrorKind::InvalidPath,
            Self::CopyIntoSelf { .. } => EnumIoFsErrorKind::CopyIntoSelf,
            Self::Unsupported { .. } => EnumIoFsErrorKind::Unsupported,
            Self::Io { .. } => EnumIoFsErrorKind::Io,
        }
    }

    /// The path the failure concerns (the destination for kind conflicts).
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::AlreadyExists { path }
            | Self::AlreadyExistsAsNonDirectory { path }
            | Self::InvalidPath { path, .. }
            | Self::Unsupported { path }
            | Self::Io { path, .. } => path,
            Self::TypeMismatch { path_dst, .. } | Self::CopyIntoSelf { path_dst, .. } => path_dst,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
