//! `shellkit_io_fs` v1:
//! Rust-side filesystem primitives for `mkdir -p` and `cp -r`.
//!
//! Modules:
//! - `kind`    : path classification (file / directory / symlink / missing)
//! - `ensure`  : recursive, idempotent directory creation
//! - `resolve` : `cp`-style destination resolution
//! - `copy`    : recursive tree copy and the composed `cp`
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod copy;
pub mod ensure;
pub mod kind;
pub mod report;
pub mod resolve;
pub mod spec;
mod util;

pub use copy::{copy_path, cp};
pub use ensure::ensure_dir;
pub use kind::{classify, classify_target};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use resolve::resolve_destination;
pub use spec::{EnumIoFsErrorKind, EnumPathKind, IoFsError, SpecCopyOptions};
