//! Recursive tree copy and the composed `cp` entry point.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::ensure::create_missing_dirs;
use crate::kind::{classify, classify_target};
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::resolve::resolve_destination;
use crate::spec::{EnumPathKind, IoFsError, SpecCopyOptions};
use crate::util::{
    copy_file_with_metadata, create_symbolic_link, is_copy_into_self, is_dir_inside,
    is_same_entry, remove_entry, validate_path_syntax,
};

#[derive(Debug)]
struct SpecCopyContext {
    spec_cp_options: SpecCopyOptions,
    /// Canonical source root for directory copies; no merge target may lie inside it.
    path_src_root_resolved: Option<PathBuf>,
    builder_cp_report: ReportCopyBuilder,
}

/// Copy `source` to `destination`, resolving `destination` the way `cp` does first.
///
/// If `destination` is an existing directory the source lands inside it under its own base
/// name; otherwise `destination` is the exact copy location. See [`copy_path`] for the copy
/// rules.
pub fn cp<P, Q>(
    source: P,
    destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, IoFsError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = source.as_ref();
    validate_path_syntax(path_src)?;
    let path_dst = resolve_destination(path_src, destination)?;
    copy_path(path_src, path_dst, spec_cp_options)
}

/// Copy a file, directory or symlink tree from `source` to the already resolved `destination`.
///
/// Rules, applied to every node of the tree:
/// - symlinks are recreated with the same target string, never dereferenced;
/// - regular files are copied to missing destinations; an existing destination file fails with
///   [`IoFsError::AlreadyExists`] unless `force` is set, in which case it is replaced;
/// - directories are merged into existing destination directories, so destination entries
///   absent from the source survive;
/// - a file/directory kind conflict fails with [`IoFsError::TypeMismatch`].
///
/// A missing source fails with [`IoFsError::NotFound`] before anything is written. Failures
/// abort the traversal without undoing entries that were already copied.
pub fn copy_path<P, Q>(
    source: P,
    destination: Q,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, IoFsError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = source.as_ref();
    let path_dst = destination.as_ref();
    validate_path_syntax(path_src)?;
    validate_path_syntax(path_dst)?;

    let enum_kind_src = classify(path_src)?;
    match enum_kind_src {
        EnumPathKind::Missing => {
            return Err(IoFsError::NotFound {
                path: path_src.to_path_buf(),
            });
        }
        EnumPathKind::Special => {
            return Err(IoFsError::Unsupported {
                path: path_src.to_path_buf(),
            });
        }
        EnumPathKind::File | EnumPathKind::Directory | EnumPathKind::Symlink => {}
    }
    if is_copy_into_self(
        path_src,
        path_dst,
        enum_kind_src == EnumPathKind::Directory,
    ) {
        return Err(IoFsError::CopyIntoSelf {
            path_src: path_src.to_path_buf(),
            path_dst: path_dst.to_path_buf(),
        });
    }

    let path_src_root_resolved = match enum_kind_src {
        EnumPathKind::Directory => {
            Some(fs::canonicalize(path_src).map_err(|e| IoFsError::io(path_src, e))?)
        }
        _ => None,
    };
    let mut spec_cp_ctx = SpecCopyContext {
        spec_cp_options,
        path_src_root_resolved,
        builder_cp_report: ReportCopyBuilder::default(),
    };
    copy_node(path_src, enum_kind_src, path_dst, &mut spec_cp_ctx)?;

    let report_copy = spec_cp_ctx.builder_cp_report.build();
    debug!(
        "Copied `{}` to `{}`: {report_copy}",
        path_src.display(),
        path_dst.display()
    );
    Ok(report_copy)
}

fn copy_node(
    path_src: &Path,
    enum_kind_src: EnumPathKind,
    path_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<(), IoFsError> {
    match enum_kind_src {
        EnumPathKind::Symlink => copy_symlink_entry(path_src, path_dst, spec_cp_ctx),
        EnumPathKind::File => copy_file_entry(path_src, path_dst, spec_cp_ctx),
        EnumPathKind::Directory => copy_dir_entry(path_src, path_dst, spec_cp_ctx),
        // The entry vanished between listing and visiting.
        EnumPathKind::Missing => Err(IoFsError::NotFound {
            path: path_src.to_path_buf(),
        }),
        EnumPathKind::Special => Err(IoFsError::Unsupported {
            path: path_src.to_path_buf(),
        }),
    }
}

/// Apply the overwrite policy to an existing non-directory destination entry.
///
/// Returns `true` when the entry is to be replaced.
fn check_file_conflict(
    path_src: &Path,
    enum_kind_src: EnumPathKind,
    path_dst: &Path,
    spec_cp_ctx: &SpecCopyContext,
) -> Result<bool, IoFsError> {
    let enum_kind_dst = classify(path_dst)?;
    match enum_kind_dst {
        EnumPathKind::Missing => Ok(false),
        EnumPathKind::Directory => Err(IoFsError::TypeMismatch {
            path_src: path_src.to_path_buf(),
            kind_src: enum_kind_src,
            path_dst: path_dst.to_path_buf(),
            kind_dst: enum_kind_dst,
        }),
        EnumPathKind::File | EnumPathKind::Symlink | EnumPathKind::Special => {
            if !spec_cp_ctx.spec_cp_options.force {
                return Err(IoFsError::AlreadyExists {
                    path: path_dst.to_path_buf(),
                });
            }
            match (enum_kind_src, enum_kind_dst) {
                // Truncating a hard link of the source would wipe the source itself.
                (EnumPathKind::File, EnumPathKind::File) => {
                    if is_same_entry(path_src, path_dst)? {
                        return Err(IoFsError::CopyIntoSelf {
                            path_src: path_src.to_path_buf(),
                            path_dst: path_dst.to_path_buf(),
                        });
                    }
                }
                // Links and special entries are removed so new content never goes through them.
                _ => remove_entry(path_dst)?,
            }
            Ok(true)
        }
    }
}

fn copy_symlink_entry(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<(), IoFsError> {
    let if_overwritten =
        check_file_conflict(path_src, EnumPathKind::Symlink, path_dst, spec_cp_ctx)?;
    create_symbolic_link(path_src, path_dst)?;
    debug!(
        "Recreated symlink `{}` -> `{}`",
        path_src.display(),
        path_dst.display()
    );
    spec_cp_ctx.builder_cp_report.add_symlink(if_overwritten);
    Ok(())
}

fn copy_file_entry(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<(), IoFsError> {
    let if_overwritten = check_file_conflict(path_src, EnumPathKind::File, path_dst, spec_cp_ctx)?;
    if if_overwritten {
        debug!("Overwriting `{}`", path_dst.display());
    }
    let n_bytes = copy_file_with_metadata(
        path_src,
        path_dst,
        spec_cp_ctx.spec_cp_options.preserve_timestamps,
    )?;
    trace!(
        "Copied {n_bytes} bytes from `{}` to `{}`",
        path_src.display(),
        path_dst.display()
    );
    spec_cp_ctx.builder_cp_report.add_file(n_bytes, if_overwritten);
    Ok(())
}

fn copy_dir_entry(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_ctx: &mut SpecCopyContext,
) -> Result<(), IoFsError> {
    let enum_kind_dst = classify(path_dst)?;
    let b_dst_is_dir = match enum_kind_dst {
        EnumPathKind::Missing => false,
        EnumPathKind::Directory => true,
        EnumPathKind::Symlink => classify_target(path_dst)? == EnumPathKind::Directory,
        EnumPathKind::File | EnumPathKind::Special => false,
    };

    if b_dst_is_dir {
        // A merge target reached through links must not alias any part of the source tree.
        if let Some(path_src_root_resolved) = &spec_cp_ctx.path_src_root_resolved
            && is_dir_inside(path_dst, path_src_root_resolved)?
        {
            return Err(IoFsError::CopyIntoSelf {
                path_src: path_src.to_path_buf(),
                path_dst: path_dst.to_path_buf(),
            });
        }
        trace!("Merging into existing directory `{}`", path_dst.display());
        spec_cp_ctx.builder_cp_report.add_dir_merged();
    } else if enum_kind_dst == EnumPathKind::Missing {
        let n_created = create_missing_dirs(path_dst)?;
        spec_cp_ctx.builder_cp_report.add_dirs_created(n_created);
    } else {
        return Err(IoFsError::TypeMismatch {
            path_src: path_src.to_path_buf(),
            kind_src: EnumPathKind::Directory,
            path_dst: path_dst.to_path_buf(),
            kind_dst: enum_kind_dst,
        });
    }

    let mut l_names: Vec<OsString> = Vec::new();
    for _entry_res in fs::read_dir(path_src).map_err(|e| IoFsError::io(path_src, e))? {
        let entry = _entry_res.map_err(|e| IoFsError::io(path_src, e))?;
        l_names.push(entry.file_name());
    }
    l_names.sort();

    for name_entry in l_names {
        let path_src_sub = path_src.join(&name_entry);
        let path_dst_sub = path_dst.join(&name_entry);
        let enum_kind_src_sub = classify(&path_src_sub)?;
        copy_node(
            &path_src_sub,
            enum_kind_src_sub,
            &path_dst_sub,
            spec_cp_ctx,
        )?;
    }
    Ok(())
}
