//! Copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters for one `copy_path` / `cp` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportCopy {
    /// Regular files written to a previously missing destination.
    pub cnt_files_copied: u64,
    /// Regular files or symlinks that replaced an existing destination entry (`force`).
    pub cnt_files_overwritten: u64,
    /// Directories created while ensuring destination directories.
    pub cnt_dirs_created: u64,
    /// Source directories merged into an already existing destination directory.
    pub cnt_dirs_merged: u64,
    /// Symlinks recreated at the destination.
    pub cnt_symlinks_created: u64,
    /// Bytes streamed by regular-file copies.
    pub cnt_bytes_copied: u64,
}

impl ReportCopy {
    /// Number of destination entries written or created.
    pub fn entry_count(&self) -> u64 {
        self.cnt_files_copied
            + self.cnt_files_overwritten
            + self.cnt_dirs_created
            + self.cnt_symlinks_created
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_files_copied".to_string(), self.cnt_files_copied);
        dict_counts.insert(
            "cnt_files_overwritten".to_string(),
            self.cnt_files_overwritten,
        );
        dict_counts.insert("cnt_dirs_created".to_string(), self.cnt_dirs_created);
        dict_counts.insert("cnt_dirs_merged".to_string(), self.cnt_dirs_merged);
        dict_counts.insert(
            "cnt_symlinks_created".to_string(),
            self.cnt_symlinks_created,
        );
        dict_counts.insert("cnt_bytes_copied".to_string(), self.cnt_bytes_copied);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} files={} overwritten={} dirs_created={} dirs_merged={} symlinks={} bytes={}",
            self.cnt_files_copied,
            self.cnt_files_overwritten,
            self.cnt_dirs_created,
            self.cnt_dirs_merged,
            self.cnt_symlinks_created,
            self.cnt_bytes_copied
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    report: ReportCopy,
}

impl ReportCopyBuilder {
    /// Record one regular file copy of `n_bytes`.
    pub fn add_file(&mut self, n_bytes: u64, if_overwritten: bool) {
        if if_overwritten {
            self.report.cnt_files_overwritten += 1;
        } else {
            self.report.cnt_files_copied += 1;
        }
        self.report.cnt_bytes_copied += n_bytes;
    }

    /// Record one recreated symlink.
    pub fn add_symlink(&mut self, if_overwritten: bool) {
        if if_overwritten {
            self.report.cnt_files_overwritten += 1;
        }
        self.report.cnt_symlinks_created += 1;
    }

    /// Record `n_dirs` newly created directories.
    pub fn add_dirs_created(&mut self, n_dirs: u64) {
        self.report.cnt_dirs_created += n_dirs;
    }

    /// Record one directory merged into an existing destination.
    pub fn add_dir_merged(&mut self) {
        self.report.cnt_dirs_merged += 1;
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportCopy, ReportCopyBuilder};

    #[test]
    fn report_copy_to_dict_and_format_agree() {
        let report = ReportCopy {
            cnt_files_copied: 5,
            cnt_files_overwritten: 1,
            cnt_dirs_created: 2,
            cnt_dirs_merged: 1,
            cnt_symlinks_created: 3,
            cnt_bytes_copied: 42,
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_files_copied"], 5);
        assert_eq!(dict_counts["cnt_files_overwritten"], 1);
        assert_eq!(dict_counts["cnt_dirs_created"], 2);
        assert_eq!(dict_counts["cnt_dirs_merged"], 1);
        assert_eq!(dict_counts["cnt_symlinks_created"], 3);
        assert_eq!(dict_counts["cnt_bytes_copied"], 42);
        assert_eq!(report.entry_count(), 11);

        let txt = report.format("[COPY]");
        assert_eq!(
            txt,
            "[COPY] files=5 overwritten=1 dirs_created=2 dirs_merged=1 symlinks=3 bytes=42"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_splits_fresh_and_overwritten_entries() {
        let mut builder_cp_report = ReportCopyBuilder::default();
        builder_cp_report.add_file(3, false);
        builder_cp_report.add_file(4, true);
        builder_cp_report.add_symlink(true);
        builder_cp_report.add_dirs_created(2);
        builder_cp_report.add_dir_merged();

        let report = builder_cp_report.build();
        assert_eq!(report.cnt_files_copied, 1);
        assert_eq!(report.cnt_files_overwritten, 2);
        assert_eq!(report.cnt_symlinks_created, 1);
        assert_eq!(report.cnt_bytes_copied, 7);
        assert_eq!(report.cnt_dirs_created, 2);
        assert_eq!(report.cnt_dirs_merged, 1);
    }
}
