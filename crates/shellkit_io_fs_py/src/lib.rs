use std::collections::BTreeMap;

use pyo3::exceptions::{
    PyFileExistsError, PyFileNotFoundError, PyIsADirectoryError, PyNotADirectoryError,
    PyOSError, PyValueError,
};
use pyo3::prelude::*;
use shellkit_io_fs::{
    IoFsError, ReportCopy, SpecCopyOptions, cp, ensure_dir, resolve_destination,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "shellkit.fs.cp.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportCopy")]
#[derive(Debug, Clone)]
struct PyReportCopy {
    #[pyo3(get)]
    cnt_files_copied: u64,
    #[pyo3(get)]
    cnt_files_overwritten: u64,
    #[pyo3(get)]
    cnt_dirs_created: u64,
    #[pyo3(get)]
    cnt_dirs_merged: u64,
    #[pyo3(get)]
    cnt_symlinks_created: u64,
    #[pyo3(get)]
    cnt_bytes_copied: u64,
    report_copy: ReportCopy,
}

impl From<ReportCopy> for PyReportCopy {
    fn from(report_copy: ReportCopy) -> Self {
        Self {
            cnt_files_copied: report_copy.cnt_files_copied,
            cnt_files_overwritten: report_copy.cnt_files_overwritten,
            cnt_dirs_created: report_copy.cnt_dirs_created,
            cnt_dirs_merged: report_copy.cnt_dirs_merged,
            cnt_symlinks_created: report_copy.cnt_symlinks_created,
            cnt_bytes_copied: report_copy.cnt_bytes_copied,
            report_copy,
        }
    }
}

#[pymethods]
impl PyReportCopy {
    #[getter]
    fn entry_count(&self) -> u64 {
        self.report_copy.entry_count()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.report_copy.to_dict()
    }

    #[pyo3(signature = (prefix = "[COPY]"))]
    fn format(&self, prefix: &str) -> String {
        self.report_copy.format(prefix)
    }

    fn __str__(&self) -> String {
        self.report_copy.to_string()
    }
}

fn map_io_fs_error(exception: IoFsError) -> PyErr {
    let message = exception.to_string();
    match exception {
        IoFsError::NotFound { .. } => PyFileNotFoundError::new_err(message),
        IoFsError::AlreadyExists { .. } => PyFileExistsError::new_err(message),
        IoFsError::AlreadyExistsAsNonDirectory { .. } => PyNotADirectoryError::new_err(message),
        IoFsError::TypeMismatch { .. } => PyIsADirectoryError::new_err(message),
        IoFsError::InvalidPath { .. } | IoFsError::CopyIntoSelf { .. } => {
            PyValueError::new_err(message)
        }
        IoFsError::Unsupported { .. } | IoFsError::Io { .. } => PyOSError::new_err(message),
    }
}

#[pyfunction(name = "ensure_dir")]
fn ensure_dir_py(py: Python<'_>, dir: String) -> PyResult<()> {
    py.allow_threads(|| ensure_dir(dir))
        .map_err(map_io_fs_error)
}

#[pyfunction(name = "resolve_destination")]
fn resolve_destination_py(py: Python<'_>, source: String, destination: String) -> PyResult<String> {
    let path_resolved = py
        .allow_threads(|| resolve_destination(source, destination))
        .map_err(map_io_fs_error)?;
    Ok(path_resolved.to_string_lossy().to_string())
}

#[pyfunction(name = "copy")]
#[pyo3(signature = (source, destination, force = false, preserve_timestamps = false))]
fn copy_py(
    py: Python<'_>,
    source: String,
    destination: String,
    force: bool,
    preserve_timestamps: bool,
) -> PyResult<PyReportCopy> {
    let spec_cp_options = SpecCopyOptions {
        force,
        preserve_timestamps,
    };

    let report_copy = py.allow_threads(|| cp(source, destination, spec_cp_options));
    let report_copy = report_copy.map_err(map_io_fs_error)?;
    Ok(PyReportCopy::from(report_copy))
}

#[pymodule]
fn _shellkit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportCopy>()?;
    module.add_function(wrap_pyfunction!(ensure_dir_py, module)?)?;
    module.add_function(wrap_pyfunction!(resolve_destination_py, module)?)?;
    module.add_function(wrap_pyfunction!(copy_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
