//! Output path policy.

use std::path::{Path, PathBuf};

/// Extension the species table is written with.
pub const NATIVE_EXTENSION: &str = "parquet";

/// Used when the requested output path does not carry [`NATIVE_EXTENSION`].
pub const FALLBACK_OUTPUT: &str = "lhe_analysis.parquet";

/// Everything after the first dot of the file name, if the name has more
/// than one dot; otherwise the plain extension.
///
/// `run.tar.parquet` → `tar.parquet`, `run.parquet` → `parquet`.
pub fn full_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let (_, rest) = name.split_once('.')?;
    Some(rest.to_string())
}

/// Path the table will actually be written to.
///
/// A path whose full extension is not `parquet` is replaced by
/// [`FALLBACK_OUTPUT`] in the working directory, with a warning.
pub fn resolve_output_path(requested: &Path) -> PathBuf {
    match full_extension(requested) {
        Some(ext) if ext == NATIVE_EXTENSION => requested.to_path_buf(),
        ext => {
            tracing::warn!(
                requested = %requested.display(),
                extension = ext.as_deref().unwrap_or(""),
                fallback = FALLBACK_OUTPUT,
                "output must be a .{NATIVE_EXTENSION} file, writing to the default path instead"
            );
            PathBuf::from(FALLBACK_OUTPUT)
        }
    }
}
