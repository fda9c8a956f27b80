//! Import path resolution and stdlib discovery.
//!
//! - `@stdlib/rest` resolves under the stdlib directory.
//! - Absolute paths are used as written.
//! - Anything else is relative to the importing file's directory.
//!
//! `.hml` is appended when missing and the result is canonicalised, so a
//! module reached through different spellings is cached once.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::LoadError;

/// Import prefix for the standard library.
pub const STDLIB_PREFIX: &str = "@stdlib/";

/// Source file extension.
pub const EXTENSION: &str = "hml";

/// Installed location probed last.
const INSTALLED_STDLIB: &str = "/usr/local/lib/hemlock/stdlib";

/// Resolve `import_path` as written in a module living in `importer_dir`.
///
/// Canonicalisation failures are not errors here: the uncanonicalised
/// path is returned so the subsequent read reports which file is missing.
pub fn resolve_path(
    import_path: &str,
    importer_dir: &Path,
    stdlib: Option<&Path>,
) -> Result<PathBuf, LoadError> {
    let joined = if let Some(rest) = import_path.strip_prefix(STDLIB_PREFIX) {
        let Some(stdlib) = stdlib else {
            return Err(LoadError::StdlibUnavailable {
                path: import_path.to_string(),
            });
        };
        stdlib.join(rest)
    } else {
        let path = Path::new(import_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            importer_dir.join(path)
        }
    };

    let with_extension = if joined.extension().is_some_and(|ext| ext == EXTENSION) {
        joined
    } else {
        let mut name = OsString::from(joined);
        name.push(".");
        name.push(EXTENSION);
        PathBuf::from(name)
    };

    Ok(with_extension
        .canonicalize()
        .unwrap_or(with_extension))
}

/// Probe for a stdlib directory: beside the executable, one level up,
/// the working directory, then the installed prefix.
pub fn discover_stdlib() -> Option<PathBuf> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("stdlib"));
        candidates.push(exe_dir.join("..").join("stdlib"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("stdlib"));
    }
    candidates.push(PathBuf::from(INSTALLED_STDLIB));

    let found = first_directory(candidates);
    match &found {
        Some(dir) => tracing::debug!(stdlib = %dir.display(), "found stdlib"),
        None => tracing::warn!("no stdlib directory found; @stdlib imports will fail"),
    }
    found
}

fn first_directory(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|dir| dir.is_dir())
        .map(|dir| dir.canonicalize().unwrap_or(dir))
}
