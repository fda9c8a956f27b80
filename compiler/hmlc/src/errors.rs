//! Errors raised while loading or executing a module graph.

use std::path::PathBuf;

use hml_eval::EvalError;
use hml_ir::line_col;
use hml_parse::ParseError;

/// A failure anywhere in resolve, parse, link or execute.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot find module '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} parse error(s) in '{}'", errors.len(), path.display())]
    Parse {
        path: PathBuf,
        source_text: String,
        errors: Vec<ParseError>,
    },

    #[error("circular dependency detected: {chain}")]
    CircularDependency { chain: String },

    #[error("cannot resolve '{path}': no stdlib directory was found")]
    StdlibUnavailable { path: String },

    #[error("'{name}' is not exported by '{}'", module.display())]
    UnresolvedImport { name: String, module: PathBuf },

    #[error("{error}")]
    Runtime {
        path: PathBuf,
        location: Option<(usize, usize)>,
        #[source]
        error: EvalError,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path }
        } else {
            LoadError::Io { path, source }
        }
    }

    /// Attach the module path and, when the error has a span, its line
    /// and column in `source_text`.
    pub(crate) fn runtime(path: PathBuf, source_text: &str, error: EvalError) -> Self {
        let location = error.span.map(|span| line_col(source_text, span.start));
        LoadError::Runtime {
            path,
            location,
            error,
        }
    }

    /// Every line of the error report, as the CLI prints it.
    pub fn report(&self) -> Vec<String> {
        match self {
            LoadError::Parse {
                path,
                source_text,
                errors,
            } => errors
                .iter()
                .map(|err| {
                    let (line, col) = line_col(source_text, err.span.start);
                    format!("{}:{line}:{col}: {}", path.display(), err.message)
                })
                .collect(),
            LoadError::Runtime {
                path,
                location,
                error,
            } => {
                let mut lines = vec![format!("Runtime error: {}", error.message)];
                if let Some((line, col)) = location {
                    lines.push(format!("  at {}:{line}:{col}", path.display()));
                }
                lines
            }
            other => vec![format!("error: {other}")],
        }
    }
}
