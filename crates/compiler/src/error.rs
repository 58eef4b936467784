use std::path::PathBuf;

use convgen_asciidoctor::ValidationError;
use thiserror::Error;

/// Failure of a converter compile run.
///
/// `E` is the error type of the template engine in use.
#[derive(Debug, Error)]
pub enum CompilerError<E: std::error::Error + 'static> {
    /// The templates directory does not exist.
    #[error("Templates directory '{}' does not exist", .0.display())]
    TemplatesDirNotFound(PathBuf),
    /// Reading the templates directory or one of its files failed.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The assembled converter configuration was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The template engine failed to compile a template.
    #[error(transparent)]
    Engine(E),
}

impl<E: std::error::Error + 'static> CompilerError<E> {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
