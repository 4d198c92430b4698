use std::path::PathBuf;

/// Errors that cross the crate boundary.
///
/// Syntactic mismatches inside a page never end up here: they simply produce
/// no rewrite.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected {key} to be a string, got {found}")]
    Config { key: &'static str, found: &'static str },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("invalid file pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
