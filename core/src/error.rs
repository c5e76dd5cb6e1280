use std::path::PathBuf;

/// Errors raised while building or persisting an index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk error: {0}")]
    Walk(String),

    #[error("{} is not valid UTF-8: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("store error: {0}")]
    Store(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("config error: {0}")]
    Config(String),

    /// A dictionary invariant was broken. Always a bug, never recoverable.
    #[error("index invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl From<sled::Error> for IndexError {
    fn from(err: sled::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<bincode::Error> for IndexError {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err.to_string())
    }
}
