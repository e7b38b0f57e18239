// Error types shared by the library modules. The binary wraps these in
// `anyhow::Error` at the top level; nothing in the library catches or
// retries them.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the copy can run into, grouped by where it happens.
#[derive(Error, Debug)]
pub enum Error {
    /// A required environment variable is absent (or not unicode).
    #[error("missing required environment variable `{0}`")]
    MissingEnv(&'static str),

    /// `AGAVE_SERVER` could not be turned into a URL.
    #[error("invalid API server `{server}`: {reason}")]
    InvalidServer { server: String, reason: String },

    /// The token endpoint refused the credentials.
    #[error("authentication failed: {status} - {message}")]
    Auth { status: u16, message: String },

    /// Transport-level failure (connect, TLS, body streaming).
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The files API answered with an error.
    #[error("{operation} failed: {status} - {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// Local filesystem access failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local name cannot be expressed as a remote path segment.
    #[error("file name is not valid UTF-8: {0:?}")]
    NonUtf8Name(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
