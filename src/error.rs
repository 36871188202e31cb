use miette::Diagnostic;
use thiserror::Error;

/// Main error type for assetmig operations
#[derive(Error, Diagnostic, Debug)]
pub enum MigrateError {
    #[error("IO error: {0}")]
    #[diagnostic(code(assetmig::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(assetmig::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(assetmig::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Cannot start migration: {message}")]
    #[diagnostic(code(assetmig::precondition))]
    Precondition {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown direction '{name}'")]
    #[diagnostic(
        code(assetmig::direction),
        help("Use one of S, SW, W, NW, N, NE, E, SE or disable strict_directions")
    )]
    UnknownDirection { name: String },

    #[error("Build error: {message}")]
    #[diagnostic(code(assetmig::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl MigrateError {
    /// Shorthand for an `Io` error carrying the path that failed.
    pub fn io(path: impl Into<std::path::PathBuf>, message: impl Into<String>) -> Self {
        MigrateError::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
