use std::path::PathBuf;

use thiserror::Error;

/// Every failure is fatal; the variant decides the process exit code.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A flag is missing its value, or no data kind was requested.
    #[error("{0}")]
    ParameterExpected(String),

    /// Unknown flag or a value of the wrong shape.
    #[error("{0}")]
    ParameterType(String),

    /// Flags that cannot be combined.
    #[error("{0}")]
    ModeMismatch(String),

    /// Bad geometry, color budget exceeded, unknown pixel color.
    #[error("{0}")]
    InvalidValue(String),

    /// An output file is required but was not given.
    #[error("{0}")]
    FileExpected(String),

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::ParameterExpected(_) => 1,
            ConvertError::ParameterType(_) => 2,
            ConvertError::ModeMismatch(_) => 3,
            ConvertError::InvalidValue(_) => 4,
            ConvertError::FileExpected(_) | ConvertError::Read { .. } | ConvertError::Io(_) => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
