//! CLI error types.

use fernet_token::{FernetError, KeyError, TokenError, ValidationError};
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid invocation (no key supplied, empty input, etc.).
    ///
    /// Fix the arguments and retry.
    #[error("usage error: {0}")]
    Usage(String),

    /// A key argument could not be decoded.
    ///
    /// The index is the key's position in the `--key` list, so the key itself
    /// never reaches the terminal or logs.
    #[error("key #{index} rejected: {source}")]
    Key {
        /// Zero-based position of the key in the argument list
        index: usize,
        /// Decoding failure
        source: KeyError,
    },

    /// The token string is not a well-formed Fernet token.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The token did not validate.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reading stdin or writing stdout failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FernetError> for CliError {
    fn from(err: FernetError) -> Self {
        match err {
            FernetError::Key(err) => Self::Usage(err.to_string()),
            FernetError::Token(err) => Self::Token(err),
            FernetError::Validation(err) => Self::Validation(err),
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Rejected tokens exit with 1 so scripts can branch on validity;
    /// everything else is a usage or environment problem and exits with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Token(_) | Self::Validation(_) => 1,
            Self::Usage(_) | Self::Key { .. } | Self::Io(_) => 2,
        }
    }
}
