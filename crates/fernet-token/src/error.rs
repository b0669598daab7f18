//! Error types for key handling, token parsing and token validation

use thiserror::Error;

use crate::validator::PayloadRejection;

/// Errors from constructing or decoding a [`crate::Key`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// One half of the key is not exactly 128 bits
    #[error("invalid {field} key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Which half of the key was rejected ("signing" or "encryption")
        field: &'static str,
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// The encoded key is not base64url or does not decode to 32 bytes
    #[error("invalid key encoding: {reason}")]
    InvalidKeyEncoding {
        /// Reason the encoded key was rejected
        reason: String,
    },
}

/// Errors from constructing or parsing a [`crate::Token`]
///
/// These are structural problems with the token bytes. They are reported
/// before any key is involved and never depend on secret material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token bytes are the wrong length or the ciphertext is not block aligned
    #[error("malformed token: {reason}")]
    MalformedToken {
        /// Reason the token was rejected
        reason: String,
    },

    /// Version byte is not 0x80
    #[error("unsupported token version: {0:#04x}")]
    InvalidVersion(u8),

    /// Token string is not valid base64url
    #[error("token is not valid base64url")]
    InvalidEncoding,
}

/// Reasons a well-formed token is rejected during validation
///
/// `DecryptionFailed`, `InvalidPadding` and `InvalidSignature` render the
/// same message so that logs and error strings handed back to a peer do not
/// act as a padding or signature oracle. The variant itself is the
/// diagnostic reason code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Version byte is not 0x80
    #[error("unsupported token version: {0:#04x}")]
    InvalidVersion(u8),

    /// The cipher layer rejected the ciphertext
    #[error("token integrity check failed")]
    DecryptionFailed,

    /// Decrypted plaintext does not carry valid PKCS#7 padding
    #[error("token integrity check failed")]
    InvalidPadding,

    /// Token timestamp is older than the earliest acceptable timestamp
    #[error("token expired: issued at {timestamp}, earliest accepted {earliest}")]
    Expired {
        /// Token timestamp (seconds since epoch)
        timestamp: i64,
        /// Earliest accepted timestamp
        earliest: i64,
    },

    /// Token timestamp is beyond the allowed clock skew
    #[error("token not yet valid: issued at {timestamp}, latest accepted {latest}")]
    NotYetValid {
        /// Token timestamp (seconds since epoch)
        timestamp: i64,
        /// Latest accepted timestamp
        latest: i64,
    },

    /// HMAC does not match the token contents
    #[error("token integrity check failed")]
    InvalidSignature,

    /// No candidate key validated the token
    #[error("no candidate key accepted the token")]
    NoMatchingKey,

    /// The validator hook rejected the authenticated payload
    #[error("payload rejected: {0}")]
    PayloadRejected(PayloadRejection),
}

impl ValidationError {
    /// Returns true if the token failed a cryptographic integrity check.
    ///
    /// Callers that surface errors to untrusted peers should treat all of
    /// these identically.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::DecryptionFailed | Self::InvalidPadding | Self::InvalidSignature)
    }

    /// Returns true if the token was rejected only because of its timestamp.
    pub fn is_freshness_failure(&self) -> bool {
        matches!(self, Self::Expired { .. } | Self::NotYetValid { .. })
    }
}

/// Any error produced while issuing or accepting a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FernetError {
    /// Key construction or decoding failed
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Token parsing failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
