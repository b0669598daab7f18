//! Payload validator hook.
//!
//! A validator turns authenticated plaintext into an application value. It
//! runs exactly once per accepted token, only after the version, freshness
//! and signature checks and decryption have all succeeded.

use std::fmt;

/// Reason a validator refused an authenticated payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRejection {
    reason: String,
}

impl PayloadRejection {
    /// Create a rejection with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// The rejection reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for PayloadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Strategy that accepts or rejects decrypted token contents.
///
/// Implementations must be pure: the same bytes always produce the same
/// outcome and nothing outside the return value changes.
pub trait PayloadValidator {
    /// Accepted application value
    type Output;

    /// Accept `plaintext` as an application value or reject it.
    fn validate(&self, plaintext: &[u8]) -> Result<Self::Output, PayloadRejection>;
}

impl<F, T> PayloadValidator for F
where
    F: Fn(&[u8]) -> Result<T, PayloadRejection>,
{
    type Output = T;

    fn validate(&self, plaintext: &[u8]) -> Result<T, PayloadRejection> {
        self(plaintext)
    }
}

/// Accepts any payload and returns the raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesValidator;

impl PayloadValidator for BytesValidator {
    type Output = Vec<u8>;

    fn validate(&self, plaintext: &[u8]) -> Result<Vec<u8>, PayloadRejection> {
        Ok(plaintext.to_vec())
    }
}

/// Accepts UTF-8 payloads and returns them as a `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Validator;

impl PayloadValidator for Utf8Validator {
    type Output = String;

    fn validate(&self, plaintext: &[u8]) -> Result<String, PayloadRejection> {
        std::str::from_utf8(plaintext)
            .map(str::to_owned)
            .map_err(|e| PayloadRejection::new(format!("payload is not UTF-8: {e}")))
    }
}
