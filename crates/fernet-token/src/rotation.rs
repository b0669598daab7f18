//! Multi-key resolution for key rotation
//!
//! During a rotation several keys are live at once. A token is tried against
//! each candidate in caller-supplied priority order and the first key that
//! validates it wins. Callers learn only that no key matched, never which
//! keys were tried or why each one failed.

use crate::{
    config::{CheckOrder, ValidityWindow},
    error::ValidationError,
    key::Key,
    token::Token,
    validator::PayloadValidator,
};

impl Token {
    /// Validate against an ordered set of candidate keys and run `validator`
    /// on the plaintext from the first key that accepts the token.
    ///
    /// The validator runs exactly once. Its rejection is final: no further
    /// keys are tried.
    ///
    /// # Errors
    ///
    /// - `NoMatchingKey`: no candidate key validated the token (including an
    ///   empty key list)
    /// - `PayloadRejected`: the validator refused the authenticated payload
    pub fn validate_with_keys<'k, V>(
        &self,
        keys: impl IntoIterator<Item = &'k Key>,
        window: ValidityWindow,
        order: CheckOrder,
        validator: &V,
    ) -> Result<V::Output, ValidationError>
    where
        V: PayloadValidator + ?Sized,
    {
        let (index, plaintext) = self.resolve_key(keys, window, order)?;
        tracing::debug!(key_index = index, "token accepted");
        validator.validate(&plaintext).map_err(ValidationError::PayloadRejected)
    }

    /// Position of the first key in `keys` that validates this token, and the
    /// plaintext it produced.
    fn resolve_key<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k Key>,
        window: ValidityWindow,
        order: CheckOrder,
    ) -> Result<(usize, Vec<u8>), ValidationError> {
        let mut tried = 0usize;
        for (index, key) in keys.into_iter().enumerate() {
            tried += 1;
            if let Ok(plaintext) = self.validate_with_order(key, window, order) {
                return Ok((index, plaintext));
            }
        }

        tracing::debug!(candidates = tried, "no candidate key accepted token");
        Err(ValidationError::NoMatchingKey)
    }
}
