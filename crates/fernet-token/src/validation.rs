//! Token validation state machine
//!
//! Each step short-circuits. The two supported orders accept exactly the same
//! set of tokens; see [`CheckOrder`] for how they differ.
//!
//! ```text
//! VerifyFirst:   version -> freshness -> signature -> decrypt -> unpad
//! DecryptFirst:  version -> decrypt -> freshness -> signature -> unpad
//! ```

use crate::{
    cipher,
    config::{CheckOrder, ValidityWindow},
    error::ValidationError,
    key::Key,
    token::{Token, VERSION},
};

impl Token {
    /// Validate against `key` and return the plaintext.
    ///
    /// Uses [`CheckOrder::VerifyFirst`]: no ciphertext is decrypted before
    /// the HMAC has been verified.
    ///
    /// # Errors
    ///
    /// - `InvalidVersion`: version byte is not 0x80
    /// - `Expired` / `NotYetValid`: timestamp outside `window`
    /// - `InvalidSignature`: HMAC mismatch (wrong key or tampered token)
    /// - `DecryptionFailed` / `InvalidPadding`: cipher layer rejected the
    ///   ciphertext
    pub fn validate(&self, key: &Key, window: ValidityWindow) -> Result<Vec<u8>, ValidationError> {
        self.validate_with_order(key, window, CheckOrder::VerifyFirst)
    }

    /// Validate against `key` using an explicit step order.
    pub fn validate_with_order(
        &self,
        key: &Key,
        window: ValidityWindow,
        order: CheckOrder,
    ) -> Result<Vec<u8>, ValidationError> {
        let result = match order {
            CheckOrder::VerifyFirst => self.verify_then_decrypt(key, window),
            CheckOrder::DecryptFirst => self.decrypt_then_verify(key, window),
        };

        if let Err(reason) = &result {
            tracing::debug!(?reason, ?order, timestamp = self.timestamp(), "token rejected");
        }
        result
    }

    /// Whether the token validates against `key` within `window`.
    pub fn is_valid(&self, key: &Key, window: ValidityWindow) -> bool {
        self.validate(key, window).is_ok()
    }

    fn verify_then_decrypt(
        &self,
        key: &Key,
        window: ValidityWindow,
    ) -> Result<Vec<u8>, ValidationError> {
        self.check_version()?;
        self.check_freshness(window)?;
        self.check_signature(key)?;
        let padded = cipher::decrypt_blocks(key.encryption_key(), self.iv(), self.ciphertext())?;
        cipher::unpad(padded)
    }

    fn decrypt_then_verify(
        &self,
        key: &Key,
        window: ValidityWindow,
    ) -> Result<Vec<u8>, ValidationError> {
        self.check_version()?;
        let padded = cipher::decrypt_blocks(key.encryption_key(), self.iv(), self.ciphertext())?;
        self.check_freshness(window)?;
        self.check_signature(key)?;
        cipher::unpad(padded)
    }

    fn check_version(&self) -> Result<(), ValidationError> {
        if self.version() == VERSION {
            Ok(())
        } else {
            Err(ValidationError::InvalidVersion(self.version()))
        }
    }

    fn check_freshness(&self, window: ValidityWindow) -> Result<(), ValidationError> {
        let timestamp = self.timestamp();
        if timestamp < window.earliest {
            return Err(ValidationError::Expired { timestamp, earliest: window.earliest });
        }
        if timestamp > window.latest {
            return Err(ValidationError::NotYetValid { timestamp, latest: window.latest });
        }
        Ok(())
    }

    fn check_signature(&self, key: &Key) -> Result<(), ValidationError> {
        let authentic = key.verify_signature(
            self.version(),
            self.timestamp(),
            self.iv(),
            self.ciphertext(),
            self.signature(),
        );
        if authentic { Ok(()) } else { Err(ValidationError::InvalidSignature) }
    }
}
