//! Token codec: configuration plus injected environment.
//!
//! [`TokenCodec`] is the entry point most applications need. It owns an
//! immutable [`FernetConfig`], a randomness source and a clock, and derives
//! the acceptance window from the clock on every validation.

use crate::{
    config::{FernetConfig, ValidityWindow},
    env::{Clock, Entropy, SystemEnv},
    error::{FernetError, TokenError, ValidationError},
    key::Key,
    token::Token,
    validator::PayloadValidator,
};

/// Issues and accepts Fernet tokens under a fixed policy.
///
/// Stateless apart from the injected `entropy` and `clock`; safe to share
/// across threads when both are.
#[derive(Debug, Clone)]
pub struct TokenCodec<E, C> {
    config: FernetConfig,
    entropy: E,
    clock: C,
}

impl TokenCodec<SystemEnv, SystemEnv> {
    /// Codec backed by the OS RNG and the system clock.
    pub fn with_system_env(config: FernetConfig) -> Self {
        Self::new(config, SystemEnv::new(), SystemEnv::new())
    }
}

impl<E: Entropy, C: Clock> TokenCodec<E, C> {
    /// Create a codec from a configuration, randomness source and clock.
    pub fn new(config: FernetConfig, entropy: E, clock: C) -> Self {
        Self { config, entropy, clock }
    }

    /// The codec's configuration.
    pub fn config(&self) -> &FernetConfig {
        &self.config
    }

    /// Generate a new random key from the codec's randomness source.
    pub fn generate_key(&self) -> Key {
        Key::generate(&self.entropy)
    }

    /// Encrypt and sign `plaintext` under `key`, stamped with the current time.
    pub fn generate(&self, key: &Key, plaintext: &[u8]) -> Token {
        Token::generate(&self.entropy, key, plaintext, &self.clock)
    }

    /// Encrypt `plaintext` and return the encoded token string.
    pub fn encrypt(&self, key: &Key, plaintext: &[u8]) -> String {
        self.generate(key, plaintext).encode()
    }

    /// Parse an encoded token.
    pub fn parse(&self, encoded: &str) -> Result<Token, TokenError> {
        Token::from_encoded(encoded)
    }

    /// Acceptance window as of now: `[now - ttl, now + max_clock_skew]`.
    pub fn window(&self) -> ValidityWindow {
        self.config.window_at(self.clock.now_secs())
    }

    /// Validate `token` against a single key and run `validator` on the
    /// plaintext.
    ///
    /// # Errors
    ///
    /// Single-key validation reports the specific reason code (see
    /// [`ValidationError`]), or `PayloadRejected` if the validator refuses.
    pub fn validate<V>(
        &self,
        token: &Token,
        key: &Key,
        validator: &V,
    ) -> Result<V::Output, ValidationError>
    where
        V: PayloadValidator + ?Sized,
    {
        let plaintext = token.validate_with_order(key, self.window(), self.config.check_order)?;
        validator.validate(&plaintext).map_err(ValidationError::PayloadRejected)
    }

    /// Validate `token` against candidate keys in priority order.
    ///
    /// # Errors
    ///
    /// - `NoMatchingKey`: no key accepted the token
    /// - `PayloadRejected`: the validator refused the payload
    pub fn validate_with_keys<'k, V>(
        &self,
        token: &Token,
        keys: impl IntoIterator<Item = &'k Key>,
        validator: &V,
    ) -> Result<V::Output, ValidationError>
    where
        V: PayloadValidator + ?Sized,
    {
        token.validate_with_keys(keys, self.window(), self.config.check_order, validator)
    }

    /// Parse `encoded` and validate it against candidate keys in one step.
    ///
    /// # Errors
    ///
    /// - `FernetError::Token`: the string is not a well-formed token
    /// - `FernetError::Validation`: see [`TokenCodec::validate_with_keys`]
    pub fn decrypt<'k, V>(
        &self,
        encoded: &str,
        keys: impl IntoIterator<Item = &'k Key>,
        validator: &V,
    ) -> Result<V::Output, FernetError>
    where
        V: PayloadValidator + ?Sized,
    {
        let token = self.parse(encoded)?;
        Ok(self.validate_with_keys(&token, keys, validator)?)
    }

    /// Whether `token` validates against `key` under the current window.
    pub fn is_valid(&self, token: &Token, key: &Key) -> bool {
        token.validate_with_order(key, self.window(), self.config.check_order).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::CheckOrder,
        env::FixedClock,
        validator::{BytesValidator, Utf8Validator},
    };

    struct OnesEntropy;

    impl Entropy for OnesEntropy {
        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(1);
        }
    }

    fn codec_at(now: i64) -> TokenCodec<OnesEntropy, FixedClock> {
        TokenCodec::new(FernetConfig::default(), OnesEntropy, FixedClock(now))
    }

    #[test]
    fn encrypt_then_decrypt() {
        let codec = codec_at(1_000);
        let key = codec.generate_key();
        let encoded = codec.encrypt(&key, b"Hello, world!");

        let plaintext = codec.decrypt(&encoded, [&key], &Utf8Validator).unwrap();
        assert_eq!(plaintext, "Hello, world!");
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let codec = codec_at(1_000);
        let key = codec.generate_key();
        let encoded = codec.encrypt(&key, b"");
        assert_eq!(codec.decrypt(&encoded, [&key], &Utf8Validator).unwrap(), "");
    }

    #[test]
    fn token_expires_after_ttl() {
        let key = Key::from_parts([1; 16], [2; 16]);
        let token = codec_at(1_000).generate(&key, b"x");

        assert!(codec_at(1_060).is_valid(&token, &key));
        assert_eq!(
            codec_at(1_061).validate(&token, &key, &BytesValidator),
            Err(ValidationError::Expired { timestamp: 1_000, earliest: 1_001 })
        );
    }

    #[test]
    fn token_from_future_rejected_beyond_skew() {
        let key = Key::from_parts([1; 16], [2; 16]);
        let token = codec_at(1_000).generate(&key, b"x");

        assert!(codec_at(940).is_valid(&token, &key));
        assert_eq!(
            codec_at(939).validate(&token, &key, &BytesValidator),
            Err(ValidationError::NotYetValid { timestamp: 1_000, latest: 999 })
        );
    }

    #[test]
    fn config_controls_window() {
        let config = FernetConfig::default()
            .with_time_to_live(Duration::from_secs(3_600))
            .with_max_clock_skew(Duration::ZERO)
            .with_check_order(CheckOrder::DecryptFirst);
        let codec = TokenCodec::new(config, OnesEntropy, FixedClock(10_000));

        assert_eq!(codec.window(), ValidityWindow::new(6_400, 10_000));
        assert_eq!(codec.config().check_order, CheckOrder::DecryptFirst);
    }

    #[test]
    fn decrypt_reports_parse_errors_distinctly() {
        let codec = codec_at(0);
        let key = codec.generate_key();
        let result = codec.decrypt("gAAA", [&key], &BytesValidator);
        assert!(matches!(result, Err(FernetError::Token(TokenError::MalformedToken { .. }))));
    }

    #[test]
    fn decrypt_with_wrong_key_is_no_matching_key() {
        let codec = codec_at(0);
        let key = Key::from_parts([1; 16], [2; 16]);
        let other = Key::from_parts([3; 16], [4; 16]);
        let encoded = codec.encrypt(&key, b"x");

        let result = codec.decrypt(&encoded, [&other], &BytesValidator);
        assert_eq!(result, Err(FernetError::Validation(ValidationError::NoMatchingKey)));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn values_are_send_and_sync() {
        assert_send_sync::<Key>();
        assert_send_sync::<Token>();
        assert_send_sync::<FernetConfig>();
        assert_send_sync::<ValidityWindow>();
        assert_send_sync::<SystemEnv>();
        assert_send_sync::<FixedClock>();
        assert_send_sync::<ValidationError>();
        assert_send_sync::<TokenCodec<SystemEnv, SystemEnv>>();
    }

    #[test]
    fn system_env_codec_roundtrips() {
        let codec = TokenCodec::with_system_env(FernetConfig::default());
        let key = codec.generate_key();
        let encoded = codec.encrypt(&key, b"live");
        assert_eq!(codec.decrypt(&encoded, [&key], &BytesValidator).unwrap(), b"live");
    }
}
