//! Fernet command-line tool.
//!
//! Thin layer over [`fernet_token`]: argument parsing lives in the binary,
//! while the commands here take already-parsed inputs and return the text to
//! print, so they can be tested without a terminal.
//!
//! # Commands
//!
//! - `keygen`: print a fresh random key
//! - `encrypt`: issue a token under the first key
//! - `decrypt`: validate a token against every key, in order
//! - `inspect`: show the public fields of a token without any key

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;

use std::time::Duration;

pub use error::CliError;
use fernet_token::{
    BytesValidator, CheckOrder, Clock, Entropy, FernetConfig, Key, Token, TokenCodec,
    Utf8Validator,
};

/// Validation policy collected from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyArgs {
    /// Token lifetime in seconds
    pub ttl_secs: u64,
    /// Allowed clock skew in seconds
    pub max_clock_skew_secs: u64,
    /// Use the reference decrypt-before-verify order
    pub decrypt_first: bool,
}

impl Default for PolicyArgs {
    fn default() -> Self {
        Self { ttl_secs: 60, max_clock_skew_secs: 60, decrypt_first: false }
    }
}

impl PolicyArgs {
    /// Build the library configuration for these arguments.
    pub fn to_config(self) -> FernetConfig {
        let order = if self.decrypt_first { CheckOrder::DecryptFirst } else { CheckOrder::VerifyFirst };
        FernetConfig::default()
            .with_time_to_live(Duration::from_secs(self.ttl_secs))
            .with_max_clock_skew(Duration::from_secs(self.max_clock_skew_secs))
            .with_check_order(order)
    }
}

/// Decode `--key` arguments in the order given.
///
/// # Errors
///
/// - `Usage`: no keys supplied
/// - `Key`: a key is not a valid encoded Fernet key
pub fn parse_keys(encoded: &[String]) -> Result<Vec<Key>, CliError> {
    if encoded.is_empty() {
        return Err(CliError::Usage("at least one --key (or FERNET_KEY) is required".to_string()));
    }
    encoded
        .iter()
        .enumerate()
        .map(|(index, s)| Key::from_encoded(s).map_err(|source| CliError::Key { index, source }))
        .collect()
}

/// Generate a key and return its encoded form.
pub fn keygen<E: Entropy, C: Clock>(codec: &TokenCodec<E, C>) -> String {
    codec.generate_key().serialize()
}

/// Issue a token for `plaintext` under the first key.
///
/// # Errors
///
/// - `Usage`: no keys supplied
pub fn encrypt<E: Entropy, C: Clock>(
    codec: &TokenCodec<E, C>,
    keys: &[Key],
    plaintext: &[u8],
) -> Result<String, CliError> {
    let key = keys.first().ok_or_else(|| CliError::Usage("no key to encrypt with".to_string()))?;
    let token = codec.encrypt(key, plaintext);
    tracing::debug!(plaintext_len = plaintext.len(), "issued token");
    Ok(token)
}

/// Validate `encoded` against `keys` and return the plaintext.
///
/// Without `binary` the payload must be UTF-8.
///
/// # Errors
///
/// - `Token`: the input is not a well-formed token
/// - `Validation`: no key accepted the token, or the payload is not UTF-8
pub fn decrypt<E: Entropy, C: Clock>(
    codec: &TokenCodec<E, C>,
    keys: &[Key],
    encoded: &str,
    binary: bool,
) -> Result<Vec<u8>, CliError> {
    let plaintext = if binary {
        codec.decrypt(encoded, keys, &BytesValidator)?
    } else {
        codec.decrypt(encoded, keys, &Utf8Validator)?.into_bytes()
    };
    tracing::debug!(candidates = keys.len(), "token accepted");
    Ok(plaintext)
}

/// Describe the public fields of a token. No key is involved, so nothing
/// here is authenticated.
///
/// # Errors
///
/// - `Token`: the input is not a well-formed token
pub fn inspect(encoded: &str) -> Result<String, CliError> {
    let token = Token::from_encoded(encoded)?;
    Ok(format!(
        "version: {:#04x}\ntimestamp: {}\niv: {}\nciphertext: {} bytes\nauthenticated: no",
        token.version(),
        token.timestamp(),
        hex::encode(token.iv()),
        token.ciphertext().len(),
    ))
}

/// Drop one trailing line ending (`\n` or `\r\n`) from piped input.
///
/// `echo hello | fernet encrypt` should issue a token for `hello`, not
/// `hello\n`. Only a single line ending is removed.
pub fn strip_line_ending(input: &str) -> &str {
    input.strip_suffix('\n').map_or(input, |line| line.strip_suffix('\r').unwrap_or(line))
}
