//! Fernet token wire format
//!
//! ```text
//! +---------+----------------+--------+----------------------+-----------+
//! | version | timestamp      | IV     | ciphertext           | HMAC      |
//! | 0x80    | 8 B big-endian | 16 B   | 16·k B (k >= 1)      | 32 B      |
//! +---------+----------------+--------+----------------------+-----------+
//! ```
//!
//! The encoded form is unpadded base64url of the whole structure. Padded
//! input is accepted when parsing.

use std::{fmt, str::FromStr};

use crate::{
    cipher::{self, BLOCK_SIZE},
    encoding,
    env::{Clock, Entropy},
    error::TokenError,
    key::{Key, SIGNATURE_SIZE, SIGNED_PREFIX_SIZE},
};

/// The only supported token version
pub const VERSION: u8 = 0x80;

/// Size of the CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// Smallest possible token before the ciphertext length check
/// (version + timestamp + IV + HMAC)
pub const MIN_TOKEN_SIZE: usize = SIGNED_PREFIX_SIZE + SIGNATURE_SIZE;

/// A parsed Fernet token.
///
/// Every constructor checks the field sizes, so a `Token` value is always
/// structurally valid. Whether it is authentic is only known after
/// validation against a key.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    version: u8,
    timestamp: i64,
    iv: [u8; IV_SIZE],
    ciphertext: Vec<u8>,
    signature: [u8; SIGNATURE_SIZE],
}

impl Token {
    /// Assemble a token from its fields.
    ///
    /// # Errors
    ///
    /// - `InvalidVersion`: version is not 0x80
    /// - `MalformedToken`: ciphertext is empty or not a multiple of 16 bytes
    pub fn new(
        version: u8,
        timestamp: i64,
        iv: [u8; IV_SIZE],
        ciphertext: Vec<u8>,
        signature: [u8; SIGNATURE_SIZE],
    ) -> Result<Self, TokenError> {
        if version != VERSION {
            return Err(TokenError::InvalidVersion(version));
        }
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(TokenError::MalformedToken {
                reason: format!(
                    "ciphertext must be a positive multiple of {BLOCK_SIZE} bytes, got {}",
                    ciphertext.len()
                ),
            });
        }
        Ok(Self { version, timestamp, iv, ciphertext, signature })
    }

    /// Encrypt and sign `plaintext` with a fresh IV and the current time.
    ///
    /// # Security
    ///
    /// - IV uniqueness per key rests entirely on `entropy`
    /// - Caller MUST provide cryptographically secure randomness in production
    pub fn generate(
        entropy: &impl Entropy,
        key: &Key,
        plaintext: &[u8],
        clock: &impl Clock,
    ) -> Self {
        let mut iv = [0u8; IV_SIZE];
        entropy.random_bytes(&mut iv);
        Self::generate_from_parts(key, plaintext, clock.now_secs(), iv)
    }

    /// Encrypt and sign `plaintext` with an explicit timestamp and IV.
    ///
    /// Deterministic: the same inputs always produce the same token. Never
    /// reuse an IV with the same key outside of tests.
    pub fn generate_from_parts(
        key: &Key,
        plaintext: &[u8],
        timestamp: i64,
        iv: [u8; IV_SIZE],
    ) -> Self {
        let ciphertext = cipher::encrypt(key.encryption_key(), &iv, plaintext);
        let signature = key.compute_signature(VERSION, timestamp, &iv, &ciphertext);

        tracing::trace!(timestamp, ciphertext_len = ciphertext.len(), "generated token");

        Self { version: VERSION, timestamp, iv, ciphertext, signature }
    }

    /// Parse a token from its raw (decoded) bytes.
    ///
    /// # Errors
    ///
    /// - `MalformedToken`: shorter than 57 bytes, or ciphertext is empty or
    ///   not block aligned
    /// - `InvalidVersion`: first byte is not 0x80
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        if bytes.len() < MIN_TOKEN_SIZE {
            return Err(TokenError::MalformedToken {
                reason: format!("expected at least {MIN_TOKEN_SIZE} bytes, got {}", bytes.len()),
            });
        }

        let (prefix, rest) = bytes.split_at(SIGNED_PREFIX_SIZE);
        let (ciphertext, signature) = rest.split_at(rest.len() - SIGNATURE_SIZE);

        let version = prefix[0];
        if version != VERSION {
            return Err(TokenError::InvalidVersion(version));
        }

        let mut timestamp = [0u8; 8];
        timestamp.copy_from_slice(&prefix[1..9]);
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&prefix[9..SIGNED_PREFIX_SIZE]);
        let mut sig = [0u8; SIGNATURE_SIZE];
        sig.copy_from_slice(signature);

        let token = Self::new(version, i64::from_be_bytes(timestamp), iv, ciphertext.to_vec(), sig)?;
        debug_assert_eq!(token.encoded_len(), bytes.len());
        Ok(token)
    }

    /// Parse a token from its base64url form (padded or unpadded).
    ///
    /// # Errors
    ///
    /// - `InvalidEncoding`: not base64url
    /// - any error from [`Token::from_bytes`]
    pub fn from_encoded(encoded: &str) -> Result<Self, TokenError> {
        let bytes = encoding::decode(encoded).map_err(|_| TokenError::InvalidEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.signature);
        bytes
    }

    /// Serialize to unpadded base64url.
    pub fn encode(&self) -> String {
        encoding::encode(&self.to_bytes())
    }

    /// Version byte (always 0x80).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Issue time in seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Encrypted, padded payload.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// HMAC-SHA256 over version, timestamp, IV and ciphertext.
    pub fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    fn encoded_len(&self) -> usize {
        SIGNED_PREFIX_SIZE + self.ciphertext.len() + SIGNATURE_SIZE
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("version", &format_args!("{:#04x}", self.version))
            .field("timestamp", &self.timestamp)
            .field("iv", &encoding::encode(&self.iv))
            .field("ciphertext", &encoding::encode(&self.ciphertext))
            .field("signature", &encoding::encode(&self.signature))
            .finish()
    }
}
