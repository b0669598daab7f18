//! Fernet shared secret key
//!
//! A key is two independent 128-bit halves: one signs tokens with
//! HMAC-SHA256, the other encrypts token contents with AES-128-CBC. The
//! serialized form is `base64url(signing || encryption)`.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{encoding, env::Entropy, error::KeyError};

type HmacSha256 = Hmac<Sha256>;

/// Size of each key half in bytes (128 bits)
pub const KEY_HALF_SIZE: usize = 16;

/// Size of the serialized key in bytes (signing half + encryption half)
pub const KEY_SIZE: usize = 2 * KEY_HALF_SIZE;

/// Size of an HMAC-SHA256 signature in bytes
pub const SIGNATURE_SIZE: usize = 32;

/// Size of the signed token prefix (version + timestamp + IV)
pub(crate) const SIGNED_PREFIX_SIZE: usize = 1 + 8 + 16;

/// A Fernet shared secret key.
///
/// Immutable once constructed. Key material is zeroized on drop and never
/// printed by `Debug`. Equality runs in constant time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    signing_key: [u8; KEY_HALF_SIZE],
    encryption_key: [u8; KEY_HALF_SIZE],
}

impl Key {
    /// Create a key from its two halves.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: either half is not exactly 16 bytes
    pub fn new(signing_key: &[u8], encryption_key: &[u8]) -> Result<Self, KeyError> {
        let signing_key = half("signing", signing_key)?;
        let encryption_key = half("encryption", encryption_key)?;
        Ok(Self { signing_key, encryption_key })
    }

    /// Create a key from its two halves as fixed-size arrays.
    pub fn from_parts(
        signing_key: [u8; KEY_HALF_SIZE],
        encryption_key: [u8; KEY_HALF_SIZE],
    ) -> Self {
        Self { signing_key, encryption_key }
    }

    /// Decode a key from its base64url form (padded or unpadded).
    ///
    /// # Errors
    ///
    /// - `InvalidKeyEncoding`: not base64url, or not exactly 32 bytes
    pub fn from_encoded(encoded: &str) -> Result<Self, KeyError> {
        let mut bytes = encoding::decode(encoded)
            .map_err(|e| KeyError::InvalidKeyEncoding { reason: e.to_string() })?;

        if bytes.len() != KEY_SIZE {
            let actual = bytes.len();
            bytes.zeroize();
            return Err(KeyError::InvalidKeyEncoding {
                reason: format!("expected {KEY_SIZE} bytes, got {actual}"),
            });
        }

        let key = Self::new(&bytes[..KEY_HALF_SIZE], &bytes[KEY_HALF_SIZE..]);
        bytes.zeroize();
        key
    }

    /// Generate a fresh random key.
    ///
    /// Draws the signing half first, then the encryption half.
    pub fn generate(entropy: &impl Entropy) -> Self {
        let mut signing_key = [0u8; KEY_HALF_SIZE];
        entropy.random_bytes(&mut signing_key);
        let mut encryption_key = [0u8; KEY_HALF_SIZE];
        entropy.random_bytes(&mut encryption_key);
        Self { signing_key, encryption_key }
    }

    /// Compute the HMAC-SHA256 signature over the token fields.
    ///
    /// The signed message is
    /// `version (1) || timestamp (8, big-endian) || iv (16) || ciphertext`.
    /// Any deviation breaks interoperability with other Fernet
    /// implementations.
    pub fn compute_signature(
        &self,
        version: u8,
        timestamp: i64,
        iv: &[u8; 16],
        ciphertext: &[u8],
    ) -> [u8; SIGNATURE_SIZE] {
        let mac = self.signed_mac(version, timestamp, iv, ciphertext);
        let mut signature = [0u8; SIGNATURE_SIZE];
        signature.copy_from_slice(&mac.finalize().into_bytes());
        signature
    }

    /// Check `signature` against the token fields in constant time.
    pub fn verify_signature(
        &self,
        version: u8,
        timestamp: i64,
        iv: &[u8; 16],
        ciphertext: &[u8],
        signature: &[u8; SIGNATURE_SIZE],
    ) -> bool {
        self.signed_mac(version, timestamp, iv, ciphertext).verify_slice(signature).is_ok()
    }

    /// Serialize as unpadded base64url of `signing || encryption`.
    pub fn serialize(&self) -> String {
        let mut bytes = [0u8; KEY_SIZE];
        bytes[..KEY_HALF_SIZE].copy_from_slice(&self.signing_key);
        bytes[KEY_HALF_SIZE..].copy_from_slice(&self.encryption_key);
        let encoded = encoding::encode(&bytes);
        bytes.zeroize();
        encoded
    }

    /// 128-bit AES key.
    pub(crate) fn encryption_key(&self) -> &[u8; KEY_HALF_SIZE] {
        &self.encryption_key
    }

    fn signed_mac(&self, version: u8, timestamp: i64, iv: &[u8; 16], ciphertext: &[u8]) -> HmacSha256 {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.signing_key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(&[version]);
        mac.update(&timestamp.to_be_bytes());
        mac.update(iv);
        mac.update(ciphertext);
        mac
    }
}

fn half(field: &'static str, bytes: &[u8]) -> Result<[u8; KEY_HALF_SIZE], KeyError> {
    <[u8; KEY_HALF_SIZE]>::try_from(bytes).map_err(|_| KeyError::InvalidKeyLength {
        field,
        expected: KEY_HALF_SIZE,
        actual: bytes.len(),
    })
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        let signing = self.signing_key[..].ct_eq(&other.signing_key[..]);
        let encryption = self.encryption_key[..].ct_eq(&other.encryption_key[..]);
        (signing & encryption).into()
    }
}

impl Eq for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key").finish_non_exhaustive()
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct CountingEntropy;

    impl Entropy for CountingEntropy {
        fn random_bytes(&self, buffer: &mut [u8]) {
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = i as u8;
            }
        }
    }

    fn sequential_key() -> Key {
        let half: Vec<u8> = (1..=16).collect();
        Key::new(&half, &half).unwrap()
    }

    #[test]
    fn rejects_short_signing_key() {
        let result = Key::new(&[0u8; 15], &[0u8; 16]);
        assert_eq!(
            result,
            Err(KeyError::InvalidKeyLength { field: "signing", expected: 16, actual: 15 })
        );
    }

    #[test]
    fn rejects_long_encryption_key() {
        let result = Key::new(&[0u8; 16], &[0u8; 17]);
        assert_eq!(
            result,
            Err(KeyError::InvalidKeyLength { field: "encryption", expected: 16, actual: 17 })
        );
    }

    #[test]
    fn serialize_concatenates_halves() {
        assert_eq!(sequential_key().serialize(), "AQIDBAUGBwgJCgsMDQ4PEAECAwQFBgcICQoLDA0ODxA");
    }

    #[test]
    fn from_encoded_accepts_padding() {
        let key = Key::from_encoded("AQIDBAUGBwgJCgsMDQ4PEAECAwQFBgcICQoLDA0ODxA=").unwrap();
        assert_eq!(key, sequential_key());
    }

    #[test]
    fn from_encoded_rejects_short_input() {
        let result = Key::from_encoded("AQIDBAUGBwgJCgsMDQ4PEA");
        assert!(matches!(result, Err(KeyError::InvalidKeyEncoding { reason }) if reason.contains("got 16")));
    }

    #[test]
    fn from_encoded_rejects_long_input() {
        let encoded = encoding::encode(&[7u8; 33]);
        assert!(matches!(Key::from_encoded(&encoded), Err(KeyError::InvalidKeyEncoding { .. })));
    }

    #[test]
    fn from_encoded_rejects_garbage() {
        assert!(matches!(Key::from_encoded("not a key!"), Err(KeyError::InvalidKeyEncoding { .. })));
    }

    #[test]
    fn from_str_matches_from_encoded() {
        let encoded = sequential_key().serialize();
        let parsed: Key = encoded.parse().unwrap();
        assert_eq!(parsed, sequential_key());
    }

    #[test]
    fn generate_draws_signing_half_first() {
        let key = Key::generate(&CountingEntropy);
        let expected: Vec<u8> = (0..16).collect();
        assert_eq!(key, Key::new(&expected, &expected).unwrap());
    }

    #[test]
    fn keys_differ_by_either_half() {
        let a = Key::from_parts([1; 16], [2; 16]);
        assert_ne!(a, Key::from_parts([9; 16], [2; 16]));
        assert_ne!(a, Key::from_parts([1; 16], [9; 16]));
        assert_eq!(a, Key::from_parts([1; 16], [2; 16]));
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", Key::from_parts([0xAB; 16], [0xCD; 16]));
        assert_eq!(rendered, "Key { .. }");
    }

    #[test]
    fn signature_covers_every_field() {
        let key = sequential_key();
        let iv = [0u8; 16];
        let ciphertext = [0u8; 16];
        let base = key.compute_signature(0x80, 0, &iv, &ciphertext);

        assert_ne!(base, key.compute_signature(0x81, 0, &iv, &ciphertext));
        assert_ne!(base, key.compute_signature(0x80, 1, &iv, &ciphertext));
        assert_ne!(base, key.compute_signature(0x80, 0, &[1u8; 16], &ciphertext));
        assert_ne!(base, key.compute_signature(0x80, 0, &iv, &[1u8; 16]));
    }

    #[test]
    fn verify_accepts_own_signature_only() {
        let key = sequential_key();
        let iv = [3u8; 16];
        let ciphertext = [4u8; 32];
        let signature = key.compute_signature(0x80, 42, &iv, &ciphertext);

        assert!(key.verify_signature(0x80, 42, &iv, &ciphertext, &signature));

        let mut tampered = signature;
        tampered[31] ^= 0x01;
        assert!(!key.verify_signature(0x80, 42, &iv, &ciphertext, &tampered));

        let other = Key::from_parts([0u8; 16], [0u8; 16]);
        assert!(!other.verify_signature(0x80, 42, &iv, &ciphertext, &signature));
    }

    #[test]
    fn signature_matches_known_hmac() {
        // HMAC-SHA256 over 0x80 || BE64(0) || iv(1..=16) || ct(1..=16) with key 1..=16
        let key = sequential_key();
        let half: [u8; 16] = core::array::from_fn(|i| i as u8 + 1);
        let mut message = vec![0x80];
        message.extend_from_slice(&0i64.to_be_bytes());
        message.extend_from_slice(&half);
        message.extend_from_slice(&half);

        let mut mac = HmacSha256::new_from_slice(&half).unwrap();
        mac.update(&message);
        let expected = mac.finalize().into_bytes();

        assert_eq!(key.compute_signature(0x80, 0, &half, &half)[..], expected[..]);
    }
}
