//! AES-128-CBC with PKCS#7 padding
//!
//! Decryption and unpadding are separate steps: the validation state
//! machine decides when padding is inspected relative to the signature
//! check.

use aes::{
    Aes128,
    cipher::{
        BlockDecryptMut, BlockEncryptMut, KeyIvInit,
        block_padding::{NoPadding, Pkcs7},
    },
};

use crate::error::ValidationError;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Encrypt `plaintext` with PKCS#7 padding.
///
/// Output is always a positive multiple of [`BLOCK_SIZE`]; an empty plaintext
/// produces one full block of padding.
pub(crate) fn encrypt(key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    cbc::Encryptor::<Aes128>::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt raw CBC blocks without touching the padding.
///
/// # Errors
///
/// - `DecryptionFailed`: ciphertext is empty or not block aligned
pub(crate) fn decrypt_blocks(
    key: &[u8; 16],
    iv: &[u8; 16],
    ciphertext: &[u8],
) -> Result<Vec<u8>, ValidationError> {
    if ciphertext.is_empty() {
        return Err(ValidationError::DecryptionFailed);
    }
    cbc::Decryptor::<Aes128>::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| ValidationError::DecryptionFailed)
}

/// Strip PKCS#7 padding in place.
///
/// The pad length is the value of the final byte. It must be between 1 and
/// 16 and every pad byte must carry that same value.
///
/// # Errors
///
/// - `InvalidPadding`: pad length is 0, exceeds 16 or the buffer, or the
///   pad bytes disagree
pub(crate) fn unpad(mut padded: Vec<u8>) -> Result<Vec<u8>, ValidationError> {
    let Some(&last) = padded.last() else {
        return Err(ValidationError::InvalidPadding);
    };

    let pad_len = usize::from(last);
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > padded.len() {
        return Err(ValidationError::InvalidPadding);
    }

    let body_len = padded.len() - pad_len;
    // Fold over every pad byte rather than short-circuiting on the first mismatch
    let mismatch = padded[body_len..].iter().fold(0u8, |acc, &b| acc | (b ^ last));
    if mismatch != 0 {
        return Err(ValidationError::InvalidPadding);
    }

    padded.truncate(body_len);
    Ok(padded)
}
