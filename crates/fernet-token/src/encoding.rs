//! Base64url engine shared by keys and tokens.
//!
//! Output never carries `=` padding. Input is accepted with or without it,
//! since other Fernet implementations emit padded tokens and keys.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode as unpadded base64url.
pub(crate) fn encode(bytes: &[u8]) -> String {
    BASE64URL.encode(bytes)
}

/// Decode padded or unpadded base64url.
pub(crate) fn decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64URL.decode(input.trim())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_omits_padding() {
        assert_eq!(encode(&[0xFF]), "_w");
    }

    #[test]
    fn decode_accepts_both_paddings() {
        assert_eq!(decode("_w").unwrap(), vec![0xFF]);
        assert_eq!(decode("_w==").unwrap(), vec![0xFF]);
    }

    #[test]
    fn decode_rejects_standard_alphabet() {
        assert!(decode("/w==").is_err());
    }

    #[test]
    fn decode_ignores_surrounding_whitespace() {
        assert_eq!(decode(" _w\n").unwrap(), vec![0xFF]);
    }
}
