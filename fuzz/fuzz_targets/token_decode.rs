//! Fuzz target for Token::from_bytes and Token::from_encoded
//!
//! Feeds arbitrary bytes to both parsers to find:
//! - Panics on short or misaligned input
//! - Off-by-one errors in the field split
//! - Tokens that parse but do not serialize back to the same bytes
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use fernet_token::Token;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(token) = Token::from_bytes(data) {
        assert_eq!(token.to_bytes(), data, "parsed token must serialize to its input");
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(token) = Token::from_encoded(text) {
            let reparsed = Token::from_encoded(&token.encode()).expect("encoded token must parse");
            assert_eq!(reparsed, token);
        }
    }
});
