//! Fuzz target for token generation and validation
//!
//! Issues a token from arbitrary parts, optionally corrupts it, then validates
//! it against an arbitrary window and key ring.
//!
//! # Strategy
//!
//! - Arbitrary keys, timestamps, IVs and plaintexts
//! - Boundary timestamps (i64::MIN, i64::MAX) through the raw value
//! - Single-byte corruption anywhere after the version byte
//! - Key rings with and without the issuing key
//! - Both check orders
//!
//! # Invariants
//!
//! - Validation never panics
//! - An untouched token validates under its own key inside the window
//! - A corrupted token never validates
//! - A token outside the window is rejected as a freshness failure
//! - Both check orders agree on acceptance

#![no_main]

use arbitrary::Arbitrary;
use fernet_token::{BytesValidator, CheckOrder, Key, Token, ValidityWindow};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct ValidationScenario {
    /// Signing and encryption halves of the issuing key
    key: ([u8; 16], [u8; 16]),
    /// Other keys in the ring
    decoys: Vec<([u8; 16], [u8; 16])>,
    /// Whether the ring contains the issuing key
    include_issuer: bool,
    plaintext: Vec<u8>,
    timestamp: i64,
    iv: [u8; 16],
    window: (i64, i64),
    /// Byte offset and xor mask to corrupt (mask 0 leaves the token intact)
    corruption: Option<(usize, u8)>,
}

fuzz_target!(|scenario: ValidationScenario| {
    let key = Key::from_parts(scenario.key.0, scenario.key.1);
    let token = Token::generate_from_parts(&key, &scenario.plaintext, scenario.timestamp, scenario.iv);
    let window = ValidityWindow::new(scenario.window.0, scenario.window.1);

    let mut bytes = token.to_bytes();
    let mut corrupted = false;
    if let Some((offset, mask)) = scenario.corruption {
        if mask != 0 {
            let position = 1 + offset % (bytes.len() - 1);
            bytes[position] ^= mask;
            corrupted = true;
        }
    }

    // INVARIANT 1: corruption after the version byte keeps the token parseable
    let candidate = Token::from_bytes(&bytes).expect("length and version unchanged");

    let verify_first = candidate.validate_with_order(&key, window, CheckOrder::VerifyFirst);
    let decrypt_first = candidate.validate_with_order(&key, window, CheckOrder::DecryptFirst);

    // INVARIANT 2: check order changes which error is reported, never acceptance
    assert_eq!(verify_first.is_ok(), decrypt_first.is_ok(), "check orders disagree");

    if corrupted {
        // INVARIANT 3: corrupted tokens never validate
        assert!(verify_first.is_err(), "corrupted token accepted");
    } else if window.contains(scenario.timestamp) {
        // INVARIANT 4: untouched tokens inside the window validate
        assert_eq!(verify_first.as_deref(), Ok(scenario.plaintext.as_slice()));
    } else {
        // INVARIANT 5: untouched tokens outside the window are stale or early
        assert!(verify_first.is_err_and(|e| e.is_freshness_failure()));
    }

    // INVARIANT 6: rotation accepts exactly when some key in the ring does
    let mut ring: Vec<Key> =
        scenario.decoys.iter().take(8).map(|(s, e)| Key::from_parts(*s, *e)).collect();
    if scenario.include_issuer {
        ring.push(key.clone());
    }
    let any_accepts = ring.iter().any(|k| candidate.is_valid(k, window));
    let rotated =
        candidate.validate_with_keys(&ring, window, CheckOrder::VerifyFirst, &BytesValidator);
    assert_eq!(rotated.is_ok(), any_accepts, "rotation disagrees with individual keys");
});
