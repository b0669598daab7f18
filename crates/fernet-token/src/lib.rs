//! Fernet Tokens
//!
//! Symmetric authenticated-encryption tokens: compact, URL-safe,
//! time-stamped and tamper-evident. A service issues a token as an opaque
//! string and later validates and decrypts it with nothing but a shared
//! secret key, or a short ordered list of keys during rotation.
//!
//! All functions are deterministic given their inputs. Randomness and time
//! are injected through [`Entropy`] and [`Clock`], so tests can pin both.
//!
//! # Token Lifecycle
//!
//! ```text
//! plaintext
//!     │
//!     ▼ AES-128-CBC (PKCS#7), fresh IV
//! ciphertext
//!     │
//!     ▼ HMAC-SHA256(version || timestamp || IV || ciphertext)
//! Token ──encode──▶ base64url string ──parse──▶ Token
//!                                                 │
//!                                                 ▼ version, window, HMAC, decrypt, unpad
//!                                             plaintext
//!                                                 │
//!                                                 ▼ PayloadValidator
//!                                             application value
//! ```
//!
//! # Example
//!
//! ```
//! use fernet_token::{FernetConfig, Key, TokenCodec, Utf8Validator};
//!
//! let codec = TokenCodec::with_system_env(FernetConfig::default());
//! let key = codec.generate_key();
//!
//! let token = codec.encrypt(&key, b"my top secret message!");
//! let plaintext = codec.decrypt(&token, [&key], &Utf8Validator)?;
//! assert_eq!(plaintext, "my top secret message!");
//!
//! // Keys round-trip through their base64url form
//! let restored: Key = key.serialize().parse()?;
//! assert_eq!(restored, key);
//! # Ok::<(), fernet_token::FernetError>(())
//! ```
//!
//! # Security
//!
//! Integrity:
//! - Encrypt-then-MAC; the HMAC covers every byte before it
//! - Signatures are compared in constant time
//! - By default nothing is decrypted until the HMAC verifies
//!   ([`CheckOrder::VerifyFirst`])
//!
//! Oracle resistance:
//! - Decryption, padding and signature failures share one display message
//! - Multi-key validation reports only [`ValidationError::NoMatchingKey`]
//!
//! Key hygiene:
//! - [`Key`] zeroizes its material on drop and never prints it
//! - IV uniqueness depends entirely on the injected [`Entropy`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
pub mod codec;
pub mod config;
mod encoding;
pub mod env;
pub mod error;
pub mod key;
mod rotation;
pub mod token;
mod validation;
pub mod validator;

pub use cipher::BLOCK_SIZE;
pub use codec::TokenCodec;
pub use config::{CheckOrder, FernetConfig, ValidityWindow};
pub use env::{Clock, Entropy, FixedClock, SystemEnv};
pub use error::{FernetError, KeyError, TokenError, ValidationError};
pub use key::{KEY_SIZE, Key, SIGNATURE_SIZE};
pub use token::{IV_SIZE, MIN_TOKEN_SIZE, Token, VERSION};
pub use validator::{BytesValidator, PayloadRejection, PayloadValidator, Utf8Validator};
