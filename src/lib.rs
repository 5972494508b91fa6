//! PBKDF2 key derivation behind WebCrypto-style key handles.
//!
//! Import a password as a PBKDF2 [`KeyHandle`], then call [`derive_bits`] or
//! [`derive_key`]. Requests are validated against the key's algorithm and
//! usages and the PBKDF2 parameters before any derivation work starts;
//! failures carry an [`ErrorKind`] naming the WebCrypto exception.

pub mod base64url;
pub mod config;
pub mod error;
pub mod hash;
pub mod key;
pub mod params;
pub mod pbkdf2;
pub mod prf;
pub mod subtle;
pub mod types;

pub use base64url::{base64url_decode, base64url_encode};
pub use config::{DeriveConfig, DEFAULT_INLINE_ITERATION_LIMIT};
pub use error::{CryptoError, ErrorKind};
pub use hash::HashAlgorithm;
pub use key::{
    export_raw_key, generate_ecdh_p256, import_raw_key, ImportAlgorithm, KeyAlgorithm, KeyHandle,
    KeyPair, KeyType, KeyUsage, KeyUsages,
};
pub use params::Pbkdf2Params;
pub use prf::{hmac, hmac_by_name, Prf};
pub use subtle::{derive_bits, derive_bits_async, derive_key, derive_key_async, DerivedKeyType};
