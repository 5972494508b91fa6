//! Rejected requests and the exception each one surfaces.

use less_kdf::{derive_bits, generate_ecdh_p256, CryptoError, ErrorKind, KeyUsage, Pbkdf2Params};

use crate::fixtures::{base_key, no_usage_key, params, HASHES, PASSWORD_SIZES, SALT_SIZES};

fn expect_kind(result: Result<Vec<u8>, CryptoError>, kind: ErrorKind, context: &str) {
    match result {
        Ok(_) => panic!("{context}: expected {kind}, derivation succeeded"),
        Err(e) => assert_eq!(e.kind(), kind, "{context}: {e}"),
    }
}

/// Drop the fourth character, e.g. "SHA-256" -> "SHA256".
fn misspell(hash: &str) -> String {
    format!("{}{}", &hash[..3], &hash[4..])
}

// ============================================================================
// Length
// ============================================================================

#[test]
fn null_zero_and_ragged_lengths_are_operation_errors() {
    for password_size in PASSWORD_SIZES {
        let key = base_key(password_size);
        for hash in HASHES {
            let p = params("short", hash, 1000);
            let ctx = format!("{password_size} password, {hash}");
            expect_kind(derive_bits(&p, &key, None), ErrorKind::Operation, &ctx);
            expect_kind(derive_bits(&p, &key, Some(0)), ErrorKind::Operation, &ctx);
            expect_kind(derive_bits(&p, &key, Some(44)), ErrorKind::Operation, &ctx);
        }
    }
}

#[test]
fn error_names_match_webcrypto() {
    let key = base_key("short");
    let err = derive_bits(&params("short", "SHA-1", 1), &key, Some(44)).unwrap_err();
    assert_eq!(err.name(), "OperationError");
}

// ============================================================================
// Iterations
// ============================================================================

#[test]
fn zero_iterations_are_operation_errors() {
    for password_size in PASSWORD_SIZES {
        let key = base_key(password_size);
        for salt_size in SALT_SIZES {
            for hash in HASHES {
                expect_kind(
                    derive_bits(&params(salt_size, hash, 0), &key, Some(256)),
                    ErrorKind::Operation,
                    &format!("{password_size} password, {salt_size} salt, {hash}, 0 iterations"),
                );
            }
        }
    }
}

#[test]
fn negative_iterations_from_json_are_operation_errors() {
    let err = Pbkdf2Params::from_json(&serde_json::json!({
        "name": "PBKDF2",
        "salt": "c2FsdA",
        "hash": "SHA-256",
        "iterations": -5,
    }))
    .unwrap_err();
    assert_eq!(err.name(), "OperationError");
}

// ============================================================================
// Hash
// ============================================================================

#[test]
fn misspelled_hash_is_not_supported() {
    let key = base_key("short");
    for hash in HASHES {
        let bad = misspell(hash);
        expect_kind(
            derive_bits(&params("short", &bad, 1000), &key, Some(256)),
            ErrorKind::NotSupported,
            &bad,
        );
    }
}

#[test]
fn non_digest_hash_is_not_supported() {
    let key = base_key("long");
    for iterations in [1, 1000, 100_000] {
        let err = derive_bits(&params("long", "PBKDF2", iterations), &key, Some(256)).unwrap_err();
        assert_eq!(err.name(), "NotSupportedError");
    }
}

// ============================================================================
// Base key
// ============================================================================

#[test]
fn missing_derive_bits_usage_is_invalid_access() {
    for password_size in PASSWORD_SIZES {
        let key = no_usage_key(password_size);
        for hash in HASHES {
            expect_kind(
                derive_bits(&params("short", hash, 1000), &key, Some(256)),
                ErrorKind::InvalidAccess,
                &format!("{password_size} password, {hash}"),
            );
        }
    }
}

#[test]
fn ecdh_base_key_is_invalid_access() {
    let pair = generate_ecdh_p256(false, &[KeyUsage::DeriveKey, KeyUsage::DeriveBits]).unwrap();
    for hash in HASHES {
        let err = derive_bits(&params("short", hash, 1000), &pair.private_key, Some(256))
            .unwrap_err();
        assert_eq!(err.name(), "InvalidAccessError", "{hash}");
        assert!(matches!(err, CryptoError::KeyAlgorithmMismatch { .. }));
    }
}

#[test]
fn public_key_is_invalid_access() {
    let pair = generate_ecdh_p256(false, &[KeyUsage::DeriveBits]).unwrap();
    expect_kind(
        derive_bits(&params("short", "SHA-256", 1), &pair.public_key, Some(256)),
        ErrorKind::InvalidAccess,
        "ECDH public key",
    );
}
