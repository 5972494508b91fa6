//! Known-answer and structural properties of successful derivations.

use less_kdf::{derive_bits, import_raw_key, ImportAlgorithm, KeyUsage, Pbkdf2Params};

use crate::fixtures::{base_key, params, DERIVATIONS, HASHES, PASSWORD_SIZES, SALT_SIZES};

// ============================================================================
// Known answers
// ============================================================================

#[test]
fn every_fixture_derivation_matches() {
    for &(password_size, salt_size, hash, iterations, expected) in DERIVATIONS {
        let key = base_key(password_size);
        let derived = derive_bits(&params(salt_size, hash, iterations), &key, Some(256))
            .unwrap_or_else(|e| {
                panic!("{password_size} password, {salt_size} salt, {hash}, {iterations}: {e}")
            });
        assert_eq!(
            hex::encode(&derived),
            expected,
            "{password_size} password, {salt_size} salt, {hash}, with {iterations} iterations"
        );
    }
}

#[test]
fn fixture_table_covers_every_combination() {
    for password_size in PASSWORD_SIZES {
        for salt_size in SALT_SIZES {
            for hash in HASHES {
                let count = DERIVATIONS
                    .iter()
                    .filter(|(p, s, h, _, _)| p == password_size && s == salt_size && h == hash)
                    .count();
                assert_eq!(count, 2, "{password_size}/{salt_size}/{hash}");
            }
        }
    }
}

#[test]
fn zero_secret_scenario() {
    let key = import_raw_key(
        &[0u8; 64],
        &ImportAlgorithm::named("PBKDF2"),
        false,
        &[KeyUsage::DeriveBits],
    )
    .unwrap();
    let params = Pbkdf2Params::new(vec![0x01; 16], "SHA-256", 1000);
    let derived = derive_bits(&params, &key, Some(256)).unwrap();
    assert_eq!(
        hex::encode(derived),
        "ca0d53ec980d878bf4e5435e2e4d93a2efd45b35c0ce02756400691b758488f9"
    );
}

#[test]
fn rfc6070_through_key_handle() {
    let key = import_raw_key(
        b"password",
        &ImportAlgorithm::named("PBKDF2"),
        false,
        &[KeyUsage::DeriveBits],
    )
    .unwrap();
    let derived = derive_bits(&Pbkdf2Params::new(b"salt".to_vec(), "SHA-1", 4096), &key, Some(160))
        .unwrap();
    assert_eq!(hex::encode(derived), "4b007901b765489abead49d926f721d065a429c1");
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn repeated_calls_are_identical() {
    let key = base_key("short");
    for hash in HASHES {
        let p = params("long", hash, 7);
        let first = derive_bits(&p, &key, Some(512)).unwrap();
        let second = derive_bits(&p, &key, Some(512)).unwrap();
        assert_eq!(first, second, "{hash}");
    }
}

#[test]
fn output_length_is_exact() {
    let key = base_key("long");
    for hash in HASHES {
        for bits in [8u32, 152, 160, 256, 384, 520, 1024, 1032] {
            let derived = derive_bits(&params("short", hash, 2), &key, Some(bits)).unwrap();
            assert_eq!(derived.len(), (bits / 8) as usize, "{hash} {bits}");
        }
    }
}

#[test]
fn longer_request_extends_shorter() {
    let key = base_key("short");
    for hash in HASHES {
        let p = params("short", hash, 3);
        // Crosses the first block boundary for every digest
        let mut previous = derive_bits(&p, &key, Some(8)).unwrap();
        for bits in (16..=576).step_by(8) {
            let next = derive_bits(&p, &key, Some(bits)).unwrap();
            assert_eq!(&next[..previous.len()], &previous[..], "{hash} {bits}");
            previous = next;
        }
    }
}

#[test]
fn empty_salt_is_accepted() {
    let key = base_key("short");
    let p = Pbkdf2Params::new(Vec::new(), "SHA-512", 1);
    assert_eq!(derive_bits(&p, &key, Some(256)).unwrap().len(), 32);
}

#[test]
fn hash_name_case_is_ignored() {
    let key = base_key("short");
    let upper = derive_bits(&params("short", "SHA-256", 1), &key, Some(256)).unwrap();
    let lower = derive_bits(&params("short", "sha-256", 1), &key, Some(256)).unwrap();
    assert_eq!(upper, lower);
}
