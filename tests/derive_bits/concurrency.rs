//! Async entry points and shared key handles.

use std::thread;

use less_kdf::{
    derive_bits, derive_bits_async, derive_key_async, DeriveConfig, DerivedKeyType, ErrorKind,
    KeyUsage,
};

use crate::fixtures::{base_key, no_usage_key, params, DERIVATIONS};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_matches_sync_inline_and_offloaded() {
    let key = base_key("short");
    let p = params("short", "SHA-256", 1000);
    let expected = derive_bits(&p, &key, Some(256)).unwrap();

    let inline = DeriveConfig::default();
    let offload = DeriveConfig::default().with_inline_iteration_limit(0);

    assert_eq!(derive_bits_async(&p, &key, Some(256), &inline).await.unwrap(), expected);
    assert_eq!(derive_bits_async(&p, &key, Some(256), &offload).await.unwrap(), expected);
}

#[tokio::test]
async fn async_validation_errors_match_sync() {
    let config = DeriveConfig::default().with_inline_iteration_limit(0);
    let key = base_key("long");

    let err = derive_bits_async(&params("short", "SHA-256", 1), &key, None, &config)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operation);

    let err = derive_bits_async(
        &params("short", "SHA-256", 1),
        &no_usage_key("long"),
        Some(256),
        &config,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAccess);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_derivations_share_one_handle() {
    let key = base_key("empty");
    let config = DeriveConfig::default().with_inline_iteration_limit(0);

    let tasks: Vec<_> = DERIVATIONS
        .iter()
        .filter(|(password, ..)| *password == "empty")
        .map(|&(_, salt, hash, iterations, expected)| {
            let key = key.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let derived = derive_bits_async(&params(salt, hash, iterations), &key, Some(256), &config)
                    .await
                    .unwrap();
                assert_eq!(hex::encode(derived), expected);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test]
async fn async_derive_key() {
    let key = base_key("short");
    let derived = derive_key_async(
        &params("short", "SHA-512", 2000),
        &key,
        &DerivedKeyType::AesGcm { length: 256 },
        false,
        &[KeyUsage::Encrypt],
        &DeriveConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(derived.algorithm().name(), "AES-GCM");
}

#[test]
fn threads_share_one_handle() {
    let key = base_key("long");
    let handles: Vec<_> = DERIVATIONS
        .iter()
        .filter(|(password, ..)| *password == "long")
        .map(|&(_, salt, hash, iterations, expected)| {
            let key = key.clone();
            thread::spawn(move || {
                let derived = derive_bits(&params(salt, hash, iterations), &key, Some(256)).unwrap();
                assert_eq!(hex::encode(derived), expected);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
