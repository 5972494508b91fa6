//! Validated PBKDF2 entry points.
//!
//! Every request is checked in a fixed order before any derivation work
//! starts, so the same bad request always fails with the same error:
//!
//! 1. `params.name` is PBKDF2 (`NotSupportedError`)
//! 2. the base key is a PBKDF2 key (`InvalidAccessError`)
//! 3. the base key permits the operation (`InvalidAccessError`)
//! 4. `params.hash` names a supported digest (`NotSupportedError`)
//! 5. `params.iterations` is positive (`OperationError`)
//! 6. the output length is present, positive and a multiple of 8
//!    (`OperationError`)

use zeroize::Zeroizing;

use crate::config::DeriveConfig;
use crate::error::CryptoError;
use crate::hash::HashAlgorithm;
use crate::key::{import_raw_key, is_aes_length, ImportAlgorithm, KeyAlgorithm, KeyHandle, KeyUsage};
use crate::params::Pbkdf2Params;
use crate::pbkdf2;
use crate::types::{AES_GCM, AES_KW, PBKDF2};

// ============================================================================
// Validation
// ============================================================================

/// A request that passed validation, ready for the derivation core.
struct Derivation {
    salt: Vec<u8>,
    hash: HashAlgorithm,
    iterations: u32,
    output_len: usize,
}

impl Derivation {
    fn blocks(&self) -> usize {
        self.output_len.div_ceil(self.hash.output_len())
    }
}

/// Checks 1-5: everything except the output length.
fn validate_request(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    usage: KeyUsage,
) -> Result<(HashAlgorithm, u32), CryptoError> {
    if !params.name.eq_ignore_ascii_case(PBKDF2) {
        return Err(CryptoError::UnknownAlgorithm(params.name.clone()));
    }
    if base_key.algorithm() != &KeyAlgorithm::Pbkdf2 {
        return Err(CryptoError::KeyAlgorithmMismatch {
            expected: PBKDF2,
            got: base_key.algorithm().name().to_string(),
        });
    }
    if !base_key.usages().contains(usage) {
        return Err(CryptoError::MissingUsage(usage));
    }
    let hash = HashAlgorithm::from_name(&params.hash)
        .ok_or_else(|| CryptoError::UnsupportedHash(params.hash.clone()))?;
    if params.iterations == 0 {
        return Err(CryptoError::InvalidIterations(0));
    }
    Ok((hash, params.iterations))
}

/// Check 6: output length in bits to bytes.
fn output_len(length: Option<u32>) -> Result<usize, CryptoError> {
    match length {
        None => Err(CryptoError::MissingLength),
        Some(bits) if bits == 0 || bits % 8 != 0 => Err(CryptoError::InvalidLength(bits)),
        Some(bits) => Ok((bits / 8) as usize),
    }
}

fn validate_bits(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    length: Option<u32>,
) -> Result<Derivation, CryptoError> {
    let (hash, iterations) = validate_request(params, base_key, KeyUsage::DeriveBits)?;
    Ok(Derivation {
        salt: params.salt.clone(),
        hash,
        iterations,
        output_len: output_len(length)?,
    })
}

fn rejected(err: &CryptoError) {
    tracing::debug!(error = %err, kind = err.name(), "PBKDF2 request rejected");
}

// ============================================================================
// Derivation
// ============================================================================

fn run(request: &Derivation, base_key: &KeyHandle) -> Result<Vec<u8>, CryptoError> {
    // PBKDF2 keys are always created with secret material
    let secret = base_key
        .secret_bytes()
        .ok_or_else(|| CryptoError::KeyAlgorithmMismatch {
            expected: PBKDF2,
            got: base_key.algorithm().name().to_string(),
        })?;

    tracing::debug!(
        hash = request.hash.name(),
        iterations = request.iterations,
        bits = request.output_len * 8,
        "PBKDF2 derivation started"
    );

    match pbkdf2::derive(
        secret,
        &request.salt,
        request.hash,
        request.iterations,
        request.output_len,
    ) {
        Ok(output) => {
            tracing::debug!(bytes = output.len(), "PBKDF2 derivation finished");
            Ok(output)
        }
        Err(e) => {
            tracing::error!(error = %e, "PBKDF2 core rejected a validated request");
            debug_assert!(false, "PBKDF2 core rejected a validated request: {e}");
            Err(e)
        }
    }
}

async fn run_async(
    request: Derivation,
    base_key: &KeyHandle,
    config: &DeriveConfig,
) -> Result<Vec<u8>, CryptoError> {
    if !config.should_offload(request.iterations, request.blocks()) {
        return run(&request, base_key);
    }

    let key = base_key.clone();
    match tokio::task::spawn_blocking(move || run(&request, &key)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(CryptoError::TaskFailed(e.to_string())),
    }
}

/// Derive `length` bits from a PBKDF2 base key.
///
/// `length` is in bits and must be a positive multiple of 8; `None` stands
/// for an absent length and is rejected.
pub fn derive_bits(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    length: Option<u32>,
) -> Result<Vec<u8>, CryptoError> {
    let request = validate_bits(params, base_key, length).inspect_err(rejected)?;
    run(&request, base_key)
}

/// Async form of [`derive_bits`].
///
/// Validation runs on the calling task. Derivations heavier than
/// [`DeriveConfig::inline_iteration_limit`] run on tokio's blocking pool, so
/// the future must then be polled inside a tokio runtime. Dropping the future
/// discards the result.
pub async fn derive_bits_async(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    length: Option<u32>,
    config: &DeriveConfig,
) -> Result<Vec<u8>, CryptoError> {
    let request = validate_bits(params, base_key, length).inspect_err(rejected)?;
    run_async(request, base_key, config).await
}

// ============================================================================
// deriveKey
// ============================================================================

/// Key type produced by [`derive_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedKeyType {
    AesGcm { length: u32 },
    AesKw { length: u32 },
    /// `length` defaults to the hash block size in bits.
    Hmac { hash: String, length: Option<u32> },
}

impl DerivedKeyType {
    /// Bits to derive and the import algorithm for them.
    fn resolve(&self) -> Result<(u32, ImportAlgorithm), CryptoError> {
        match self {
            DerivedKeyType::AesGcm { length } | DerivedKeyType::AesKw { length } => {
                if !is_aes_length(*length) {
                    return Err(CryptoError::InvalidAesLength(*length));
                }
                let name = match self {
                    DerivedKeyType::AesGcm { .. } => AES_GCM,
                    _ => AES_KW,
                };
                Ok((*length, ImportAlgorithm::named(name)))
            }
            DerivedKeyType::Hmac { hash, length } => {
                let digest = HashAlgorithm::from_name(hash)
                    .ok_or_else(|| CryptoError::UnsupportedHash(hash.clone()))?;
                let bits = match length {
                    Some(0) => {
                        return Err(CryptoError::InvalidParams(
                            "HMAC length must be greater than zero".into(),
                        ))
                    }
                    Some(bits) => *bits,
                    None => (digest.block_len() * 8) as u32,
                };
                Ok((
                    bits,
                    ImportAlgorithm {
                        length: Some(bits),
                        ..ImportAlgorithm::hmac(digest.name())
                    },
                ))
            }
        }
    }
}

struct KeyDerivation {
    request: Derivation,
    import: ImportAlgorithm,
}

fn validate_key(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    derived_type: &DerivedKeyType,
) -> Result<KeyDerivation, CryptoError> {
    let (hash, iterations) = validate_request(params, base_key, KeyUsage::DeriveKey)?;
    let (bits, import) = derived_type.resolve()?;
    Ok(KeyDerivation {
        request: Derivation {
            salt: params.salt.clone(),
            hash,
            iterations,
            output_len: output_len(Some(bits))?,
        },
        import,
    })
}

fn finish_key(
    derived: Vec<u8>,
    import: &ImportAlgorithm,
    extractable: bool,
    usages: &[KeyUsage],
) -> Result<KeyHandle, CryptoError> {
    let derived = Zeroizing::new(derived);
    import_raw_key(&derived, import, extractable, usages)
}

/// Derive a new secret key of `derived_type` from a PBKDF2 base key.
///
/// The base key must permit `deriveKey`. The derived key's usages must suit
/// its type.
pub fn derive_key(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    derived_type: &DerivedKeyType,
    extractable: bool,
    usages: &[KeyUsage],
) -> Result<KeyHandle, CryptoError> {
    let plan = validate_key(params, base_key, derived_type).inspect_err(rejected)?;
    let derived = run(&plan.request, base_key)?;
    finish_key(derived, &plan.import, extractable, usages)
}

/// Async form of [`derive_key`]; see [`derive_bits_async`].
pub async fn derive_key_async(
    params: &Pbkdf2Params,
    base_key: &KeyHandle,
    derived_type: &DerivedKeyType,
    extractable: bool,
    usages: &[KeyUsage],
    config: &DeriveConfig,
) -> Result<KeyHandle, CryptoError> {
    let plan = validate_key(params, base_key, derived_type).inspect_err(rejected)?;
    let derived = run_async(plan.request, base_key, config).await?;
    finish_key(derived, &plan.import, extractable, usages)
}
