//! Key handles and the collaborators that create them.
//!
//! A [`KeyHandle`] is immutable once created: its algorithm, usages and
//! extractability never change, and the key material is only reachable from
//! inside the crate. Cloning a handle shares the same key.

use std::collections::BTreeSet;
use std::sync::Arc;

use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::hash::HashAlgorithm;
use crate::types::{AES_GCM, AES_KEY_LENGTHS, AES_KW, ECDH, HMAC, P256, PBKDF2};

// ============================================================================
// Usages
// ============================================================================

/// An operation a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    DeriveKey,
    DeriveBits,
    WrapKey,
    UnwrapKey,
}

impl KeyUsage {
    pub fn name(self) -> &'static str {
        match self {
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
            KeyUsage::Sign => "sign",
            KeyUsage::Verify => "verify",
            KeyUsage::DeriveKey => "deriveKey",
            KeyUsage::DeriveBits => "deriveBits",
            KeyUsage::WrapKey => "wrapKey",
            KeyUsage::UnwrapKey => "unwrapKey",
        }
    }

    /// Parse a usage string. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "encrypt" => Some(KeyUsage::Encrypt),
            "decrypt" => Some(KeyUsage::Decrypt),
            "sign" => Some(KeyUsage::Sign),
            "verify" => Some(KeyUsage::Verify),
            "deriveKey" => Some(KeyUsage::DeriveKey),
            "deriveBits" => Some(KeyUsage::DeriveBits),
            "wrapKey" => Some(KeyUsage::WrapKey),
            "unwrapKey" => Some(KeyUsage::UnwrapKey),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of permitted operations. Duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyUsages(BTreeSet<KeyUsage>);

impl KeyUsages {
    pub fn new(usages: &[KeyUsage]) -> Self {
        Self(usages.iter().copied().collect())
    }

    pub fn contains(&self, usage: KeyUsage) -> bool {
        self.0.contains(&usage)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyUsage> + '_ {
        self.0.iter().copied()
    }

    /// First usage not in `allowed`, if any.
    fn first_outside(&self, allowed: &[KeyUsage]) -> Option<KeyUsage> {
        self.iter().find(|u| !allowed.contains(u))
    }
}

impl FromIterator<KeyUsage> for KeyUsages {
    fn from_iter<I: IntoIterator<Item = KeyUsage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

const PBKDF2_USAGES: &[KeyUsage] = &[KeyUsage::DeriveKey, KeyUsage::DeriveBits];
const ECDH_USAGES: &[KeyUsage] = &[KeyUsage::DeriveKey, KeyUsage::DeriveBits];
const HMAC_USAGES: &[KeyUsage] = &[KeyUsage::Sign, KeyUsage::Verify];
const AES_GCM_USAGES: &[KeyUsage] = &[
    KeyUsage::Encrypt,
    KeyUsage::Decrypt,
    KeyUsage::WrapKey,
    KeyUsage::UnwrapKey,
];
const AES_KW_USAGES: &[KeyUsage] = &[KeyUsage::WrapKey, KeyUsage::UnwrapKey];

// ============================================================================
// Algorithm metadata
// ============================================================================

/// Algorithm a key is bound to, with its per-algorithm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Pbkdf2,
    Ecdh { named_curve: &'static str },
    Hmac { hash: HashAlgorithm, length: u32 },
    AesGcm { length: u32 },
    AesKw { length: u32 },
}

impl KeyAlgorithm {
    /// Registered algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Pbkdf2 => PBKDF2,
            KeyAlgorithm::Ecdh { .. } => ECDH,
            KeyAlgorithm::Hmac { .. } => HMAC,
            KeyAlgorithm::AesGcm { .. } => AES_GCM,
            KeyAlgorithm::AesKw { .. } => AES_KW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Secret,
    Private,
    Public,
}

// ============================================================================
// KeyHandle
// ============================================================================

#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretBytes(Vec<u8>);

enum KeyMaterial {
    Secret(SecretBytes),
    EcPrivate(SecretKey),
    EcPublic(PublicKey),
}

struct KeyInner {
    algorithm: KeyAlgorithm,
    key_type: KeyType,
    extractable: bool,
    usages: KeyUsages,
    material: KeyMaterial,
}

/// Opaque, immutable key. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct KeyHandle {
    inner: Arc<KeyInner>,
}

impl KeyHandle {
    fn new(
        algorithm: KeyAlgorithm,
        key_type: KeyType,
        extractable: bool,
        usages: KeyUsages,
        material: KeyMaterial,
    ) -> Self {
        Self {
            inner: Arc::new(KeyInner {
                algorithm,
                key_type,
                extractable,
                usages,
                material,
            }),
        }
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.inner.algorithm
    }

    pub fn key_type(&self) -> KeyType {
        self.inner.key_type
    }

    pub fn extractable(&self) -> bool {
        self.inner.extractable
    }

    pub fn usages(&self) -> &KeyUsages {
        &self.inner.usages
    }

    /// Raw secret bytes, for secret keys only.
    pub(crate) fn secret_bytes(&self) -> Option<&[u8]> {
        match &self.inner.material {
            KeyMaterial::Secret(bytes) => Some(&bytes.0),
            _ => None,
        }
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle")
            .field("algorithm", &self.inner.algorithm)
            .field("type", &self.inner.key_type)
            .field("extractable", &self.inner.extractable)
            .field("usages", &self.inner.usages)
            .finish_non_exhaustive()
    }
}

/// Result of asymmetric key generation.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key: KeyHandle,
    pub public_key: KeyHandle,
}

// ============================================================================
// Import
// ============================================================================

/// Algorithm argument for [`import_raw_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportAlgorithm {
    pub name: String,
    /// Required for HMAC.
    pub hash: Option<String>,
    /// HMAC key length in bits. Defaults to the key data length.
    pub length: Option<u32>,
}

impl ImportAlgorithm {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn hmac(hash: &str) -> Self {
        Self {
            name: HMAC.to_string(),
            hash: Some(hash.to_string()),
            length: None,
        }
    }
}

/// Import raw secret bytes as a key handle.
///
/// Supports PBKDF2, HMAC, AES-GCM and AES-KW secrets. PBKDF2 keys must be
/// imported as non-extractable and may only carry `deriveKey`/`deriveBits`.
pub fn import_raw_key(
    key_data: &[u8],
    algorithm: &ImportAlgorithm,
    extractable: bool,
    usages: &[KeyUsage],
) -> Result<KeyHandle, CryptoError> {
    let usages = KeyUsages::new(usages);
    let name = algorithm.name.to_ascii_uppercase();

    let (key_algorithm, allowed) = match name.as_str() {
        PBKDF2 => {
            if extractable {
                return Err(CryptoError::MustNotBeExtractable(PBKDF2));
            }
            (KeyAlgorithm::Pbkdf2, PBKDF2_USAGES)
        }
        HMAC => (hmac_algorithm(key_data, algorithm)?, HMAC_USAGES),
        AES_GCM => (
            KeyAlgorithm::AesGcm {
                length: aes_length(key_data, AES_GCM)?,
            },
            AES_GCM_USAGES,
        ),
        AES_KW => (
            KeyAlgorithm::AesKw {
                length: aes_length(key_data, AES_KW)?,
            },
            AES_KW_USAGES,
        ),
        _ => return Err(CryptoError::UnknownAlgorithm(algorithm.name.clone())),
    };

    check_usages(&usages, allowed, key_algorithm.name())?;
    if usages.is_empty() {
        return Err(CryptoError::EmptyUsages(key_algorithm.name()));
    }

    tracing::debug!(
        algorithm = key_algorithm.name(),
        extractable,
        "imported raw secret key"
    );

    Ok(KeyHandle::new(
        key_algorithm,
        KeyType::Secret,
        extractable,
        usages,
        KeyMaterial::Secret(SecretBytes(key_data.to_vec())),
    ))
}

fn check_usages(
    usages: &KeyUsages,
    allowed: &[KeyUsage],
    algorithm: &'static str,
) -> Result<(), CryptoError> {
    match usages.first_outside(allowed) {
        Some(usage) => Err(CryptoError::InvalidUsage { algorithm, usage }),
        None => Ok(()),
    }
}

fn aes_length(key_data: &[u8], algorithm: &'static str) -> Result<u32, CryptoError> {
    match key_data.len() {
        16 | 24 | 32 => Ok(key_data.len() as u32 * 8),
        got => Err(CryptoError::InvalidKeyData { algorithm, got }),
    }
}

fn hmac_algorithm(key_data: &[u8], algorithm: &ImportAlgorithm) -> Result<KeyAlgorithm, CryptoError> {
    let hash_name = algorithm
        .hash
        .as_deref()
        .ok_or_else(|| CryptoError::InvalidParams("HMAC import requires a hash".into()))?;
    let hash = HashAlgorithm::from_name(hash_name)
        .ok_or_else(|| CryptoError::UnsupportedHash(hash_name.to_string()))?;

    let data_bits = key_data.len() * 8;
    if data_bits == 0 {
        return Err(CryptoError::InvalidKeyData {
            algorithm: HMAC,
            got: 0,
        });
    }
    // An explicit length may trim at most the last byte's low bits
    let length = match algorithm.length {
        Some(length) if (length as usize) > data_bits || (length as usize) + 8 <= data_bits => {
            return Err(CryptoError::InvalidKeyData {
                algorithm: HMAC,
                got: key_data.len(),
            });
        }
        Some(length) => length,
        None => data_bits as u32,
    };
    Ok(KeyAlgorithm::Hmac { hash, length })
}

// ============================================================================
// Generation
// ============================================================================

/// Generate an ECDH key pair on P-256.
///
/// The private key carries `usages`, which must be non-empty and drawn from
/// `deriveKey`/`deriveBits`. The public key is always extractable and
/// carries no usages.
pub fn generate_ecdh_p256(extractable: bool, usages: &[KeyUsage]) -> Result<KeyPair, CryptoError> {
    let usages = KeyUsages::new(usages);
    check_usages(&usages, ECDH_USAGES, ECDH)?;
    if usages.is_empty() {
        return Err(CryptoError::EmptyUsages(ECDH));
    }

    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key();
    let algorithm = KeyAlgorithm::Ecdh { named_curve: P256 };

    Ok(KeyPair {
        private_key: KeyHandle::new(
            algorithm,
            KeyType::Private,
            extractable,
            usages,
            KeyMaterial::EcPrivate(secret),
        ),
        public_key: KeyHandle::new(
            algorithm,
            KeyType::Public,
            true,
            KeyUsages::default(),
            KeyMaterial::EcPublic(public),
        ),
    })
}

// ============================================================================
// Export
// ============================================================================

/// Export a key in raw format.
///
/// Secret keys export their bytes; ECDH public keys export the uncompressed
/// SEC1 point. ECDH private keys have no raw form.
pub fn export_raw_key(key: &KeyHandle) -> Result<Vec<u8>, CryptoError> {
    if !key.extractable() {
        return Err(CryptoError::NotExtractable);
    }
    match &key.inner.material {
        KeyMaterial::Secret(bytes) => Ok(bytes.0.clone()),
        KeyMaterial::EcPublic(public) => Ok(public.to_encoded_point(false).as_bytes().to_vec()),
        KeyMaterial::EcPrivate(_) => Err(CryptoError::ExportNotSupported(ECDH)),
    }
}

/// Valid AES lengths in bits, for derived key types.
pub(crate) fn is_aes_length(length: u32) -> bool {
    AES_KEY_LENGTHS.contains(&length)
}
