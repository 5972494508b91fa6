//! HMAC pseudorandom function over the supported digests.
//!
//! A [`Prf`] holds the HMAC state after the key has been absorbed, so repeated
//! evaluations under the same key only pay for the message blocks.

use ::hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::CryptoError;
use crate::hash::HashAlgorithm;

/// HMAC keyed once, evaluated many times.
#[derive(Clone)]
pub enum Prf {
    Sha1(Hmac<Sha1>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl Prf {
    /// Run the HMAC key schedule for `key` under `hash`.
    pub fn new(hash: HashAlgorithm, key: &[u8]) -> Result<Self, CryptoError> {
        let prf = match hash {
            HashAlgorithm::Sha1 => Prf::Sha1(keyed(key)?),
            HashAlgorithm::Sha256 => Prf::Sha256(keyed(key)?),
            HashAlgorithm::Sha384 => Prf::Sha384(keyed(key)?),
            HashAlgorithm::Sha512 => Prf::Sha512(keyed(key)?),
        };
        Ok(prf)
    }

    pub fn hash(&self) -> HashAlgorithm {
        match self {
            Prf::Sha1(_) => HashAlgorithm::Sha1,
            Prf::Sha256(_) => HashAlgorithm::Sha256,
            Prf::Sha384(_) => HashAlgorithm::Sha384,
            Prf::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    /// MAC length in bytes.
    pub fn output_len(&self) -> usize {
        self.hash().output_len()
    }

    /// MAC of `message`.
    pub fn compute(&self, message: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; self.output_len()];
        self.compute_into(message, &mut out);
        out
    }

    /// MAC of `message` written into `out`, which must be exactly
    /// [`Prf::output_len`] bytes.
    pub fn compute_into(&self, message: &[u8], out: &mut [u8]) {
        match self {
            Prf::Sha1(mac) => finish_into(mac, message, out),
            Prf::Sha256(mac) => finish_into(mac, message, out),
            Prf::Sha384(mac) => finish_into(mac, message, out),
            Prf::Sha512(mac) => finish_into(mac, message, out),
        }
    }
}

fn keyed<M: Mac + ::hmac::digest::KeyInit>(key: &[u8]) -> Result<M, CryptoError> {
    <M as Mac>::new_from_slice(key).map_err(|e| CryptoError::PrfSetup(e.to_string()))
}

fn finish_into<M: Mac + Clone>(keyed: &M, message: &[u8], out: &mut [u8]) {
    let mut mac = keyed.clone();
    mac.update(message);
    out.copy_from_slice(&mac.finalize().into_bytes());
}

/// One-shot HMAC of `message` under `key`.
pub fn hmac(hash: HashAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(Prf::new(hash, key)?.compute(message))
}

/// One-shot HMAC with the digest given by name.
///
/// Fails with [`CryptoError::UnsupportedAlgorithm`] when `hash_name` is not a
/// supported digest.
pub fn hmac_by_name(hash_name: &str, key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let hash = HashAlgorithm::from_name(hash_name)
        .ok_or_else(|| CryptoError::UnsupportedAlgorithm(hash_name.to_string()))?;
    hmac(hash, key, message)
}
