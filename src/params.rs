//! The PBKDF2 algorithm dictionary: `{name, salt, hash, iterations}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::base64url::base64url_decode;
use crate::error::CryptoError;
use crate::types::PBKDF2;

/// Parameters of a PBKDF2 derivation.
///
/// `hash` is kept as the caller's string; it is resolved against the
/// supported digests when the derivation is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    pub name: String,
    #[serde(with = "crate::base64url::bytes")]
    pub salt: Vec<u8>,
    pub hash: String,
    pub iterations: u32,
}

impl Pbkdf2Params {
    pub fn new(salt: impl Into<Vec<u8>>, hash: &str, iterations: u32) -> Self {
        Self {
            name: PBKDF2.to_string(),
            salt: salt.into(),
            hash: hash.to_string(),
            iterations,
        }
    }

    /// Parameters with a fresh random salt of `salt_len` bytes.
    pub fn with_random_salt(salt_len: usize, hash: &str, iterations: u32) -> Result<Self, CryptoError> {
        let mut salt = vec![0u8; salt_len];
        getrandom::getrandom(&mut salt).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
        Ok(Self::new(salt, hash, iterations))
    }

    /// Read the dictionary from its JSON form.
    ///
    /// `salt` is unpadded base64url. A `hash` may be a string or an object
    /// with a string `name`. Missing or mistyped members fail with a
    /// `TypeError`; a negative `iterations` fails with an `OperationError`.
    pub fn from_json(value: &Value) -> Result<Self, CryptoError> {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing("name"))?;

        let salt_b64 = value
            .get("salt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing("salt"))?;
        let salt = base64url_decode(salt_b64)
            .map_err(|e| CryptoError::InvalidParams(format!("salt: {}", e)))?;

        let hash = match value.get("hash") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Object(obj)) => obj
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| missing("hash.name"))?,
            _ => return Err(missing("hash")),
        };

        let iterations = match value.get("iterations") {
            Some(Value::Number(n)) => match (n.as_u64(), n.as_i64()) {
                (Some(count), _) => u32::try_from(count).map_err(|_| {
                    CryptoError::InvalidParams(format!("iterations out of range: {}", count))
                })?,
                (None, Some(negative)) => return Err(CryptoError::InvalidIterations(negative)),
                (None, None) => {
                    return Err(CryptoError::InvalidParams(format!(
                        "iterations must be an integer, got {}",
                        n
                    )))
                }
            },
            _ => return Err(missing("iterations")),
        };

        Ok(Self {
            name: name.to_string(),
            salt,
            hash: hash.to_string(),
            iterations,
        })
    }

    /// JSON form accepted by [`Pbkdf2Params::from_json`].
    pub fn to_json(&self) -> Value {
        // Plain strings and integers only; serialization cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn missing(member: &str) -> CryptoError {
    CryptoError::InvalidParams(format!("missing or invalid member: {}", member))
}
