use thiserror::Error;

use crate::key::KeyUsage;

/// Outcome class of a failed operation.
///
/// Mirrors the exception names a WebCrypto implementation rejects with, plus
/// one internal kind for the by-name HMAC entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAccess,
    NotSupported,
    Operation,
    Syntax,
    Type,
    Data,
    /// Digest engine invoked with an unrecognized identifier. Never returned by
    /// `derive_bits` or `derive_key`.
    UnsupportedAlgorithm,
}

impl ErrorKind {
    /// Exception name as reported to callers.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::InvalidAccess => "InvalidAccessError",
            ErrorKind::NotSupported => "NotSupportedError",
            ErrorKind::Operation => "OperationError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Data => "DataError",
            ErrorKind::UnsupportedAlgorithm => "UnsupportedAlgorithm",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key algorithm mismatch: expected {expected}, got {got}")]
    KeyAlgorithmMismatch { expected: &'static str, got: String },

    #[error("Key usages do not permit {0}")]
    MissingUsage(KeyUsage),

    #[error("Key is not extractable")]
    NotExtractable,

    #[error("Raw export is not supported for {0} keys")]
    ExportNotSupported(&'static str),

    #[error("Unrecognized algorithm name: {0}")]
    UnknownAlgorithm(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHash(String),

    #[error("Iteration count must be a positive integer, got {0}")]
    InvalidIterations(i64),

    #[error("Derived length must be specified")]
    MissingLength,

    #[error("Derived length must be a positive multiple of 8, got {0} bits")]
    InvalidLength(u32),

    #[error("Invalid AES key length: {0} bits")]
    InvalidAesLength(u32),

    #[error("Derived output of {0} bytes exceeds the PBKDF2 block counter")]
    OutputTooLong(usize),

    #[error("HMAC setup failed: {0}")]
    PrfSetup(String),

    #[error("Derivation task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid key usages for {algorithm}: {usage}")]
    InvalidUsage { algorithm: &'static str, usage: KeyUsage },

    #[error("Key usages must not be empty for a {0} key")]
    EmptyUsages(&'static str),

    #[error("{0} keys must not be extractable")]
    MustNotBeExtractable(&'static str),

    #[error("Invalid {algorithm} key data length: {got} bytes")]
    InvalidKeyData { algorithm: &'static str, got: usize },

    #[error("Invalid algorithm parameters: {0}")]
    InvalidParams(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// Outcome class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::KeyAlgorithmMismatch { .. }
            | CryptoError::MissingUsage(_)
            | CryptoError::NotExtractable
            | CryptoError::ExportNotSupported(_) => ErrorKind::InvalidAccess,
            CryptoError::UnknownAlgorithm(_) | CryptoError::UnsupportedHash(_) => {
                ErrorKind::NotSupported
            }
            CryptoError::InvalidIterations(_)
            | CryptoError::MissingLength
            | CryptoError::InvalidLength(_)
            | CryptoError::InvalidAesLength(_)
            | CryptoError::OutputTooLong(_)
            | CryptoError::PrfSetup(_)
            | CryptoError::TaskFailed(_)
            | CryptoError::RngFailed(_) => ErrorKind::Operation,
            CryptoError::InvalidUsage { .. }
            | CryptoError::EmptyUsages(_)
            | CryptoError::MustNotBeExtractable(_) => ErrorKind::Syntax,
            CryptoError::InvalidParams(_) => ErrorKind::Type,
            CryptoError::InvalidKeyData { .. } => ErrorKind::Data,
            CryptoError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
        }
    }

    /// Exception name of this error's kind, e.g. `"OperationError"`.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
