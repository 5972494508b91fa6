/// Registered name of the PBKDF2 algorithm.
pub const PBKDF2: &str = "PBKDF2";

/// Registered name of the ECDH algorithm.
pub const ECDH: &str = "ECDH";

/// Registered name of the HMAC algorithm.
pub const HMAC: &str = "HMAC";

/// Registered name of AES in Galois/Counter Mode.
pub const AES_GCM: &str = "AES-GCM";

/// Registered name of the AES key wrap algorithm.
pub const AES_KW: &str = "AES-KW";

/// The only curve offered for ECDH key generation.
pub const P256: &str = "P-256";

/// AES key lengths in bits.
pub const AES_KEY_LENGTHS: &[u32] = &[128, 192, 256];

/// Uncompressed SEC1 point length for P-256: 0x04 || x || y.
pub const P256_UNCOMPRESSED_POINT_LENGTH: usize = 65;
