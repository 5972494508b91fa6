use base64ct::{Base64UrlUnpadded, Encoding};

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode a string to bytes.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(s)
}

/// Serde adapter carrying byte members as unpadded base64url strings.
pub(crate) mod bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::base64url_encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::base64url_decode(&s).map_err(D::Error::custom)
    }
}
