//! Analysis cache keys
//!
//! Provides [`AnalysisHash`], an 8-byte digest prefix rendered as exactly
//! 16 lowercase hexadecimal characters.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of hex characters in a rendered [`AnalysisHash`]
pub const ANALYSIS_HASH_LEN: usize = 16;

const HASH_BYTES: usize = ANALYSIS_HASH_LEN / 2;

/// Truncated digest identifying an analysis request
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisHash([u8; HASH_BYTES]);

impl AnalysisHash {
    /// Create from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    /// Take the leading bytes of a longer digest
    ///
    /// # Errors
    /// Returns error if the digest is shorter than 8 bytes
    pub fn from_digest(digest: &[u8]) -> Result<Self, HashError> {
        let prefix = digest.get(..HASH_BYTES).ok_or(HashError::InvalidLength {
            expected: HASH_BYTES,
            actual: digest.len(),
        })?;
        let mut arr = [0u8; HASH_BYTES];
        arr.copy_from_slice(prefix);
        Ok(Self(arr))
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }
}

impl Display for AnalysisHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for AnalysisHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ANALYSIS_HASH_LEN {
            return Err(HashError::InvalidLength {
                expected: HASH_BYTES,
                actual: s.len() / 2,
            });
        }
        if s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(HashError::NotLowercase(s.to_string()));
        }
        let bytes = hex::decode(s)?;
        Self::from_digest(&bytes)
    }
}

impl serde::Serialize for AnalysisHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for AnalysisHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AnalysisHashVisitor;

        impl serde::de::Visitor<'_> for AnalysisHashVisitor {
            type Value = AnalysisHash;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 16-character lowercase hex string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(AnalysisHashVisitor)
    }
}

/// Errors that can occur when working with analysis hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Wrong number of bytes
    #[error("invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Uppercase hex is rejected so keys have one spelling
    #[error("hash must be lowercase hex: {0}")]
    NotLowercase(String),

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
