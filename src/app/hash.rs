//! MD5 checksums published in dataset manifests
//!
//! Checksums are stored as their raw 16 bytes and (de)serialized as lowercase
//! hex, the form manifests publish them in.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use crate::constants::http::HASH_BUFFER_SIZE;
use crate::errors::{ManifestError, ManifestResult};

/// MD5 checksum of a dataset file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Parse a 32-character hex string (case insensitive)
    pub fn from_hex(hex: &str) -> ManifestResult<Self> {
        let invalid = || ManifestError::InvalidHash {
            hash: hex.to_string(),
        };

        if hex.len() != 32 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0u8; 16];
        for (byte, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| invalid())?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }

        Ok(Md5Hash(bytes))
    }

    /// Lowercase 32-character hex representation
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Finish a running MD5 computation
    pub fn from_context(context: md5::Context) -> Self {
        Md5Hash(context.compute().0)
    }

    /// Checksum of a file on disk, read in chunks
    pub async fn of_file(path: &Path) -> std::io::Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            context.consume(&buffer[..read]);
        }

        Ok(Self::from_context(context))
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Md5Hash {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Md5Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Md5Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_case_insensitive_parsing() {
        let lower = Md5Hash::from_hex("50c9d1c465f3cbff652be1509c2e2a4e").unwrap();
        let upper = Md5Hash::from_hex("50C9D1C465F3CBFF652BE1509C2E2A4E").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_hex(), "50c9d1c465f3cbff652be1509c2e2a4e");
        assert_eq!(lower.as_bytes()[0], 0x50);
    }

    #[test]
    fn test_invalid_hex_strings() {
        let invalid_cases = [
            "",
            "50c9d1c465f3cbff652be1509c2e2a4",
            "50c9d1c465f3cbff652be1509c2e2a4e5",
            "50c9d1c465f3cbff652be1509c2e2a4g",
            "50c9d1c4-65f3cbff652be1509c2e2a4e",
            "50c9d1c465f3cbff652be1509c2e2aé",
        ];

        for hex in &invalid_cases {
            assert!(Md5Hash::from_hex(hex).is_err(), "Should reject: {}", hex);
        }
    }

    #[test]
    fn test_serde_round_trip_through_manifest_json() {
        let json = r#""9734faa872681f96b144f60d29d52011""#;
        let hash: Md5Hash = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&hash).unwrap(), json);

        assert!(serde_json::from_str::<Md5Hash>(r#""not-a-hash""#).is_err());
    }

    #[tokio::test]
    async fn test_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.pbf");
        tokio::fs::write(&path, b"").await.unwrap();

        let hash = Md5Hash::of_file(&path).await.unwrap();
        assert_eq!(hash.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
