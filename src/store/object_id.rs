use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng, RngCore};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use time::OffsetDateTime;

lazy_static! {
    static ref OBJECT_ID_RE: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();
    // 5 bytes fixed for the lifetime of the process
    static ref PROCESS_UNIQUE: [u8; 5] = {
        let mut bytes = [0u8; 5];
        OsRng.fill_bytes(&mut bytes);
        bytes
    };
    static ref COUNTER: AtomicU32 = AtomicU32::new(OsRng.gen_range(0..0x00ff_ffff));
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a 24 character hex identifier")]
pub struct InvalidObjectId(pub String);

/// Store-assigned document identifier: 12 bytes rendered as 24 hex characters.
///
/// Layout: 4-byte big-endian unix seconds, 5 bytes of per-process randomness,
/// 3-byte big-endian counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn new() -> Self {
        let secs = OffsetDateTime::now_utc().unix_timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn is_valid(candidate: &str) -> bool {
        OBJECT_ID_RE.is_match(candidate)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(s) {
            return Err(InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidObjectId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert!(ObjectId::is_valid(&a.to_string()));
        assert_eq!(a.to_string().len(), 24);
    }

    #[test]
    fn parses_mixed_case_hex() {
        let id: ObjectId = "507F1F77bcf86cd799439011".parse().expect("valid id");
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
        assert_eq!(id.0[..4], [0x50, 0x7f, 0x1f, 0x77]);
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "abc", "507f1f77bcf86cd79943901", "507f1f77bcf86cd79943901z", "507f1f77bcf86cd7994390111"] {
            assert_eq!(
                bad.parse::<ObjectId>().unwrap_err(),
                InvalidObjectId(bad.to_string())
            );
        }
    }

    #[test]
    fn serializes_as_hex_string() {
        let id: ObjectId = "507f1f77bcf86cd799439011".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"507f1f77bcf86cd799439011\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
