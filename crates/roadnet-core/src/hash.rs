//! Change detection for the export sync

use crate::error::{Result, RoadError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of an entity's export record.
///
/// The export sync keeps the hash it last sent for every road, junction
/// and signal. A dirty entity whose record hashes the same is skipped, so
/// an edit followed by its undo exports nothing.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash the JSON form of an export record.
    pub fn of_record<T: Serialize + ?Sized>(record: &T) -> Result<Self> {
        let json = serde_json::to_vec(record).map_err(|e| RoadError::Export(e.to_string()))?;
        Ok(Self(Sha256::digest(&json).into()))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..12])
    }
}
