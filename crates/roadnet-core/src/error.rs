//! Error types for roadnet

use thiserror::Error;

/// The main error type for roadnet operations
#[derive(Debug, Error)]
pub enum RoadError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid geometry on road {road} lane {lane}: {crossings} crossings exceed tolerance {tolerance}")]
    InvalidGeometry {
        road: String,
        lane: String,
        crossings: usize,
        tolerance: usize,
    },

    #[error("Invalid transaction state: {0}")]
    InvalidState(String),

    #[error("Unsupported edit {edit} for {category}")]
    UnsupportedEdit { edit: String, category: String },

    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl RoadError {
    /// Stale id resolved after a removal. Expected during reversal races
    /// between composed sub-edits and never surfaced to the user.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, RoadError::EntityNotFound(_))
    }

    /// Lane boundaries folded beyond the repair tolerance.
    pub fn is_geometry_invalid(&self) -> bool {
        matches!(self, RoadError::InvalidGeometry { .. })
    }

    /// The edit was refused before anything was applied.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RoadError::Precondition(_) | RoadError::UnsupportedEdit { .. }
        )
    }
}

/// Result type alias for roadnet operations
pub type Result<T> = std::result::Result<T, RoadError>;

impl From<toml::de::Error> for RoadError {
    fn from(err: toml::de::Error) -> Self {
        RoadError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for RoadError {
    fn from(err: toml::ser::Error) -> Self {
        RoadError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(RoadError::EntityNotFound("road 3".into()).is_lookup_failure());
        assert!(RoadError::Precondition("too few points".into()).is_precondition());
        assert!(RoadError::UnsupportedEdit {
            edit: "InsertControlPoint".into(),
            category: "TwoStraightLineRoad".into(),
        }
        .is_precondition());

        let invalid = RoadError::InvalidGeometry {
            road: "1".into(),
            lane: "left 1".into(),
            crossings: 12,
            tolerance: 8,
        };
        assert!(invalid.is_geometry_invalid());
        assert!(!invalid.is_lookup_failure());
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: RoadError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, RoadError::TomlParseError(_)));
    }
}
