//! Structured error type shared by every layer of the core.
//!
//! Only `LocationNotFound` and `InsufficientData` ever reach a renderer, and
//! they do so as an empty placeholder `Stat`. Everything else ends up as a
//! diagnostic string on the owning `StatSource`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    #[error("location not found: {code}")]
    LocationNotFound { code: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cache read failed: {0}")]
    CacheRead(String),

    #[error("cache write failed: {0}")]
    CacheWrite(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("No data")]
    NoData,

    #[error("decode failure: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("reference dataset error: {0}")]
    Catalog(String),
}

impl StatError {
    /// Errors that are rendered as an empty placeholder stat instead of a
    /// bare diagnostic.
    pub fn yields_placeholder(&self) -> bool {
        matches!(
            self,
            StatError::LocationNotFound { .. } | StatError::InsufficientData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_errors() {
        assert!(StatError::LocationNotFound { code: "X".into() }.yields_placeholder());
        assert!(StatError::InsufficientData("one sample".into()).yields_placeholder());
        assert!(!StatError::NoData.yields_placeholder());
        assert!(!StatError::Transport("refused".into()).yields_placeholder());
    }

    #[test]
    fn no_data_message_matches_diagnostic() {
        assert_eq!(StatError::NoData.to_string(), "No data");
    }
}
