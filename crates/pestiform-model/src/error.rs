use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("model expects feature {index} to be {expected:?}, row schema has {found:?}")]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("expected {expected} features, got {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("feature {0} is not a finite number")]
    NonFinite(usize),
}
