//! Domain error types.
//!
//! The deterministic core never fails; these errors only surface at the
//! collaborator boundary (configuration, storage, security data, market feed).

/// Top-level error type for stockdesk.
#[derive(Debug, thiserror::Error)]
pub enum StockdeskError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid input: {reason}")]
    Invalid { reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("market feed error: {reason}")]
    Feed { reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockdeskError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        StockdeskError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            StockdeskError::Io(_) => 1,
            StockdeskError::ConfigParse { .. }
            | StockdeskError::ConfigMissing { .. }
            | StockdeskError::ConfigInvalid { .. }
            | StockdeskError::Invalid { .. } => 2,
            StockdeskError::Database { .. } | StockdeskError::DatabaseQuery { .. } => 3,
            StockdeskError::NotFound { .. } => 4,
            StockdeskError::Feed { .. } => 5,
            StockdeskError::Csv { .. } | StockdeskError::Serialization(_) => 6,
        }
    }
}

impl From<&StockdeskError> for std::process::ExitCode {
    fn from(err: &StockdeskError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
