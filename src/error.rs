use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a harvest run. Per-request failures never reach this type.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("environment variables ISLANDSUN_USERNAME and ISLANDSUN_PASSWORD must be provided")]
    MissingCredentials,
    #[error("login failed: {source:#}")]
    Authentication {
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarvestError {
    pub fn authentication(source: impl Into<anyhow::Error>) -> Self {
        HarvestError::Authentication {
            source: source.into(),
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarvestError::MissingCredentials => 2,
            HarvestError::Authentication { .. } => 3,
            HarvestError::Output { .. } => 1,
        }
    }
}
