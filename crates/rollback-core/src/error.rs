use std::fmt;

use thiserror::Error;

/// The external step a collaborator failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Credentials,
    ListRevisions,
    UpdateTraffic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Credentials => "credential activation",
            Stage::ListRevisions => "revision listing",
            Stage::UpdateTraffic => "traffic update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RollbackError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{stage} failed")]
    Collaborator {
        stage: Stage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("no retired revision found for service {service}")]
    NotFound { service: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Collaborator,
    NotFound,
}

impl RollbackError {
    pub fn collaborator(
        stage: Stage,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RollbackError::Collaborator {
            stage,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RollbackError::Configuration(_) => ErrorKind::Configuration,
            RollbackError::Collaborator { .. } => ErrorKind::Collaborator,
            RollbackError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}
