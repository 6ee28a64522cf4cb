//! Error types of a rules run.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use qbt_rules_types::ClientError;

/// Errors raised while loading the rules file.
#[derive(Error, Debug)]
pub enum RulesError {
    /// The rules file does not exist.
    #[error("rules file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The rules file could not be read.
    #[error("failed to read rules file {}: {source}", path.display())]
    Io {
        /// Path of the rules file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The rules file is not valid YAML.
    #[error("failed to parse YAML rules: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The rules document is valid YAML but its top level is not a mapping.
    #[error("failed to parse YAML rules: top level must be a mapping")]
    NotAMapping,
}

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The rules file is missing or malformed.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The torrent file to submit does not exist.
    #[error("file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The torrent file to submit exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    SourceUnreadable {
        /// Path of the torrent file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The added torrent never showed up under the marker tag.
    #[error("added torrent not found by tag within {0:?}")]
    RegistrationTimeout(Duration),

    /// A fatal remote call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RunError {
    /// Process exit code: 2 for configuration and usage errors, 1 for operational failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Rules(_)
            | Self::SourceNotFound(_)
            | Self::SourceUnreadable { .. }
            | Self::Client(ClientError::MissingCredentials)
            | Self::Client(ClientError::InvalidUrl(_)) => 2,
            Self::RegistrationTimeout(_) | Self::Client(_) => 1,
        }
    }
}
