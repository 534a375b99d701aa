use std::path::PathBuf;

use thiserror::Error;

/// Exit code reported when the operator interrupts a run (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Terminal failures of the scheme selector and the model provisioner.
///
/// None of these are retried; every one ends the invoking process with a
/// non-zero exit code (see [`ProvisionError::exit_code`]).
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no buildable scheme found")]
    NoSchemeFound,

    #[error("failed to parse scheme report: {reason}")]
    MalformedReport { reason: String },

    #[error("no model identifiers provided")]
    EmptyRequest,

    #[error("unknown model identifiers: {}", .identifiers.join(", "))]
    UnknownIdentifier { identifiers: Vec<String> },

    #[error("failed to download {identifier}: {cause:#}")]
    FetchFailed {
        identifier: String,
        cause: anyhow::Error,
    },

    #[error("download cancelled by user")]
    Interrupted,

    #[error("io error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedReport {
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}
