//! Typed errors of the deployment lifecycle.

use crate::lifecycle::DeploymentState;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A user-supplied input file is missing, unreadable or empty.
    #[error("input file not found or empty: {}", .path.display())]
    InputNotFound { path: PathBuf },

    /// The build manifest could not be written.
    #[error("could not write build manifest {}: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("port must be a positive integer")]
    InvalidPort,

    /// A lifecycle operation was called from a state that does not allow it.
    #[error("cannot {operation} while {state}")]
    Precondition {
        operation: &'static str,
        state: DeploymentState,
    },

    #[error("deployment failed: {source}")]
    Deployment {
        #[source]
        source: reconcile::Error,
    },

    #[error("push failed: {source}")]
    Push {
        #[source]
        source: reconcile::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
