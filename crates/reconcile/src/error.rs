//! Error types for reconciliation.

use crate::types::{BackendKind, ResourceKind};
use std::fmt;
use thiserror::Error;

/// The reconciliation step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Building the image from the build manifest
    Build,
    /// Deleting an existing resource
    Delete,
    /// Creating a pod or running a container
    Create,
    /// Exposing a pod through a service
    Expose,
    /// Resolving the externally reachable address
    ResolveAddress,
    /// Creating or deleting a namespace
    Namespace,
    /// Tagging an image for a registry
    Tag,
    /// Pushing an image to a registry
    Push,
    /// Read-only queries against the cluster
    Query,
}

impl Step {
    /// Label used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build image",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Expose => "expose",
            Self::ResolveAddress => "resolve address",
            Self::Namespace => "namespace",
            Self::Tag => "tag image",
            Self::Push => "push image",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while reconciling resources.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend command failed.
    #[error("{step} failed: {cause}")]
    Reconciliation {
        /// Step that failed
        step: Step,
        /// What went wrong, including the offending command
        cause: String,
    },

    /// The backend has no notion of this resource kind.
    #[error("{kind} resources are not managed by the {backend} backend")]
    UnsupportedKind {
        /// Kind that was asked for
        kind: ResourceKind,
        /// Backend that was asked
        backend: BackendKind,
    },
}

impl Error {
    /// Wrap a command failure with the step it happened in.
    pub fn command(step: Step, source: execkit::Error) -> Self {
        Self::Reconciliation {
            step,
            cause: source.to_string(),
        }
    }

    /// Step that failed, if the error came from a command.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Reconciliation { step, .. } => Some(*step),
            Self::UnsupportedKind { .. } => None,
        }
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_keeps_step_and_command() {
        let err = Error::command(
            Step::Expose,
            execkit::Error::Failed {
                command: "kubectl expose pod api".to_string(),
                code: Some(1),
                stderr: "AlreadyExists".to_string(),
            },
        );
        assert_eq!(err.step(), Some(Step::Expose));
        let msg = err.to_string();
        assert!(msg.starts_with("expose failed:"));
        assert!(msg.contains("kubectl expose pod api"));
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = Error::UnsupportedKind {
            kind: ResourceKind::Pod,
            backend: BackendKind::Local,
        };
        assert_eq!(err.to_string(), "pod resources are not managed by the local backend");
        assert_eq!(err.step(), None);
    }
}
