//! Error types for workbench operations.
//!
//! Package manager failures are categorized from their stderr so the caller
//! can tell a flaky network apart from a missing package or a permissions
//! problem and print advice accordingly. Nothing here is retried
//! automatically; every retry is the caller running the operation again.

use crate::types::Component;
use thiserror::Error;

/// Categories of package manager failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient)
    Network,
    /// Package not found in any tap
    NotFound,
    /// Version or dependency conflict
    Conflict,
    /// Permission denied
    Permission,
    /// Package is already installed
    AlreadyInstalled,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Classify package manager stderr.
    pub fn from_output(stderr: &str) -> Self {
        let stderr = stderr.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| stderr.contains(n));

        if any(&[
            "curl",
            "could not resolve",
            "connection refused",
            "timed out",
            "network",
            "ssl",
            "certificate",
            "failed to download",
            "sha256 mismatch",
        ]) {
            Self::Network
        } else if any(&[
            "no available formula",
            "no formulae found",
            "no cask with this name",
            "no such keg",
            "couldn't find",
            "is not installed",
        ]) {
            Self::NotFound
        } else if any(&["already installed", "is already an installed"]) {
            Self::AlreadyInstalled
        } else if any(&["conflict", "depends on", "is a dependency"]) {
            Self::Conflict
        } else if any(&[
            "permission denied",
            "operation not permitted",
            "cannot write",
            "sudo",
        ]) {
            Self::Permission
        } else {
            Self::Other
        }
    }

    /// Whether the operation can be treated as already done.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::AlreadyInstalled)
    }

    /// Short human-readable label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Package not found",
            Self::Conflict => "Package conflict",
            Self::Permission => "Permission denied",
            Self::AlreadyInstalled => "Already installed",
            Self::Other => "Unexpected error",
        }
    }

    /// Actionable advice for this category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and run the command again",
            Self::NotFound => "Run `brew update` and try again",
            Self::Conflict => "Remove the conflicting package and run the command again",
            Self::Permission => "Check the ownership of the Homebrew prefix",
            Self::AlreadyInstalled => "No action needed",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during workbench operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The package manager binary could not be run at all.
    #[error("Homebrew not found. Install it from https://brew.sh")]
    PackageManagerNotFound,

    /// A package manager command failed.
    #[error("brew {action} {package} failed: {message}")]
    Package {
        /// `install`, `uninstall` or `link`
        action: &'static str,
        /// Package name
        package: String,
        /// Classification of the failure
        category: ErrorCategory,
        /// Stderr of the failed command
        message: String,
    },

    /// Installing a component failed. Components installed earlier in the
    /// same run are left in place.
    #[error("failed to install {component}: {message}")]
    ComponentInstall {
        /// Component that failed to install
        component: Component,
        /// Classification of the package manager failure
        category: ErrorCategory,
        /// Package manager output
        message: String,
    },

    /// Removing a component failed.
    #[error("failed to uninstall {component}: {message}")]
    ComponentUninstall {
        /// Component that failed to uninstall
        component: Component,
        /// Classification of the failure
        category: ErrorCategory,
        /// Package manager output, or why it could not run
        message: String,
    },

    /// Starting or stopping the local cluster failed.
    #[error("could not {action} the local cluster: {message}")]
    Cluster {
        /// `start` or `stop`
        action: &'static str,
        /// Why the cluster tool failed
        message: String,
    },

    /// A project (namespace) operation failed.
    #[error("project '{name}': {source}")]
    Project {
        /// Normalized project name
        name: String,
        /// Failure reported by the cluster CLI
        #[source]
        source: reconcile::Error,
    },
}

impl Error {
    /// Category of the underlying package manager failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Package { category, .. }
            | Self::ComponentInstall { category, .. }
            | Self::ComponentUninstall { category, .. } => *category,
            _ => ErrorCategory::Other,
        }
    }

    /// Attribute a package manager failure to the component being installed.
    pub(crate) fn into_install(self, component: Component) -> Self {
        match self {
            Self::Package {
                category, message, ..
            } => Self::ComponentInstall {
                component,
                category,
                message,
            },
            other => other,
        }
    }

    /// Attribute any failure to the component being removed.
    pub(crate) fn into_uninstall(self, component: Component) -> Self {
        match self {
            Self::Package {
                category, message, ..
            } => Self::ComponentUninstall {
                component,
                category,
                message,
            },
            already @ Self::ComponentUninstall { .. } => already,
            other => Self::ComponentUninstall {
                component,
                category: other.category(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for workbench operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_network() {
        assert_eq!(
            ErrorCategory::from_output("curl: (6) Could not resolve host: ghcr.io"),
            ErrorCategory::Network
        );
    }

    #[test]
    fn test_category_not_found() {
        assert_eq!(
            ErrorCategory::from_output("Error: No available formula with the name \"minikub\""),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ErrorCategory::from_output("Error: Cask 'virtualbox' is not installed."),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn test_category_already_installed_is_ignorable() {
        let category = ErrorCategory::from_output("Warning: minikube 1.32.0 is already installed");
        assert_eq!(category, ErrorCategory::AlreadyInstalled);
        assert!(category.is_ignorable());
        assert!(!ErrorCategory::Network.is_ignorable());
    }

    #[test]
    fn test_category_permission_and_other() {
        assert_eq!(
            ErrorCategory::from_output("Permission denied @ dir_s_mkdir - /usr/local/Cellar"),
            ErrorCategory::Permission
        );
        assert_eq!(ErrorCategory::from_output(""), ErrorCategory::Other);
    }

    #[test]
    fn test_into_install_keeps_category() {
        let err = Error::Package {
            action: "install",
            package: "virtualbox".to_string(),
            category: ErrorCategory::Permission,
            message: "Permission denied".to_string(),
        }
        .into_install(Component::Hypervisor);

        assert!(matches!(
            err,
            Error::ComponentInstall {
                component: Component::Hypervisor,
                ..
            }
        ));
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert_eq!(err.to_string(), "failed to install virtualbox: Permission denied");
    }

    #[test]
    fn test_into_uninstall_names_component_without_package_manager() {
        let err = Error::PackageManagerNotFound.into_uninstall(Component::LocalCluster);
        assert!(matches!(
            err,
            Error::ComponentUninstall {
                component: Component::LocalCluster,
                category: ErrorCategory::Other,
                ..
            }
        ));
        assert!(err.to_string().contains("Homebrew not found"));
    }
}
