//! # reconcile
//!
//! Keeps the runtime resources of a deployed service in a known state.
//!
//! A [`Backend`] exposes query, delete and create primitives for the
//! resources that make up one service. Two policies are built on top:
//!
//! - **ensure absent**: delete the resource only if it exists
//! - **ensure present fresh**: delete whatever is there, then create anew
//!
//! Two backends ship with the crate:
//!
//! - [`ClusterBackend`]: a pod and a NodePort service in a local cluster
//! - [`LocalBackend`]: a single container on the host daemon
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::{Backend, ClusterBackend, ImageRef, Target, Workload};
//! use std::sync::Arc;
//!
//! let backend = ClusterBackend::new(Arc::new(execkit::SystemRunner::new()));
//! let target = Target::new("my_api", "my_project");
//! let workload = Workload {
//!     image: ImageRef::latest(&target.name),
//!     port: 8000,
//! };
//!
//! let summary = backend.reconcile_present(&target, &workload).unwrap();
//! println!("{} changes", summary.total_changes());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cluster;
pub mod error;
pub mod image;
pub mod kubectl;
pub mod local;
pub mod name;
pub mod types;

pub use backend::{Backend, BoxedBackend};
pub use cluster::ClusterBackend;
pub use error::{Error, Result, Step};
pub use image::ImageRef;
pub use kubectl::Kubectl;
pub use local::LocalBackend;
pub use name::{ResourceName, normalize};
pub use types::{
    ApplyResult, BackendKind, ReconcileSummary, ResourceKind, Target, Workload,
};

use execkit::CommandRunner;
use std::sync::Arc;

/// Stand-in for the application route in reported addresses.
pub const ROUTE_PLACEHOLDER: &str = "<your_route>";

/// Create the backend of the given kind.
pub fn backend_for(kind: BackendKind, runner: Arc<dyn CommandRunner>) -> BoxedBackend {
    match kind {
        BackendKind::Cluster => Box::new(ClusterBackend::new(runner)),
        BackendKind::Local => Box::new(LocalBackend::new(runner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use execkit::MockRunner;

    #[test]
    fn test_backend_for_kind() {
        let runner: Arc<dyn CommandRunner> = Arc::new(MockRunner::new());
        assert_eq!(
            backend_for(BackendKind::Cluster, runner.clone()).kind(),
            BackendKind::Cluster
        );
        assert_eq!(
            backend_for(BackendKind::Local, runner).kind(),
            BackendKind::Local
        );
    }

    #[test]
    fn test_cluster_kinds_in_creation_order() {
        let backend = backend_for(BackendKind::Cluster, Arc::new(MockRunner::new()));
        assert_eq!(
            backend.resource_kinds(),
            &[ResourceKind::Pod, ResourceKind::Service]
        );
    }
}
