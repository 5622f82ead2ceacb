//! Backend capability for reconciling runtime resources
//!
//! A backend knows how to query, delete and create the resources that make
//! up one deployed service. Callers drive it only through this trait and
//! never branch on which backend they hold.

use crate::error::Result;
use crate::image::ImageRef;
use crate::types::{ApplyResult, BackendKind, ResourceKind, ReconcileSummary, Target, Workload};
use std::path::Path;

/// Core trait for deployment backends
///
/// Implementors provide the primitives (`exists`, `delete`, `create`, ...).
/// The reconciliation policy lives in the provided methods:
/// - `ensure_absent` deletes only what exists and never verifies afterwards
/// - `ensure_present_fresh` always deletes and recreates, it never patches
///   a running resource in place
pub trait Backend: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Resource kinds making up one deployed service, in creation order
    fn resource_kinds(&self) -> &'static [ResourceKind];

    /// Whether the resource exists
    ///
    /// Read-only. A failed query counts as "absent"; this never errors.
    fn exists(&self, kind: ResourceKind, target: &Target) -> bool;

    /// Delete the resource, best-effort
    ///
    /// Failures are logged and swallowed.
    fn delete(&self, kind: ResourceKind, target: &Target);

    /// Create the resource from the workload
    fn create(&self, kind: ResourceKind, target: &Target, workload: &Workload) -> Result<()>;

    /// Build the workload image from a build manifest
    fn build_image(&self, manifest: &Path, context: &Path, image: &ImageRef) -> Result<()>;

    /// Address under which the deployed service is reachable
    fn resolve_address(&self, target: &Target, port: u16) -> Result<String>;

    /// Tag the image for `registry` and push it
    fn push_image(&self, image: &ImageRef, registry: &str) -> Result<ImageRef>;

    /// Make sure the resource does not exist
    ///
    /// No-op when it is already absent.
    fn ensure_absent(&self, kind: ResourceKind, target: &Target) -> ApplyResult {
        if !self.exists(kind, target) {
            log::debug!("{kind} {target} not found, nothing to delete");
            return ApplyResult::NoChange;
        }

        log::info!("Deleting {kind} {target}");
        self.delete(kind, target);
        ApplyResult::Removed
    }

    /// Make sure a fresh copy of the resource runs the given workload
    fn ensure_present_fresh(
        &self,
        kind: ResourceKind,
        target: &Target,
        workload: &Workload,
    ) -> Result<ApplyResult> {
        let previous = self.ensure_absent(kind, target);

        log::info!("Creating {kind} {target} from {}", workload.image);
        self.create(kind, target, workload)?;

        Ok(match previous {
            ApplyResult::Removed => ApplyResult::Replaced,
            _ => ApplyResult::Created,
        })
    }

    /// `ensure_present_fresh` for every resource kind of this backend
    fn reconcile_present(&self, target: &Target, workload: &Workload) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        for &kind in self.resource_kinds() {
            let result = self.ensure_present_fresh(kind, target, workload)?;
            summary.push(kind, result);
        }
        Ok(summary)
    }

    /// `ensure_absent` for every resource kind of this backend
    fn reconcile_absent(&self, target: &Target) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for &kind in self.resource_kinds() {
            summary.push(kind, self.ensure_absent(kind, target));
        }
        summary
    }
}

/// A boxed backend for type-erased storage
pub type BoxedBackend = Box<dyn Backend>;

#[cfg(test)]
pub(crate) mod fake {
    //! Stateful stand-in for `kubectl`, `minikube` and `docker`.

    use execkit::{Cmd, CommandOutput, CommandRunner};
    use std::collections::HashSet;
    use std::sync::{Mutex, PoisonError};

    /// Tracks which `(kind, name)` resources exist and answers the CLI
    /// calls the backends make accordingly.
    #[derive(Debug, Default)]
    pub struct FakeRuntime {
        resources: Mutex<HashSet<(String, String)>>,
        pub log: Mutex<Vec<String>>,
    }

    impl FakeRuntime {
        pub fn insert(&self, kind: &str, name: &str) {
            self.resources
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((kind.to_string(), name.to_string()));
        }

        pub fn contains(&self, kind: &str, name: &str) -> bool {
            self.resources
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&(kind.to_string(), name.to_string()))
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|l| l.starts_with(prefix))
                .count()
        }

        fn remove(&self, kind: &str, name: &str) {
            self.resources
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&(kind.to_string(), name.to_string()));
        }

        fn answer(&self, present: bool) -> CommandOutput {
            if present {
                CommandOutput::success("")
            } else {
                CommandOutput::failure(1, "NotFound")
            }
        }
    }

    impl CommandRunner for FakeRuntime {
        fn run(&self, cmd: &Cmd) -> execkit::Result<CommandOutput> {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(cmd.to_string());

            let args: Vec<&str> = cmd.get_args().iter().map(String::as_str).collect();
            let output = match (cmd.program(), args.as_slice()) {
                ("kubectl", ["get", kind, name, ..]) => self.answer(self.contains(kind, name)),
                ("kubectl", ["delete", kind, name, ..]) => {
                    let present = self.contains(kind, name);
                    self.remove(kind, name);
                    self.answer(present)
                }
                ("kubectl", ["run", name, ..]) => {
                    if self.contains("pod", name) {
                        CommandOutput::failure(1, "AlreadyExists")
                    } else {
                        self.insert("pod", name);
                        CommandOutput::success("")
                    }
                }
                ("kubectl", ["expose", "pod", name, ..]) => {
                    if self.contains("service", name) {
                        CommandOutput::failure(1, "AlreadyExists")
                    } else {
                        self.insert("service", name);
                        CommandOutput::success("")
                    }
                }
                ("minikube", ["service", ..]) => {
                    CommandOutput::success("http://192.168.99.100:31234\n")
                }
                ("docker", ["container", "inspect", name]) => {
                    self.answer(self.contains("container", name))
                }
                ("docker", ["rm", "-f", name]) => {
                    let present = self.contains("container", name);
                    self.remove("container", name);
                    self.answer(present)
                }
                ("docker", ["run", "-d", "--name", name, ..]) => {
                    if self.contains("container", name) {
                        CommandOutput::failure(125, "Conflict")
                    } else {
                        self.insert("container", name);
                        CommandOutput::success("0123abcd")
                    }
                }
                _ => CommandOutput::success(""),
            };
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeRuntime;
    use super::*;
    use crate::cluster::ClusterBackend;
    use crate::local::LocalBackend;
    use crate::name::ResourceName;
    use std::sync::Arc;

    fn workload() -> Workload {
        Workload {
            image: ImageRef::latest(&ResourceName::from("api")),
            port: 8000,
        }
    }

    fn backends(runtime: &Arc<FakeRuntime>) -> Vec<BoxedBackend> {
        vec![
            Box::new(ClusterBackend::new(runtime.clone())),
            Box::new(LocalBackend::new(runtime.clone())),
        ]
    }

    #[test]
    fn test_ensure_present_fresh_twice_converges() {
        let runtime = Arc::new(FakeRuntime::default());
        let target = Target::new("api", "demo");

        for backend in backends(&runtime) {
            let first = backend.reconcile_present(&target, &workload()).unwrap();
            let after_first: Vec<bool> = backend
                .resource_kinds()
                .iter()
                .map(|&k| backend.exists(k, &target))
                .collect();

            let second = backend.reconcile_present(&target, &workload()).unwrap();
            let after_second: Vec<bool> = backend
                .resource_kinds()
                .iter()
                .map(|&k| backend.exists(k, &target))
                .collect();

            assert!(after_first.iter().all(|e| *e));
            assert_eq!(after_first, after_second);
            for &kind in backend.resource_kinds() {
                assert_eq!(first.get(kind), Some(ApplyResult::Created));
                assert_eq!(second.get(kind), Some(ApplyResult::Replaced));
            }
        }
    }

    #[test]
    fn test_ensure_absent_then_exists_is_false() {
        let runtime = Arc::new(FakeRuntime::default());
        let target = Target::new("api", "demo");

        for backend in backends(&runtime) {
            backend.reconcile_present(&target, &workload()).unwrap();
            for &kind in backend.resource_kinds() {
                assert_eq!(backend.ensure_absent(kind, &target), ApplyResult::Removed);
                assert!(!backend.exists(kind, &target));
            }
        }
    }

    #[test]
    fn test_ensure_absent_is_noop_when_missing() {
        let runtime = Arc::new(FakeRuntime::default());
        let target = Target::new("ghost", "p");

        for backend in backends(&runtime) {
            let summary = backend.reconcile_absent(&target);
            assert_eq!(summary.total_changes(), 0);
        }
        assert_eq!(runtime.count("kubectl delete"), 0);
        assert_eq!(runtime.count("docker rm"), 0);
    }

    #[test]
    fn test_replace_deletes_before_create() {
        let runtime = Arc::new(FakeRuntime::default());
        runtime.insert("container", "api");
        let backend = LocalBackend::new(runtime.clone());

        let result = backend
            .ensure_present_fresh(ResourceKind::Container, &Target::new("api", "x"), &workload())
            .unwrap();

        assert_eq!(result, ApplyResult::Replaced);
        let log = runtime.log.lock().unwrap().clone();
        let rm = log.iter().position(|l| l.starts_with("docker rm")).unwrap();
        let run = log.iter().position(|l| l.starts_with("docker run")).unwrap();
        assert!(rm < run);
    }
}
