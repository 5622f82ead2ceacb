//! Deployment lifecycle: `prepare -> deploy -> (push | delete)`.
//!
//! ```text
//!                 prepare (always allowed)
//!      ┌──────────────────────────────────────────┐
//!      v                                          │
//! Uninitialized ──prepare──> Prepared ──deploy──> Deployed ──push──> Deployed
//!                               │  ^                 │
//!                        deploy │  │ prepare          │ deploy (error)
//!                      (error)  v  │                 v
//!                              Failed <──────────────┘
//! ```
//!
//! A failed `prepare` or `push` leaves the state alone. `delete` acts on an
//! explicit product/project and never touches the state either.

use execkit::CommandRunner;
use reconcile::{
    ApplyResult, BackendKind, BoxedBackend, ImageRef, ReconcileSummary, ResourceName, Target,
    Workload,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::{self, BuildManifest, ServiceSpec};
use crate::error::{Error, Result};
use crate::session::Session;

/// Product name used when none is given
pub const DEFAULT_PRODUCT: &str = "my-product";

/// Project name used when none is given
pub const DEFAULT_PROJECT: &str = "my-project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    #[default]
    Uninitialized,
    Prepared,
    Deployed,
    Failed,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Prepared => "prepared",
            Self::Deployed => "deployed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of `delete`: which resources were removed and which were
/// already gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub target: Target,
    pub backend: BackendKind,
    pub summary: ReconcileSummary,
}

impl DeleteReport {
    pub fn not_found(&self) -> Vec<reconcile::ResourceKind> {
        self.summary.not_found()
    }

    pub fn removed(&self) -> Vec<reconcile::ResourceKind> {
        self.summary
            .results
            .iter()
            .filter(|(_, r)| *r == ApplyResult::Removed)
            .map(|(k, _)| *k)
            .collect()
    }
}

/// Drives one product through prepare, deploy, push and delete.
pub struct Deployment {
    runner: Arc<dyn CommandRunner>,
    workdir: PathBuf,
    state: DeploymentState,
    product: ResourceName,
    project: ResourceName,
    spec: Option<ServiceSpec>,
    manifest: Option<BuildManifest>,
    backend: Option<BackendKind>,
    image: Option<ImageRef>,
    address: Option<String>,
}

impl Deployment {
    pub fn new(session: &Session) -> Self {
        Self {
            runner: session.runner(),
            workdir: session.workdir().to_path_buf(),
            state: DeploymentState::Uninitialized,
            product: ResourceName::new(DEFAULT_PRODUCT),
            project: ResourceName::new(DEFAULT_PROJECT),
            spec: None,
            manifest: None,
            backend: None,
            image: None,
            address: None,
        }
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    pub fn product(&self) -> &ResourceName {
        &self.product
    }

    pub fn project(&self) -> &ResourceName {
        &self.project
    }

    pub fn manifest(&self) -> Option<&BuildManifest> {
        self.manifest.as_ref()
    }

    /// Backend chosen by the last `deploy`
    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Address resolved by the last successful `deploy`
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn target(&self) -> Target {
        Target::new(&self.product, &self.project)
    }

    fn backend_for(&self, kind: BackendKind) -> BoxedBackend {
        reconcile::backend_for(kind, self.runner.clone())
    }

    /// Write the build manifest for `spec`. Allowed from every state.
    pub fn prepare(
        &mut self,
        spec: ServiceSpec,
        product: Option<&str>,
        project: Option<&str>,
    ) -> Result<&BuildManifest> {
        let manifest = artifact::build(&spec, &self.workdir)?;

        self.product = ResourceName::new(product.unwrap_or(DEFAULT_PRODUCT));
        self.project = ResourceName::new(project.unwrap_or(DEFAULT_PROJECT));
        self.spec = Some(spec);
        self.state = DeploymentState::Prepared;
        log::info!("Prepared {} in project {}", self.product, self.project);

        Ok(&*self.manifest.insert(manifest))
    }

    /// Build the image and bring the runtime resources up fresh.
    ///
    /// Returns the address the service can be reached at. Any failure moves
    /// the lifecycle to `Failed`; deploying again is allowed from there.
    pub fn deploy(&mut self, kind: BackendKind) -> Result<&str> {
        let (Some(spec), Some(manifest)) = (self.spec.clone(), self.manifest.clone()) else {
            return Err(Error::Precondition {
                operation: "deploy",
                state: self.state,
            });
        };

        self.backend = Some(kind);
        let backend = self.backend_for(kind);
        let target = self.target();
        let image = ImageRef::latest(&self.product);
        log::info!("Deploying {target} to the {kind} backend");

        let result = backend
            .build_image(&manifest.path, &self.workdir, &image)
            .and_then(|()| {
                let workload = Workload {
                    image: image.clone(),
                    port: spec.port(),
                };
                backend.reconcile_present(&target, &workload)
            })
            .and_then(|summary| {
                log::debug!("{} resources changed", summary.total_changes());
                backend.resolve_address(&target, spec.port())
            });

        match result {
            Ok(address) => {
                self.state = DeploymentState::Deployed;
                self.image = Some(image);
                log::info!("{target} reachable at {address}");
                Ok(self.address.insert(address).as_str())
            }
            Err(source) => {
                self.state = DeploymentState::Failed;
                self.address = None;
                Err(Error::Deployment { source })
            }
        }
    }

    /// Tag the deployed image for `registry` and push it.
    pub fn push(&self, registry: &str) -> Result<ImageRef> {
        let (Some(kind), Some(image)) = (self.backend, &self.image) else {
            return Err(Error::Precondition {
                operation: "push",
                state: self.state,
            });
        };
        if self.state != DeploymentState::Deployed {
            return Err(Error::Precondition {
                operation: "push",
                state: self.state,
            });
        }

        self.backend_for(kind)
            .push_image(image, registry)
            .map_err(|source| Error::Push { source })
    }

    /// Remove the resources of any product, not just the tracked one.
    ///
    /// Uses `backend`, else the backend of the last deploy, else the cluster.
    /// Resources that do not exist are reported, not treated as errors.
    pub fn delete(
        &self,
        product: &str,
        project: &str,
        backend: Option<BackendKind>,
    ) -> DeleteReport {
        let kind = backend.or(self.backend).unwrap_or_default();
        let target = Target::new(product, project);
        log::info!("Deleting {target} from the {kind} backend");

        let summary = self.backend_for(kind).reconcile_absent(&target);
        DeleteReport {
            target,
            backend: kind,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use execkit::{CommandOutput, MockRunner};
    use reconcile::ResourceKind;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        mock: MockRunner,
    }

    impl Fixture {
        fn new(mock: MockRunner) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("app.py"), "print('hello')\nprint('world')\n").unwrap();
            fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
            Self { dir, mock }
        }

        fn deployment(&self) -> Deployment {
            let session = Session::with_runner(
                self.dir.path().to_path_buf(),
                Arc::new(self.mock.clone()),
                Settings::default(),
            );
            Deployment::new(&session)
        }
    }

    fn spec() -> ServiceSpec {
        ServiceSpec::new("app.py", "requirements.txt", 8000, "3.7").unwrap()
    }

    #[test]
    fn test_prepare_writes_port_and_transitions() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();

        let manifest = deployment.prepare(spec(), None, None).unwrap();
        assert!(manifest.contents.contains("8000"));
        assert_eq!(deployment.state(), DeploymentState::Prepared);
        assert_eq!(deployment.product().as_str(), "my-product");
        assert_eq!(deployment.project().as_str(), "my-project");
        assert!(fx.mock.calls().is_empty());
    }

    #[test]
    fn test_failed_prepare_keeps_state() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("api"), None).unwrap();

        let missing = ServiceSpec::new("gone.py", "requirements.txt", 8000, "3.7").unwrap();
        assert!(matches!(
            deployment.prepare(missing, Some("other"), None),
            Err(Error::InputNotFound { .. })
        ));
        assert_eq!(deployment.state(), DeploymentState::Prepared);
        assert_eq!(deployment.product().as_str(), "api");
    }

    #[test]
    fn test_deploy_before_prepare_is_precondition_error() {
        for kind in [BackendKind::Cluster, BackendKind::Local] {
            let fx = Fixture::new(MockRunner::new());
            let mut deployment = fx.deployment();

            let err = deployment.deploy(kind).unwrap_err();
            assert!(matches!(
                err,
                Error::Precondition {
                    operation: "deploy",
                    state: DeploymentState::Uninitialized
                }
            ));
            assert!(fx.mock.calls().is_empty());
        }
    }

    #[test]
    fn test_local_deploy_scenario() {
        let fx = Fixture::new(MockRunner::new());
        fx.mock.on("docker container inspect", CommandOutput::failure(1, "No such container"));
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("my_api"), None).unwrap();

        let address = deployment.deploy(BackendKind::Local).unwrap().to_string();

        assert_eq!(address, "localhost:8000/<your_route>");
        assert_eq!(deployment.state(), DeploymentState::Deployed);
        assert_eq!(deployment.backend(), Some(BackendKind::Local));
        assert!(fx.mock.was_called("docker run -d --name my-api -p 8000:8000 my-api:latest"));
        assert!(!fx.mock.was_called("docker rm"));

        let build = fx.mock.command_lines().into_iter().next().unwrap();
        assert!(build.starts_with("docker build -t my-api:latest -f "));
    }

    #[test]
    fn test_redeploy_replaces_container() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("api"), None).unwrap();
        deployment.deploy(BackendKind::Local).unwrap();
        deployment.deploy(BackendKind::Local).unwrap();

        assert_eq!(fx.mock.count("docker rm -f api"), 2);
        assert_eq!(fx.mock.count("docker run"), 2);
        assert_eq!(deployment.state(), DeploymentState::Deployed);
    }

    #[test]
    fn test_cluster_deploy_resolves_service_url() {
        let fx = Fixture::new(MockRunner::new());
        fx.mock.on("kubectl get", CommandOutput::failure(1, "NotFound"));
        fx.mock.on(
            "minikube service",
            CommandOutput::success("http://192.168.99.100:31000\n"),
        );
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("api"), Some("team")).unwrap();

        let address = deployment.deploy(BackendKind::Cluster).unwrap().to_string();
        assert_eq!(address, "http://192.168.99.100:31000/<your_route>");
        assert!(fx.mock.was_called("kubectl run api --image=api:latest"));
        assert!(fx.mock.was_called("kubectl expose pod api --type=NodePort --port=8000 --namespace team"));
    }

    #[test]
    fn test_failed_deploy_then_retry() {
        let fx = Fixture::new(MockRunner::new());
        fx.mock.on("docker run", CommandOutput::failure(125, "port is already allocated"));
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), None, None).unwrap();

        let err = deployment.deploy(BackendKind::Local).unwrap_err();
        assert!(matches!(err, Error::Deployment { .. }));
        assert_eq!(deployment.state(), DeploymentState::Failed);
        assert_eq!(deployment.address(), None);

        fx.mock.on("docker run", CommandOutput::success("abc123"));
        deployment.deploy(BackendKind::Local).unwrap();
        assert_eq!(deployment.state(), DeploymentState::Deployed);
    }

    #[test]
    fn test_build_failure_fails_deployment() {
        let fx = Fixture::new(MockRunner::new());
        fx.mock.on("docker build", CommandOutput::failure(1, "no space left on device"));
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), None, None).unwrap();

        let err = deployment.deploy(BackendKind::Local).unwrap_err();
        assert!(err.to_string().contains("build image failed"));
        assert_eq!(deployment.state(), DeploymentState::Failed);
        assert!(!fx.mock.was_called("docker run"));
    }

    #[test]
    fn test_push_only_when_deployed() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("api"), None).unwrap();
        assert!(matches!(
            deployment.push("docker.io/acme"),
            Err(Error::Precondition { operation: "push", .. })
        ));

        deployment.deploy(BackendKind::Local).unwrap();
        let pushed = deployment.push("docker.io/acme").unwrap();
        assert_eq!(pushed.to_string(), "docker.io/acme/api:latest");
    }

    #[test]
    fn test_push_failure_keeps_state() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), None, None).unwrap();
        deployment.deploy(BackendKind::Local).unwrap();

        fx.mock.on("docker push", CommandOutput::failure(1, "denied: requested access"));
        assert!(matches!(
            deployment.push("docker.io/acme"),
            Err(Error::Push { .. })
        ));
        assert_eq!(deployment.state(), DeploymentState::Deployed);
    }

    #[test]
    fn test_push_after_failed_redeploy_is_rejected() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), None, None).unwrap();
        deployment.deploy(BackendKind::Local).unwrap();

        fx.mock.on("docker build", CommandOutput::failure(1, "boom"));
        deployment.deploy(BackendKind::Local).unwrap_err();
        assert!(matches!(
            deployment.push("docker.io/acme"),
            Err(Error::Precondition { state: DeploymentState::Failed, .. })
        ));
    }

    #[test]
    fn test_delete_missing_resources_reports_not_found() {
        let fx = Fixture::new(MockRunner::failing());
        let deployment = fx.deployment();

        let report = deployment.delete("ghost", "p", None);
        assert_eq!(report.backend, BackendKind::Cluster);
        assert_eq!(
            report.not_found(),
            vec![ResourceKind::Pod, ResourceKind::Service]
        );
        assert!(report.removed().is_empty());
        assert!(!fx.mock.was_called("kubectl delete"));
        assert_eq!(deployment.state(), DeploymentState::Uninitialized);
    }

    #[test]
    fn test_delete_other_product_keeps_state() {
        let fx = Fixture::new(MockRunner::new());
        let mut deployment = fx.deployment();
        deployment.prepare(spec(), Some("api"), None).unwrap();
        deployment.deploy(BackendKind::Local).unwrap();

        let report = deployment.delete("worker", "ignored", None);
        assert_eq!(report.backend, BackendKind::Local);
        assert_eq!(report.removed(), vec![ResourceKind::Container]);
        assert!(fx.mock.was_called("docker rm -f worker"));
        assert_eq!(deployment.state(), DeploymentState::Deployed);
        assert_eq!(deployment.product().as_str(), "api");
    }
}
