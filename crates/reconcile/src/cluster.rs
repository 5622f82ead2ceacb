//! Local cluster backend: a pod plus a NodePort service per product.

use crate::backend::Backend;
use crate::error::{Error, Result, Step};
use crate::image::{self, ImageRef};
use crate::kubectl::Kubectl;
use crate::types::{BackendKind, ResourceKind, Target, Workload};
use crate::ROUTE_PLACEHOLDER;
use execkit::{Cmd, CommandRunner};
use std::path::Path;
use std::sync::Arc;

/// Local cluster tool.
pub const MINIKUBE: &str = "minikube";

const KINDS: &[ResourceKind] = &[ResourceKind::Pod, ResourceKind::Service];

/// Deploys into the local single-node cluster.
///
/// Images are built inside the cluster's own container daemon so pods can
/// use them without a registry (`--image-pull-policy=Never`).
pub struct ClusterBackend {
    kubectl: Kubectl,
}

impl ClusterBackend {
    /// Create a backend driving `kubectl` and `minikube` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            kubectl: Kubectl::new(runner),
        }
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.kubectl.runner()
    }

    /// Environment pointing the container CLI at the cluster's daemon.
    fn daemon_env(&self, step: Step) -> Result<Vec<(String, String)>> {
        let text = self
            .runner()
            .run_capture(&Cmd::new(MINIKUBE).args(["docker-env", "--shell", "bash"]))
            .map_err(|e| Error::command(step, e))?;
        Ok(image::parse_docker_env(&text))
    }
}

impl Backend for ClusterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cluster
    }

    fn resource_kinds(&self) -> &'static [ResourceKind] {
        KINDS
    }

    fn exists(&self, kind: ResourceKind, target: &Target) -> bool {
        if !KINDS.contains(&kind) {
            return false;
        }
        self.kubectl.get(kind, &target.name, &target.namespace)
    }

    fn delete(&self, kind: ResourceKind, target: &Target) {
        if let Err(e) = self.kubectl.delete(kind, &target.name, &target.namespace) {
            log::warn!("Could not delete {kind} {target}: {e}");
        }
    }

    fn create(&self, kind: ResourceKind, target: &Target, workload: &Workload) -> Result<()> {
        match kind {
            ResourceKind::Pod => self.kubectl.run_pod(
                &target.name,
                &target.namespace,
                &workload.image.to_string(),
                workload.port,
            ),
            ResourceKind::Service => {
                self.kubectl
                    .expose_pod(&target.name, &target.namespace, workload.port)
            }
            ResourceKind::Container => Err(Error::UnsupportedKind {
                kind,
                backend: BackendKind::Cluster,
            }),
        }
    }

    fn build_image(&self, manifest: &Path, context: &Path, image: &ImageRef) -> Result<()> {
        let env = self.daemon_env(Step::Build)?;
        image::build(self.runner(), &env, manifest, context, image)
    }

    fn resolve_address(&self, target: &Target, _port: u16) -> Result<String> {
        let cmd = Cmd::new(MINIKUBE)
            .args(["service", target.name.as_str()])
            .args(["--namespace", target.namespace.as_str()])
            .arg("--url");
        let output = self
            .runner()
            .run_capture(&cmd)
            .map_err(|e| Error::command(Step::ResolveAddress, e))?;

        // One URL per exposed port; the service exposes exactly one.
        let url = output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| Error::Reconciliation {
                step: Step::ResolveAddress,
                cause: format!("`{cmd}` printed no URL"),
            })?;

        Ok(format!("{}/{ROUTE_PLACEHOLDER}", url.trim_end_matches('/')))
    }

    fn push_image(&self, image: &ImageRef, registry: &str) -> Result<ImageRef> {
        let env = self.daemon_env(Step::Push)?;
        image::push(self.runner(), &env, image, registry)
    }
}
