//! Local container backend: one `docker` container per product.

use crate::backend::Backend;
use crate::error::{Error, Result, Step};
use crate::image::{self, DOCKER, ImageRef};
use crate::types::{BackendKind, ResourceKind, Target, Workload};
use crate::ROUTE_PLACEHOLDER;
use execkit::{Cmd, CommandRunner};
use std::path::Path;
use std::sync::Arc;

const KINDS: &[ResourceKind] = &[ResourceKind::Container];

/// Runs products as containers on the host's default daemon.
///
/// The namespace of a [`Target`] has no meaning here; containers are keyed
/// by name alone.
pub struct LocalBackend {
    runner: Arc<dyn CommandRunner>,
}

impl LocalBackend {
    /// Create a backend driving `docker` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Backend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn resource_kinds(&self) -> &'static [ResourceKind] {
        KINDS
    }

    fn exists(&self, kind: ResourceKind, target: &Target) -> bool {
        if kind != ResourceKind::Container {
            return false;
        }
        // `container inspect` so an image of the same name doesn't count
        self.runner.probe(
            &Cmd::new(DOCKER).args(["container", "inspect", target.name.as_str()]),
        )
    }

    fn delete(&self, kind: ResourceKind, target: &Target) {
        if kind != ResourceKind::Container {
            return;
        }
        let cmd = Cmd::new(DOCKER).args(["rm", "-f", target.name.as_str()]);
        if let Err(e) = self.runner.run_checked(&cmd) {
            log::warn!("Could not remove container {}: {e}", target.name);
        }
    }

    fn create(&self, kind: ResourceKind, target: &Target, workload: &Workload) -> Result<()> {
        if kind != ResourceKind::Container {
            return Err(Error::UnsupportedKind {
                kind,
                backend: BackendKind::Local,
            });
        }

        let port = workload.port;
        let cmd = Cmd::new(DOCKER)
            .args(["run", "-d", "--name", target.name.as_str()])
            .arg("-p")
            .arg(format!("{port}:{port}"))
            .arg(workload.image.to_string());
        let id = self
            .runner
            .run_capture(&cmd)
            .map_err(|e| Error::command(Step::Create, e))?;
        log::debug!("Container {} started ({id})", target.name);
        Ok(())
    }

    fn build_image(&self, manifest: &Path, context: &Path, image: &ImageRef) -> Result<()> {
        image::build(self.runner.as_ref(), &[], manifest, context, image)
    }

    fn resolve_address(&self, _target: &Target, port: u16) -> Result<String> {
        Ok(format!("localhost:{port}/{ROUTE_PLACEHOLDER}"))
    }

    fn push_image(&self, image: &ImageRef, registry: &str) -> Result<ImageRef> {
        image::push(self.runner.as_ref(), &[], image, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::ResourceName;
    use execkit::{CommandOutput, MockRunner};

    fn backend(mock: &MockRunner) -> LocalBackend {
        LocalBackend::new(Arc::new(mock.clone()))
    }

    fn workload() -> Workload {
        Workload {
            image: ImageRef::latest(&ResourceName::from("my_api")),
            port: 8000,
        }
    }

    #[test]
    fn test_create_command_line() {
        let mock = MockRunner::new();
        backend(&mock)
            .create(ResourceKind::Container, &Target::new("my_api", "ignored"), &workload())
            .unwrap();
        assert_eq!(
            mock.command_lines(),
            vec!["docker run -d --name my-api -p 8000:8000 my-api:latest"]
        );
    }

    #[test]
    fn test_exists_inspects_container_only() {
        let mock = MockRunner::failing();
        assert!(!backend(&mock).exists(ResourceKind::Container, &Target::new("api", "p")));
        assert_eq!(mock.command_lines(), vec!["docker container inspect api"]);
    }

    #[test]
    fn test_pod_kind_is_rejected() {
        let mock = MockRunner::new();
        let err = backend(&mock)
            .create(ResourceKind::Pod, &Target::new("api", "p"), &workload())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind { .. }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_run_conflict_is_create_step() {
        let mock = MockRunner::new();
        mock.on("docker run", CommandOutput::failure(125, "Conflict"));
        let err = backend(&mock)
            .create(ResourceKind::Container, &Target::new("api", "p"), &workload())
            .unwrap_err();
        assert_eq!(err.step(), Some(Step::Create));
    }

    #[test]
    fn test_resolve_address() {
        let mock = MockRunner::new();
        let address = backend(&mock)
            .resolve_address(&Target::new("api", "p"), 8000)
            .unwrap();
        assert_eq!(address, "localhost:8000/<your_route>");
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_push_tags_then_pushes() {
        let mock = MockRunner::new();
        let pushed = backend(&mock)
            .push_image(&ImageRef::new("api", "latest"), "docker.io/acme")
            .unwrap();
        assert_eq!(pushed.to_string(), "docker.io/acme/api:latest");
        assert_eq!(
            mock.command_lines(),
            vec![
                "docker tag api:latest docker.io/acme/api:latest",
                "docker push docker.io/acme/api:latest",
            ]
        );
    }
}
