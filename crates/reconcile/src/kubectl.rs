//! Thin wrapper around the cluster CLI (`kubectl`).

use crate::error::{Error, Result, Step};
use crate::name::ResourceName;
use crate::types::ResourceKind;
use execkit::{Cmd, CommandRunner};
use std::sync::Arc;

/// Cluster CLI.
pub const KUBECTL: &str = "kubectl";

/// Separator between names in [`Kubectl::list_names`] output.
pub const NAME_DELIMITER: char = ' ';

/// jsonpath template printing the names of all listed items.
const NAMES_TEMPLATE: &str = "jsonpath={.items[*].metadata.name}";

/// Split raw [`Kubectl::list_names`] output into names.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(NAME_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Runs `kubectl` through a [`CommandRunner`].
#[derive(Clone)]
pub struct Kubectl {
    runner: Arc<dyn CommandRunner>,
}

impl Kubectl {
    /// Create a wrapper running `kubectl` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    fn cmd(&self) -> Cmd {
        Cmd::new(KUBECTL)
    }

    /// `kubectl get <kind> <name> -n <namespace>` succeeded
    pub fn get(&self, kind: ResourceKind, name: &ResourceName, namespace: &ResourceName) -> bool {
        self.runner.probe(
            &self
                .cmd()
                .args(["get", kind.as_str(), name.as_str()])
                .args(["--namespace", namespace.as_str()]),
        )
    }

    /// `kubectl delete <kind> <name> -n <namespace>`
    pub fn delete(
        &self,
        kind: ResourceKind,
        name: &ResourceName,
        namespace: &ResourceName,
    ) -> Result<()> {
        let cmd = self
            .cmd()
            .args(["delete", kind.as_str(), name.as_str()])
            .args(["--namespace", namespace.as_str()]);
        self.runner
            .run_checked(&cmd)
            .map_err(|e| Error::command(Step::Delete, e))?;
        Ok(())
    }

    /// Start a single pod running `image` from the local image store.
    pub fn run_pod(
        &self,
        name: &ResourceName,
        namespace: &ResourceName,
        image: &str,
        port: u16,
    ) -> Result<()> {
        let cmd = self
            .cmd()
            .args(["run", name.as_str()])
            .arg(format!("--image={image}"))
            .arg("--image-pull-policy=Never")
            .arg(format!("--port={port}"))
            .args(["--namespace", namespace.as_str()]);
        self.runner
            .run_checked(&cmd)
            .map_err(|e| Error::command(Step::Create, e))?;
        Ok(())
    }

    /// Expose a pod through a NodePort service of the same name.
    pub fn expose_pod(&self, name: &ResourceName, namespace: &ResourceName, port: u16) -> Result<()> {
        let cmd = self
            .cmd()
            .args(["expose", "pod", name.as_str()])
            .arg("--type=NodePort")
            .arg(format!("--port={port}"))
            .args(["--namespace", namespace.as_str()]);
        self.runner
            .run_checked(&cmd)
            .map_err(|e| Error::command(Step::Expose, e))?;
        Ok(())
    }

    /// Create `namespace`; fails if it already exists.
    pub fn create_namespace(&self, namespace: &ResourceName) -> Result<()> {
        let cmd = self.cmd().args(["create", "namespace", namespace.as_str()]);
        self.runner
            .run_checked(&cmd)
            .map_err(|e| Error::command(Step::Namespace, e))?;
        Ok(())
    }

    /// Delete `namespace` and everything in it.
    pub fn delete_namespace(&self, namespace: &ResourceName) -> Result<()> {
        let cmd = self.cmd().args(["delete", "namespace", namespace.as_str()]);
        self.runner
            .run_checked(&cmd)
            .map_err(|e| Error::command(Step::Namespace, e))?;
        Ok(())
    }

    /// Names of all namespaces in the cluster
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        let cmd = self.cmd().args(["get", "namespaces", "-o", NAMES_TEMPLATE]);
        let raw = self
            .runner
            .run_capture(&cmd)
            .map_err(|e| Error::command(Step::Query, e))?;
        Ok(split_names(&raw))
    }

    /// Raw, [`NAME_DELIMITER`]-separated names of all `kind` resources in
    /// `namespace`. Use [`split_names`] to get a list.
    pub fn list_names(&self, kind: ResourceKind, namespace: &ResourceName) -> Result<String> {
        let cmd = self
            .cmd()
            .args(["get", kind.as_str()])
            .args(["--namespace", namespace.as_str()])
            .args(["-o", NAMES_TEMPLATE]);
        self.runner
            .run_capture(&cmd)
            .map_err(|e| Error::command(Step::Query, e))
    }
}
