//! Core types for resource reconciliation

use crate::image::ImageRef;
use crate::name::ResourceName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of runtime resource a backend manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Cluster pod running the service image
    Pod,
    /// Cluster service exposing the pod on a node port
    Service,
    /// Container on the local container runtime
    Container,
}

impl ResourceKind {
    /// Name used on the command line of the backend tools
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Service => "service",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a service gets deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local single-node cluster (pod + service)
    #[default]
    Cluster,
    /// Local container runtime (one container)
    Local,
}

impl BackendKind {
    /// Name accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cluster" | "kubernetes" | "k8s" => Ok(Self::Cluster),
            "local" | "docker" => Ok(Self::Local),
            other => Err(format!("unknown backend '{other}' (expected cluster or local)")),
        }
    }
}

/// A named resource within a namespace
///
/// The local backend has no namespaces and ignores `namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Product name, used for every resource of the target
    pub name: ResourceName,
    /// Project the resources live in
    pub namespace: ResourceName,
}

impl Target {
    /// Create a target, normalizing both names.
    pub fn new(name: impl Into<ResourceName>, namespace: impl Into<ResourceName>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What to run for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    /// Image built from the build manifest
    pub image: ImageRef,
    /// Port the service listens on, published under the same number
    pub port: u16,
}

/// Result of reconciling one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already in the desired state
    NoChange,
    /// Resource did not exist and was created
    Created,
    /// Resource existed, was deleted and created again
    Replaced,
    /// Resource existed and was deleted
    Removed,
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Per-kind results of reconciling one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Results in the order the kinds were reconciled
    pub results: Vec<(ResourceKind, ApplyResult)>,
}

impl ReconcileSummary {
    /// Record the result for `kind`.
    pub fn push(&mut self, kind: ResourceKind, result: ApplyResult) {
        self.results.push((kind, result));
    }

    /// Result recorded for `kind`, if it was reconciled
    pub fn get(&self, kind: ResourceKind) -> Option<ApplyResult> {
        self.results
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| *r)
    }

    /// Kinds that were already absent
    pub fn not_found(&self) -> Vec<ResourceKind> {
        self.results
            .iter()
            .filter(|(_, r)| *r == ApplyResult::NoChange)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Number of resources actually changed
    pub fn total_changes(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_change()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("cluster".parse::<BackendKind>(), Ok(BackendKind::Cluster));
        assert_eq!("Local".parse::<BackendKind>(), Ok(BackendKind::Local));
        assert_eq!("docker".parse::<BackendKind>(), Ok(BackendKind::Local));
        assert!("swarm".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_target_display() {
        let target = Target::new("my_api", "team/a");
        assert_eq!(target.to_string(), "team-a/my-api");
    }

    #[test]
    fn test_summary_not_found() {
        let mut summary = ReconcileSummary::default();
        summary.push(ResourceKind::Pod, ApplyResult::Removed);
        summary.push(ResourceKind::Service, ApplyResult::NoChange);

        assert_eq!(summary.not_found(), vec![ResourceKind::Service]);
        assert_eq!(summary.total_changes(), 1);
        assert_eq!(summary.get(ResourceKind::Pod), Some(ApplyResult::Removed));
        assert_eq!(summary.get(ResourceKind::Container), None);
    }
}
