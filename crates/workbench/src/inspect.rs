//! Workbench overview: components, cluster and deployed products.

use crate::cluster::ClusterStatus;
use crate::types::ComponentStatus;
use serde::Serialize;

/// Products deployed in one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProducts {
    /// Project (namespace) name
    pub project: String,
    /// Names of the pods deployed in it
    pub products: Vec<String>,
}

/// Everything `inspect` shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Status of every component, in install order
    pub components: Vec<ComponentStatus>,
    /// Cluster state at the time of the report
    pub cluster: ClusterStatus,
    /// Each distinct project, in the order it was first opened
    pub projects: Vec<ProjectProducts>,
}

impl InspectReport {
    /// Number of products across all projects.
    pub fn total_products(&self) -> usize {
        self.projects.iter().map(|p| p.products.len()).sum()
    }

    /// Number of components currently installed.
    pub fn installed_components(&self) -> usize {
        self.components.iter().filter(|c| c.installed).count()
    }
}
