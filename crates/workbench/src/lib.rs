//! # workbench
//!
//! Provisioning of the local workbench: container runtime, hypervisor,
//! cluster CLI and local cluster.
//!
//! The [`Workbench`] snapshots which tools are present when it is created.
//! `setup` installs only what is missing; `uninstall` by default removes only
//! what was missing at that snapshot, so tools the user already had survive a
//! setup/uninstall cycle.
//!
//! It also wraps the local cluster (start, stop, status) and projects, which
//! are cluster namespaces.
//!
//! ## Example
//!
//! ```no_run
//! use execkit::SystemRunner;
//! use std::sync::Arc;
//! use workbench::{UninstallSelection, Workbench};
//!
//! let mut workbench = Workbench::new(Arc::new(SystemRunner::new()));
//!
//! for status in workbench.setup().unwrap() {
//!     println!("{}: {:?}", status.component, status.version);
//! }
//!
//! let report = workbench.uninstall(&UninstallSelection::new());
//! println!("removed {:?}", report.removed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cluster;
pub mod error;
pub mod inspect;
pub mod installer;
pub mod project;
pub mod types;
pub mod version;

pub use cluster::{ClusterConfig, ClusterStatus};
pub use error::{Error, ErrorCategory, Result};
pub use inspect::{InspectReport, ProjectProducts};
pub use installer::{
    ComponentInstaller, InstallOutcome, UninstallOutcome, UninstallReport, UninstallSelection,
};
pub use project::ProjectRegistry;
pub use types::{Component, ComponentStatus, Package, PackageKind};
pub use version::SemanticVersion;

use backend::{PackageManager, brew::BrewBackend};
use execkit::CommandRunner;
use reconcile::{Kubectl, ResourceKind, ResourceName};
use std::collections::HashSet;
use std::sync::Arc;

/// The local workbench for one session.
pub struct Workbench {
    runner: Arc<dyn CommandRunner>,
    packages: Box<dyn PackageManager>,
    installers: Vec<ComponentInstaller>,
    kubectl: Kubectl,
    current_status: Option<ClusterStatus>,
    projects: ProjectRegistry,
}

impl Workbench {
    /// Create a workbench managed through Homebrew.
    ///
    /// Probes all four components; what is found now counts as
    /// "previously installed" for the rest of the session.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        let packages = Box::new(BrewBackend::new(runner.clone()));
        Self::with_package_manager(runner, packages)
    }

    /// Create a workbench with a custom package manager.
    pub fn with_package_manager(
        runner: Arc<dyn CommandRunner>,
        packages: Box<dyn PackageManager>,
    ) -> Self {
        let installers = Component::ALL
            .iter()
            .map(|&c| ComponentInstaller::snapshot(c, runner.as_ref()))
            .collect();
        Self {
            kubectl: Kubectl::new(runner.clone()),
            runner,
            packages,
            installers,
            current_status: None,
            projects: ProjectRegistry::new(),
        }
    }

    /// Status of every component, as last probed.
    pub fn status(&self) -> Vec<ComponentStatus> {
        self.installers.iter().map(ComponentInstaller::status).collect()
    }

    /// Probe every component again. Never fails.
    pub fn check_installed(&mut self) -> Vec<ComponentStatus> {
        for installer in &mut self.installers {
            installer.refresh(self.runner.as_ref());
        }
        self.status()
    }

    /// Install every missing component, in [`Component::ALL`] order.
    ///
    /// Stops at the first failure. Components installed before it stay
    /// installed; running `setup` again picks up where it stopped.
    pub fn setup(&mut self) -> Result<Vec<ComponentStatus>> {
        let mut checked_package_manager = false;

        for installer in &mut self.installers {
            let missing = !installer.previously_installed() && !installer.is_installed();
            if missing && !checked_package_manager {
                if !self.packages.is_available() {
                    return Err(Error::PackageManagerNotFound);
                }
                checked_package_manager = true;
            }

            match installer.install(self.runner.as_ref(), self.packages.as_ref())? {
                InstallOutcome::Installed => {
                    log::info!("Installed {}", installer.component());
                }
                InstallOutcome::AlreadyInstalled => {
                    log::debug!("{} already installed", installer.component());
                }
            }
        }
        Ok(self.status())
    }

    /// Components `uninstall` would remove for `selection`.
    pub fn removal_plan(&self, selection: &UninstallSelection) -> Vec<Component> {
        self.installers
            .iter()
            .filter(|i| i.should_remove(selection.get(i.component())))
            .map(ComponentInstaller::component)
            .collect()
    }

    /// Remove components, attempting every one regardless of earlier
    /// failures.
    pub fn uninstall(&mut self, selection: &UninstallSelection) -> UninstallReport {
        let mut report = UninstallReport::default();

        for installer in &mut self.installers {
            let component = installer.component();
            if !installer.should_remove(selection.get(component)) {
                log::info!("Keeping {component}");
                report.outcomes.push((component, UninstallOutcome::Kept));
                continue;
            }

            let outcome = match installer.uninstall(self.runner.as_ref(), self.packages.as_ref()) {
                Ok(()) => UninstallOutcome::Removed,
                Err(e) => {
                    log::warn!("{e}");
                    UninstallOutcome::Failed(e)
                }
            };
            report.outcomes.push((component, outcome));
        }
        report
    }

    /// Start the local cluster.
    pub fn start_cluster(&mut self, config: &ClusterConfig) -> Result<()> {
        log::info!(
            "Starting local cluster ({} CPUs, {} MB)",
            config.cpus,
            config.memory_mb
        );
        cluster::start(self.runner.as_ref(), config)?;
        self.current_status = Some(ClusterStatus::Running);
        Ok(())
    }

    /// Stop the local cluster.
    pub fn stop_cluster(&mut self) -> Result<()> {
        cluster::stop(self.runner.as_ref())?;
        self.current_status = Some(ClusterStatus::Stopped);
        Ok(())
    }

    /// Ask the local cluster for its state and remember it.
    pub fn cluster_status(&mut self) -> ClusterStatus {
        let status = cluster::status(self.runner.as_ref());
        self.current_status = Some(status);
        status
    }

    /// Last known cluster state, without querying.
    pub fn current_status(&self) -> Option<ClusterStatus> {
        self.current_status
    }

    /// Create the namespace for a project and record it.
    pub fn open_project(&mut self, name: &str) -> Result<ResourceName> {
        let project = ResourceName::new(name);
        self.kubectl
            .create_namespace(&project)
            .map_err(|source| Error::Project {
                name: project.to_string(),
                source,
            })?;
        log::info!("Opened project {project}");
        self.projects.push(project.clone());
        Ok(project)
    }

    /// Record a project whose namespace already exists, e.g. one opened by
    /// an earlier session. Does not touch the cluster.
    pub fn track_project(&mut self, name: &str) -> ResourceName {
        let project = ResourceName::new(name);
        if !self.projects.contains(&project) {
            self.projects.push(project.clone());
        }
        project
    }

    /// Delete a project's namespace and drop it from the registry.
    pub fn delete_project(&mut self, name: &str) -> Result<()> {
        let project = ResourceName::new(name);
        self.kubectl
            .delete_namespace(&project)
            .map_err(|source| Error::Project {
                name: project.to_string(),
                source,
            })?;
        if !self.projects.remove_first(&project) {
            log::warn!("Project {project} was not opened in this session");
        }
        Ok(())
    }

    /// Projects opened in this session.
    pub fn list_projects(&self) -> &[ResourceName] {
        self.projects.as_slice()
    }

    /// All namespaces in the cluster, including ones from earlier sessions.
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        self.kubectl.list_namespaces().map_err(|source| Error::Project {
            name: "*".to_string(),
            source,
        })
    }

    /// Raw names of the products deployed in `project`, separated by
    /// [`reconcile::kubectl::NAME_DELIMITER`].
    pub fn list_products(&self, project: &str) -> Result<String> {
        let project = ResourceName::new(project);
        self.kubectl
            .list_names(ResourceKind::Pod, &project)
            .map_err(|source| Error::Project {
                name: project.to_string(),
                source,
            })
    }

    /// Components, cluster state and products of every project.
    ///
    /// A project opened more than once is reported once.
    pub fn inspect(&mut self) -> InspectReport {
        let cluster = self.cluster_status();
        let mut seen = HashSet::new();
        let projects = self
            .projects
            .iter()
            .filter(|&project| seen.insert(project))
            .map(|project| {
                let products = match self.list_products(project.as_str()) {
                    Ok(raw) => reconcile::kubectl::split_names(&raw),
                    Err(e) => {
                        log::warn!("{e}");
                        Vec::new()
                    }
                };
                ProjectProducts {
                    project: project.to_string(),
                    products,
                }
            })
            .collect();

        InspectReport {
            components: self.status(),
            cluster,
            projects,
        }
    }
}
