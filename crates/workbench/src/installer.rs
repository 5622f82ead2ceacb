//! Per-component install state.
//!
//! A [`ComponentInstaller`] remembers whether its tool was present when the
//! session started. That snapshot is taken exactly once and is the only input
//! to the default uninstall decision: tools the user already had are never
//! removed unless explicitly asked for.

use crate::backend::PackageManager;
use crate::error::{Error, Result};
use crate::types::{Component, ComponentStatus, Package};
use crate::version::SemanticVersion;
use execkit::CommandRunner;
use std::collections::BTreeMap;

/// Formula re-linked after the local cluster tool is installed.
const CLUSTER_CLI_FORMULA: Package = Package::formula("kubernetes-cli");

/// What [`ComponentInstaller::install`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The tool was already usable; only its version was refreshed.
    AlreadyInstalled,
    /// The package manager installed it.
    Installed,
}

/// Install state of one component.
#[derive(Debug, Clone)]
pub struct ComponentInstaller {
    component: Component,
    previously_installed: bool,
    installed: bool,
    version: Option<SemanticVersion>,
}

impl ComponentInstaller {
    /// Probe the component and snapshot whether it was already there.
    pub fn snapshot(component: Component, runner: &dyn CommandRunner) -> Self {
        let mut installer = Self {
            component,
            previously_installed: false,
            installed: false,
            version: None,
        };
        installer.refresh(runner);
        installer.previously_installed = installer.installed;
        log::debug!(
            "{component}: {}",
            if installer.previously_installed {
                "present at session start"
            } else {
                "absent at session start"
            }
        );
        installer
    }

    /// Component this installer manages
    pub fn component(&self) -> Component {
        self.component
    }

    /// Installed when the session started
    pub fn previously_installed(&self) -> bool {
        self.previously_installed
    }

    /// Installed as of the last probe
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Version reported by the last probe
    pub fn version(&self) -> Option<SemanticVersion> {
        self.version
    }

    /// Current status, for display and reports.
    pub fn status(&self) -> ComponentStatus {
        ComponentStatus {
            component: self.component,
            installed: self.installed,
            previously_installed: self.previously_installed,
            version: self.version,
        }
    }

    /// Re-probe the tool. Never fails; any probe failure reads as "not
    /// installed".
    pub fn refresh(&mut self, runner: &dyn CommandRunner) {
        match runner.probe_capture(&self.component.probe()) {
            Some(output) => {
                self.installed = true;
                self.version = SemanticVersion::parse(&output);
                if self.version.is_none() {
                    log::debug!("{}: no version in {output:?}", self.component);
                }
            }
            None => {
                self.installed = false;
                self.version = None;
            }
        }
    }

    /// Install the component unless it is already usable.
    pub fn install(
        &mut self,
        runner: &dyn CommandRunner,
        packages: &dyn PackageManager,
    ) -> Result<InstallOutcome> {
        if self.previously_installed || self.installed {
            self.refresh(runner);
            if self.installed {
                return Ok(InstallOutcome::AlreadyInstalled);
            }
        }

        let package = self.component.package();
        packages
            .install(&package)
            .map_err(|e| e.into_install(self.component))?;

        if self.component == Component::LocalCluster {
            // minikube pulls in its own kubectl; make sure ours wins the link
            if let Err(e) = packages.relink(&CLUSTER_CLI_FORMULA) {
                log::warn!("Could not re-link {CLUSTER_CLI_FORMULA}: {e}");
            }
        }

        self.refresh(runner);
        Ok(InstallOutcome::Installed)
    }

    /// Whether [`ComponentInstaller::uninstall`] should remove this component.
    ///
    /// An explicit override always wins; otherwise only components this
    /// session found missing are removed.
    pub fn should_remove(&self, explicit: Option<bool>) -> bool {
        explicit.unwrap_or(!self.previously_installed)
    }

    /// Remove the component through the package manager.
    pub fn uninstall(
        &mut self,
        runner: &dyn CommandRunner,
        packages: &dyn PackageManager,
    ) -> Result<()> {
        let result = packages
            .uninstall(&self.component.package())
            .map_err(|e| e.into_uninstall(self.component));
        self.refresh(runner);
        result
    }
}

/// Explicit per-component uninstall decisions.
///
/// Components without an entry fall back to the default rule (see
/// [`ComponentInstaller::should_remove`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallSelection {
    overrides: BTreeMap<Component, bool>,
}

impl UninstallSelection {
    /// A selection with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `component` even if it was there before the session.
    pub fn remove(mut self, component: Component) -> Self {
        self.overrides.insert(component, true);
        self
    }

    /// Keep `component` even if this session installed it.
    pub fn keep(mut self, component: Component) -> Self {
        self.overrides.insert(component, false);
        self
    }

    /// Override for `component`, if any.
    pub fn get(&self, component: Component) -> Option<bool> {
        self.overrides.get(&component).copied()
    }
}

/// What happened to one component during uninstall.
#[derive(Debug)]
pub enum UninstallOutcome {
    /// The package manager removed it
    Removed,
    /// Left in place by the selection or the default rule
    Kept,
    /// Removal was attempted and failed
    Failed(Error),
}

/// Per-component uninstall results, in install order.
#[derive(Debug, Default)]
pub struct UninstallReport {
    /// One entry per component
    pub outcomes: Vec<(Component, UninstallOutcome)>,
}

impl UninstallReport {
    /// Components that were removed.
    pub fn removed(&self) -> Vec<Component> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, UninstallOutcome::Removed))
            .map(|(c, _)| *c)
            .collect()
    }

    /// Errors of the components that failed.
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            UninstallOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Whether no component failed.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
