//! Homebrew backend using the `brew` CLI.

use crate::backend::PackageManager;
use crate::error::{Error, ErrorCategory, Result};
use crate::types::{Package, PackageKind};
use execkit::{Cmd, CommandRunner};
use std::sync::Arc;

/// Package manager CLI.
pub const BREW: &str = "brew";

/// Backend that executes real `brew` commands.
pub struct BrewBackend {
    runner: Arc<dyn CommandRunner>,
}

impl BrewBackend {
    /// Create a backend running `brew` through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn package_cmd(action: &str, package: &Package) -> Cmd {
        let cmd = Cmd::new(BREW).arg(action);
        match package.kind {
            PackageKind::Formula => cmd.arg(package.name),
            PackageKind::Cask => cmd.args(["--cask", package.name]),
        }
    }

    /// Run a brew command and classify a failure.
    fn run_brew_checked(&self, action: &'static str, package: &Package, cmd: &Cmd) -> Result<()> {
        match self.runner.run_checked(cmd) {
            Ok(_) => Ok(()),
            Err(execkit::Error::Spawn { .. }) => Err(Error::PackageManagerNotFound),
            Err(e) => {
                let stderr = e.stderr();
                let message = if stderr.is_empty() {
                    e.to_string()
                } else {
                    stderr.to_string()
                };
                Err(Error::Package {
                    action,
                    package: package.name.to_string(),
                    category: ErrorCategory::from_output(stderr),
                    message,
                })
            }
        }
    }
}

impl PackageManager for BrewBackend {
    fn is_available(&self) -> bool {
        self.runner.probe(&Cmd::new(BREW).arg("--version"))
    }

    fn install(&self, package: &Package) -> Result<()> {
        log::info!("Installing {package}");
        let cmd = Self::package_cmd("install", package);
        match self.run_brew_checked("install", package, &cmd) {
            Err(e) if e.category().is_ignorable() => {
                log::debug!("{package} already installed");
                Ok(())
            }
            other => other,
        }
    }

    fn uninstall(&self, package: &Package) -> Result<()> {
        log::info!("Uninstalling {package}");
        let cmd = Self::package_cmd("uninstall", package);
        match self.run_brew_checked("uninstall", package, &cmd) {
            Err(e) if e.category() == ErrorCategory::NotFound => {
                log::debug!("{package} already removed");
                Ok(())
            }
            other => other,
        }
    }

    fn relink(&self, package: &Package) -> Result<()> {
        let cmd = Cmd::new(BREW).args(["link", "--overwrite", package.name]);
        self.run_brew_checked("link", package, &cmd)
    }
}
