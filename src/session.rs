//! Per-invocation context handed to the lifecycle and the workbench.

use anyhow::{Context, Result};
use execkit::{CommandRunner, SystemRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;

/// Working directory, command runner and settings of one run.
#[derive(Clone)]
pub struct Session {
    workdir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    settings: Settings,
}

impl Session {
    /// Session running real commands, honouring the configured timeout.
    pub fn new(workdir: Option<PathBuf>, settings: Settings) -> Result<Self> {
        let workdir = match workdir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Could not determine working directory")?,
        };
        let workdir = workdir
            .canonicalize()
            .with_context(|| format!("Working directory {} not found", workdir.display()))?;

        let runner = match settings.commands.timeout() {
            Some(limit) => SystemRunner::with_timeout(limit),
            None => SystemRunner::new(),
        };
        log::debug!("Session in {}", workdir.display());
        Ok(Self::with_runner(workdir, Arc::new(runner), settings))
    }

    pub fn with_runner(
        workdir: PathBuf,
        runner: Arc<dyn CommandRunner>,
        settings: Settings,
    ) -> Self {
        Self {
            workdir,
            runner,
            settings,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        self.runner.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
