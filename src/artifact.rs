//! Build manifest generation.
//!
//! A [`ServiceSpec`] (source file, dependency list, port, runtime version)
//! renders into a container build recipe written to `<workdir>/Dockerfile`.
//! The working directory doubles as the build context.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// File name of the build manifest inside the working directory
pub const MANIFEST_FILE: &str = "Dockerfile";

/// Where the service source ends up inside the image
pub const ENTRY_PATH: &str = "/app/main.py";

const REQUIREMENTS_PATH: &str = "/app/requirements.txt";

/// What to package. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    source: PathBuf,
    requirements: PathBuf,
    port: u16,
    runtime: String,
}

impl ServiceSpec {
    pub fn new(
        source: impl Into<PathBuf>,
        requirements: impl Into<PathBuf>,
        port: u16,
        runtime: impl Into<String>,
    ) -> Result<Self> {
        if port == 0 {
            return Err(Error::InvalidPort);
        }
        Ok(Self {
            source: source.into(),
            requirements: requirements.into(),
            port,
            runtime: runtime.into(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn requirements(&self) -> &Path {
        &self.requirements
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// Base image for the runtime version
    pub fn base_image(&self) -> String {
        format!("python:{}-slim", self.runtime())
    }
}

/// A written build manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    pub path: PathBuf,
    pub contents: String,
}

/// Check that the input files exist, can be opened and are not empty.
fn validate_input(path: &Path) -> Result<()> {
    let not_found = || Error::InputNotFound {
        path: path.to_path_buf(),
    };
    let metadata = fs::metadata(path).map_err(|_| not_found())?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Err(not_found());
    }
    File::open(path).map_err(|_| not_found())?;
    Ok(())
}

/// Path of `file` as seen from the build context.
fn context_path(context: &Path, file: &Path) -> String {
    let relative = match file.strip_prefix(context) {
        Ok(rel) => rel,
        Err(_) => {
            log::warn!(
                "{} is outside the build context {}",
                file.display(),
                context.display()
            );
            file
        }
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render the manifest text. Deterministic for a given spec and context.
pub fn render(spec: &ServiceSpec, context: &Path) -> String {
    let source = context_path(context, &crate::paths::absolutize(context, spec.source()));
    let requirements =
        context_path(context, &crate::paths::absolutize(context, spec.requirements()));
    let port = spec.port();

    format!(
        "FROM {base}\n\
         WORKDIR /app\n\
         COPY {source} {ENTRY_PATH}\n\
         COPY {requirements} {REQUIREMENTS_PATH}\n\
         RUN pip install --no-cache-dir -r {REQUIREMENTS_PATH}\n\
         EXPOSE {port}\n\
         CMD [\"python\", \"{ENTRY_PATH}\"]\n",
        base = spec.base_image(),
    )
}

/// Validate the inputs and write the manifest to `<workdir>/Dockerfile`,
/// replacing any previous one.
pub fn build(spec: &ServiceSpec, workdir: &Path) -> Result<BuildManifest> {
    let source = crate::paths::absolutize(workdir, spec.source());
    let requirements = crate::paths::absolutize(workdir, spec.requirements());
    validate_input(&source)?;
    validate_input(&requirements)?;

    let path = workdir.join(MANIFEST_FILE);
    let contents = render(spec, workdir);
    fs::write(&path, &contents).map_err(|source| Error::ArtifactWrite {
        path: path.clone(),
        source,
    })?;

    log::info!("Wrote build manifest {}", path.display());
    Ok(BuildManifest { path, contents })
}
