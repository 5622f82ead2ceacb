//! Container images: building, tagging and pushing with the `docker` CLI.

use crate::error::{Error, Result, Step};
use crate::name::ResourceName;
use execkit::{Cmd, CommandRunner};
use std::fmt;
use std::path::Path;

/// Container runtime CLI.
pub const DOCKER: &str = "docker";

/// Reference to a built image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Repository, optionally prefixed by a registry
    pub repository: String,
    /// Tag, `latest` for everything built here
    pub tag: String,
}

impl ImageRef {
    /// Create a reference from its parts.
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// `<name>:latest`
    pub fn latest(name: &ResourceName) -> Self {
        Self::new(name.as_str(), "latest")
    }

    /// The same image under `registry/` (e.g. `docker.io/acme`).
    pub fn in_registry(&self, registry: &str) -> Self {
        let registry = registry.trim_end_matches('/');
        Self::new(format!("{registry}/{}", self.repository), &self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Build `image` from `manifest` with `context` as build context.
///
/// `env` points the CLI at a specific daemon (empty for the default one).
pub(crate) fn build(
    runner: &dyn CommandRunner,
    env: &[(String, String)],
    manifest: &Path,
    context: &Path,
    image: &ImageRef,
) -> Result<()> {
    let cmd = Cmd::new(DOCKER)
        .args(["build", "-t"])
        .arg(image.to_string())
        .arg("-f")
        .arg(manifest.display().to_string())
        .arg(context.display().to_string())
        .envs(env.iter().cloned());

    runner
        .run_checked(&cmd)
        .map_err(|e| Error::command(Step::Build, e))?;
    log::info!("Built image {image}");
    Ok(())
}

/// Tag `image` for `registry` and push it. Returns the pushed reference.
pub(crate) fn push(
    runner: &dyn CommandRunner,
    env: &[(String, String)],
    image: &ImageRef,
    registry: &str,
) -> Result<ImageRef> {
    let remote = image.in_registry(registry);

    let tag = Cmd::new(DOCKER)
        .arg("tag")
        .arg(image.to_string())
        .arg(remote.to_string())
        .envs(env.iter().cloned());
    runner
        .run_checked(&tag)
        .map_err(|e| Error::command(Step::Tag, e))?;

    let push = Cmd::new(DOCKER)
        .arg("push")
        .arg(remote.to_string())
        .envs(env.iter().cloned());
    runner
        .run_checked(&push)
        .map_err(|e| Error::command(Step::Push, e))?;

    log::info!("Pushed {remote}");
    Ok(remote)
}

/// Parse the shell snippet printed by `minikube docker-env` into variables.
///
/// Accepts `export KEY="value"` and bare `KEY=value` lines; comments and
/// `unset` lines are skipped.
pub fn parse_docker_env(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use execkit::{CommandOutput, MockRunner};

    #[test]
    fn test_image_ref_display_and_registry() {
        let image = ImageRef::latest(&ResourceName::from("my_api"));
        assert_eq!(image.to_string(), "my-api:latest");
        assert_eq!(
            image.in_registry("registry.example.com/team/").to_string(),
            "registry.example.com/team/my-api:latest"
        );
    }

    #[test]
    fn test_parse_docker_env() {
        let text = r#"
export DOCKER_TLS_VERIFY="1"
export DOCKER_HOST="tcp://192.168.99.100:2376"
export DOCKER_CERT_PATH="/home/me/.minikube/certs"
export MINIKUBE_ACTIVE_DOCKERD="minikube"

# To point your shell to minikube's docker-daemon, run:
# eval $(minikube -p minikube docker-env)
"#;
        let env = parse_docker_env(text);
        assert_eq!(env.len(), 4);
        assert_eq!(
            env[1],
            (
                "DOCKER_HOST".to_string(),
                "tcp://192.168.99.100:2376".to_string()
            )
        );
    }

    #[test]
    fn test_parse_docker_env_skips_unset() {
        let env = parse_docker_env("unset DOCKER_TLS_VERIFY\nDOCKER_HOST=tcp://h:1");
        assert_eq!(env, vec![("DOCKER_HOST".to_string(), "tcp://h:1".to_string())]);
    }

    #[test]
    fn test_build_command_line() {
        let mock = MockRunner::new();
        let image = ImageRef::new("api", "latest");
        build(
            &mock,
            &[],
            Path::new("/work/Dockerfile"),
            Path::new("/work"),
            &image,
        )
        .unwrap();
        assert_eq!(
            mock.command_lines(),
            vec!["docker build -t api:latest -f /work/Dockerfile /work"]
        );
    }

    #[test]
    fn test_push_stops_after_failed_tag() {
        let mock = MockRunner::new();
        mock.on("docker tag", CommandOutput::failure(1, "No such image"));

        let err = push(&mock, &[], &ImageRef::new("api", "latest"), "acme").unwrap_err();
        assert_eq!(err.step(), Some(Step::Tag));
        assert!(!mock.was_called("docker push"));
    }
}
