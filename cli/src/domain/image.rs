//! Docker image references and the metadata fetched for them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::UsageError;
use crate::domain::port::PortConfig;

/// Registry API host for images without an explicit registry.
pub const DOCKER_HUB_REGISTRY: &str = "registry-1.docker.io";

const DEFAULT_TAG: &str = "latest";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*",
        r"(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$",
    ))
    .expect("valid repository pattern")
});

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w][\w.-]{0,127}$").expect("valid tag pattern"));

/// A parsed `[registry/]repository[:tag]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry host (and port), `None` for Docker Hub.
    pub registry: Option<String>,
    /// Repository path; official Hub images are expanded to `library/<name>`.
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Parse an image reference as typed on the command line.
    ///
    /// # Errors
    ///
    /// Returns a `UsageError` if the repository or tag is not in Docker's
    /// reference format.
    pub fn parse(image: &str) -> Result<Self, UsageError> {
        let invalid = || UsageError::new(format!("Invalid docker image '{image}'"));

        let (registry, remainder) = match image.split_once('/') {
            Some((host, rest))
                if host.contains('.') || host.contains(':') || host == "localhost" =>
            {
                (Some(host.to_string()), rest)
            }
            _ => (None, image),
        };

        let (path, tag) = match remainder.rsplit_once(':') {
            Some((path, tag)) if !tag.contains('/') => (path, tag),
            _ => (remainder, DEFAULT_TAG),
        };

        if !REPOSITORY_RE.is_match(path) || !TAG_RE.is_match(tag) {
            return Err(invalid());
        }

        let repository = if registry.is_none() && !path.contains('/') {
            format!("library/{path}")
        } else {
            path.to_string()
        };

        Ok(Self {
            registry,
            repository,
            tag: tag.to_string(),
        })
    }

    /// Host serving the registry HTTP API for this image.
    #[must_use]
    pub fn registry_host(&self) -> &str {
        self.registry.as_deref().unwrap_or(DOCKER_HUB_REGISTRY)
    }

    /// Root filesystem URI understood by the orchestration service.
    #[must_use]
    pub fn rootfs(&self) -> String {
        let host = self.registry.as_deref().unwrap_or("");
        format!("docker://{host}/{}#{}", self.repository, self.tag)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Launch-relevant settings baked into an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Entrypoint followed by Cmd.
    pub start_command: Vec<String>,
    pub working_dir: String,
    pub ports: PortConfig,
}
