//! Docker Registry HTTP API v2 client: implementation of the
//! `ImageMetadataFetcher` port.
//!
//! Reads the image config blob: `manifest -> config digest -> blob`. Manifest
//! lists and OCI indexes are narrowed to the linux/amd64 entry first.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::application::ports::ImageMetadataFetcher;
use crate::domain::{ImageMetadata, ImageReference, PortConfig};

const MANIFEST_ACCEPT: &str = "application/vnd.docker.distribution.manifest.v2+json, \
    application/vnd.docker.distribution.manifest.list.v2+json, \
    application/vnd.oci.image.manifest.v1+json, \
    application/vnd.oci.image.index.v1+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static CHALLENGE_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("valid challenge pattern"));

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Manifest {
    media_type: String,
    config: Option<Descriptor>,
    manifests: Vec<PlatformDescriptor>,
}

#[derive(Debug, Deserialize)]
struct Descriptor {
    digest: String,
}

#[derive(Debug, Deserialize)]
struct PlatformDescriptor {
    digest: String,
    #[serde(default)]
    platform: Platform,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Platform {
    os: String,
    architecture: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageConfigBlob {
    config: ContainerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ContainerConfig {
    entrypoint: Option<Vec<String>>,
    cmd: Option<Vec<String>>,
    working_dir: Option<String>,
    exposed_ports: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenResponse {
    token: String,
    access_token: String,
}

// ── Challenge ─────────────────────────────────────────────────────────────────

/// Bearer challenge from a `WWW-Authenticate` header.
#[derive(Debug, PartialEq, Eq)]
struct BearerChallenge {
    realm: String,
    params: Vec<(String, String)>,
}

impl BearerChallenge {
    fn parse(header: &str) -> Option<Self> {
        let rest = header.trim().strip_prefix("Bearer ")?;
        let mut realm = None;
        let mut params = Vec::new();
        for cap in CHALLENGE_PARAM_RE.captures_iter(rest) {
            let (key, value) = (cap[1].to_string(), cap[2].to_string());
            if key == "realm" {
                realm = Some(value);
            } else {
                params.push((key, value));
            }
        }
        Some(Self {
            realm: realm?,
            params,
        })
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Fetches launch settings from an image's registry.
pub struct RegistryMetadataFetcher {
    http: HttpClient,
}

impl RegistryMetadataFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self { http })
    }

    /// Send `build()` once, and once more with a bearer token if the registry
    /// answers with a challenge. The token is reused for later calls.
    async fn get(
        &self,
        token: &mut Option<String>,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let with_token = |req: RequestBuilder, token: &Option<String>| match token {
            Some(t) => req.header(AUTHORIZATION, format!("Bearer {t}")),
            None => req,
        };

        let resp = with_token(build(), &*token).send().await?;
        let resp = if resp.status() == StatusCode::UNAUTHORIZED && token.is_none() {
            let challenge = resp
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|h| h.to_str().ok())
                .and_then(BearerChallenge::parse)
                .context("registry requires authentication it did not describe")?;
            *token = Some(self.fetch_token(&challenge).await?);
            with_token(build(), &*token).send().await?
        } else {
            resp
        };
        Ok(resp.error_for_status()?)
    }

    async fn fetch_token(&self, challenge: &BearerChallenge) -> Result<String> {
        tracing::debug!(realm = %challenge.realm, "fetching registry token");
        let resp: TokenResponse = self
            .http
            .get(&challenge.realm)
            .query(&challenge.params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("cannot decode registry token")?;
        if !resp.token.is_empty() {
            return Ok(resp.token);
        }
        if !resp.access_token.is_empty() {
            return Ok(resp.access_token);
        }
        anyhow::bail!("registry token response was empty")
    }

    async fn manifest(
        &self,
        base: &str,
        reference: &str,
        token: &mut Option<String>,
    ) -> Result<Manifest> {
        let url = format!("{base}/manifests/{reference}");
        tracing::debug!(%url, "fetching manifest");
        self.get(token, || self.http.get(&url).header(ACCEPT, MANIFEST_ACCEPT))
            .await?
            .json()
            .await
            .with_context(|| format!("cannot decode manifest {reference}"))
    }
}

impl ImageMetadataFetcher for RegistryMetadataFetcher {
    async fn fetch(&self, image: &ImageReference) -> Result<ImageMetadata> {
        let host = image.registry_host();
        let scheme = if host.starts_with("localhost") || host.starts_with("127.") {
            "http"
        } else {
            "https"
        };
        let base = format!("{scheme}://{host}/v2/{}", image.repository);
        let mut token = None;

        let mut manifest = self.manifest(&base, &image.tag, &mut token).await?;
        if !manifest.manifests.is_empty() {
            let digest = select_platform(&manifest.manifests)
                .with_context(|| format!("{image} has no linux/amd64 variant"))?;
            manifest = self.manifest(&base, &digest, &mut token).await?;
        }
        tracing::debug!(media_type = %manifest.media_type, "resolved manifest");

        let config = manifest
            .config
            .with_context(|| format!("manifest for {image} has no config"))?;
        let url = format!("{base}/blobs/{}", config.digest);
        let blob: ImageConfigBlob = self
            .get(&mut token, || self.http.get(&url))
            .await?
            .json()
            .await
            .context("cannot decode image config")?;

        Ok(metadata_from_config(blob.config))
    }
}

fn select_platform(manifests: &[PlatformDescriptor]) -> Option<String> {
    manifests
        .iter()
        .find(|m| m.platform.os == "linux" && m.platform.architecture == "amd64")
        .map(|m| m.digest.clone())
}

fn metadata_from_config(config: ContainerConfig) -> ImageMetadata {
    let mut start_command = config.entrypoint.unwrap_or_default();
    start_command.extend(config.cmd.unwrap_or_default());

    let mut exposed: Vec<u16> = config
        .exposed_ports
        .unwrap_or_default()
        .keys()
        .filter_map(|k| k.split('/').next()?.parse().ok())
        .collect();
    exposed.sort_unstable();
    exposed.dedup();
    let monitored = exposed.first().copied().unwrap_or(0);

    ImageMetadata {
        start_command,
        working_dir: config.working_dir.unwrap_or_default(),
        ports: PortConfig { monitored, exposed },
    }
}
