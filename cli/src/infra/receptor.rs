//! Receptor HTTP client: implementation of the `AppRunner` port.
//!
//! Apps are desired LRPs (long-running processes) keyed by app name. The
//! receptor schedules their instances and reports them back as actual LRPs.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{AppRunner, InstanceCount};
use crate::domain::config::receptor_url;
use crate::domain::{AppRoutes, LaunchSpec, LtcConfig, RoutingInfo};

/// Domain every app submitted by ltc is registered under.
pub const LATTICE_DOMAIN: &str = "lattice";

const HEALTHCHECK_URL: &str =
    "http://file_server.service.dc1.consul:8080/v1/static/docker-circus/docker-circus.tgz";
const HEALTHCHECK_PATH: &str = "/tmp/healthcheck";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EnvVar {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct RunAction {
    path: String,
    args: Vec<String>,
    dir: String,
    env: Vec<EnvVar>,
    privileged: bool,
    log_source: String,
}

#[derive(Debug, Serialize)]
struct DownloadAction {
    from: String,
    to: String,
    cache_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Run(RunAction),
    Download(DownloadAction),
}

#[derive(Debug, Serialize)]
struct DesiredLrpCreateRequest {
    process_guid: String,
    domain: String,
    rootfs: String,
    instances: u32,
    memory_mb: u32,
    disk_mb: u32,
    privileged: bool,
    ports: Vec<u16>,
    log_guid: String,
    log_source: String,
    env: Vec<EnvVar>,
    setup: Option<Action>,
    action: Action,
    monitor: Option<Action>,
    routes: RoutingInfo,
}

#[derive(Debug, Serialize)]
struct DesiredLrpUpdateRequest {
    instances: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActualLrpResponse {
    state: String,
    placement_error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReceptorErrorBody {
    name: String,
    message: String,
}

impl DesiredLrpCreateRequest {
    fn from_spec(spec: &LaunchSpec, domain: &str) -> Result<Self> {
        let mut env: Vec<EnvVar> = spec
            .environment
            .iter()
            .map(|(name, value)| EnvVar {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        env.push(EnvVar {
            name: "PORT".to_string(),
            value: spec.primary_port().to_string(),
        });

        let routes = AppRoutes::for_launch(&spec.name, domain, &spec.ports, &spec.route_overrides)
            .routing_info()
            .context("cannot encode routes")?;

        let (setup, monitor) = if spec.monitor {
            let setup = Action::Download(DownloadAction {
                from: HEALTHCHECK_URL.to_string(),
                to: "/tmp".to_string(),
                cache_key: "docker-circus".to_string(),
            });
            let monitor = Action::Run(RunAction {
                path: HEALTHCHECK_PATH.to_string(),
                args: vec![format!("-port={}", spec.ports.monitored)],
                dir: "/".to_string(),
                env: Vec::new(),
                privileged: false,
                log_source: "HEALTH".to_string(),
            });
            (Some(setup), Some(monitor))
        } else {
            (None, None)
        };

        let action = Action::Run(RunAction {
            path: spec.start_command.clone(),
            args: spec.args.clone(),
            dir: spec.working_dir.clone(),
            env: Vec::new(),
            privileged: spec.privileged,
            log_source: "APP".to_string(),
        });

        Ok(Self {
            process_guid: spec.name.clone(),
            domain: LATTICE_DOMAIN.to_string(),
            rootfs: spec.image.rootfs(),
            instances: spec.instances,
            memory_mb: spec.memory_mb,
            disk_mb: spec.disk_mb,
            privileged: spec.privileged,
            ports: spec.ports.exposed.clone(),
            log_guid: spec.name.clone(),
            log_source: "APP".to_string(),
            env,
            setup,
            action,
            monitor,
            routes,
        })
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// HTTP client for the receptor API of one target.
pub struct ReceptorClient {
    http: HttpClient,
    base_url: String,
    domain: String,
    credentials: Option<(String, String)>,
}

impl ReceptorClient {
    /// Build a client for `target`, using the config's credentials if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(target: &str, config: &LtcConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("cannot build HTTP client")?;
        let credentials = config
            .has_credentials()
            .then(|| (config.username.clone(), config.password.clone()));
        Ok(Self {
            http,
            base_url: receptor_url(target),
            domain: target.to_string(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "receptor request");
        let req = self.http.request(method, url);
        match &self.credentials {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.context("receptor unreachable")?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let err: ReceptorErrorBody = serde_json::from_str(&body).unwrap_or_default();
        if err.message.is_empty() {
            anyhow::bail!("receptor returned {status}: {}", body.trim());
        }
        anyhow::bail!("{}: {}", err.name, err.message)
    }
}

impl AppRunner for ReceptorClient {
    async fn start_app(&self, spec: &LaunchSpec) -> Result<()> {
        if self.app_exists(&spec.name).await? {
            anyhow::bail!("{} is already running", spec.name);
        }
        let body = DesiredLrpCreateRequest::from_spec(spec, &self.domain)?;
        self.send(self.request(Method::POST, "/v1/desired_lrps").json(&body))
            .await?;
        Ok(())
    }

    async fn scale_app(&self, name: &str, instances: u32) -> Result<()> {
        let path = format!("/v1/desired_lrps/{name}");
        self.send(
            self.request(Method::PUT, &path)
                .json(&DesiredLrpUpdateRequest { instances }),
        )
        .await?;
        Ok(())
    }

    async fn remove_app(&self, name: &str) -> Result<()> {
        let path = format!("/v1/desired_lrps/{name}");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn running_instances(&self, name: &str) -> Result<InstanceCount> {
        let path = format!("/v1/actual_lrps/{name}");
        let actual: Vec<ActualLrpResponse> = self
            .send(self.request(Method::GET, &path))
            .await?
            .json()
            .await
            .context("cannot decode actual LRPs")?;
        Ok(count_instances(&actual))
    }

    async fn app_exists(&self, name: &str) -> Result<bool> {
        let path = format!("/v1/desired_lrps/{name}");
        let resp = self
            .request(Method::GET, &path)
            .send()
            .await
            .context("receptor unreachable")?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => anyhow::bail!("receptor returned {s} looking up {name}"),
        }
    }
}

fn count_instances(actual: &[ActualLrpResponse]) -> InstanceCount {
    let running = actual.iter().filter(|a| a.state == "RUNNING").count();
    InstanceCount {
        running: u32::try_from(running).unwrap_or(u32::MAX),
        placement_failed: actual.iter().any(|a| !a.placement_error.is_empty()),
    }
}
