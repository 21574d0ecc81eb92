//! Route overrides and the `cf-router` routing-metadata codec.
//!
//! Pure functions only: no I/O, no async.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::domain::error::ValidationError;
use crate::domain::port::PortConfig;

/// Routing-metadata key owned by the HTTP router.
pub const APP_ROUTER_KEY: &str = "cf-router";

/// Routing metadata attached to an app at the orchestration service.
///
/// Keys are opaque; only [`APP_ROUTER_KEY`] is interpreted here. Values are
/// kept as raw JSON so foreign entries survive a read-modify-write untouched.
/// A `None` value is a JSON `null`.
pub type RoutingInfo = BTreeMap<String, Option<Box<RawValue>>>;

// ── Route overrides ───────────────────────────────────────────────────────────

/// Caller-chosen hostname prefix for one container port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverride {
    pub hostname_prefix: String,
    pub port: u16,
}

/// Parse `port1:host1,port2:host2,...`.
///
/// Empty segments are skipped. Anything after a second `:` in a segment is
/// ignored.
///
/// # Errors
///
/// Returns `MalformedRoute` if a segment has no `:` or its port prefix is not
/// a valid port number.
pub fn parse_route_overrides(expr: &str) -> Result<Vec<RouteOverride>, ValidationError> {
    expr.split(',')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut parts = segment.split(':');
            let port = parts
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or(ValidationError::MalformedRoute)?;
            let hostname_prefix = parts.next().ok_or(ValidationError::MalformedRoute)?;
            Ok(RouteOverride {
                hostname_prefix: hostname_prefix.to_string(),
                port,
            })
        })
        .collect()
}

// ── App routes ────────────────────────────────────────────────────────────────

/// Hostnames routed to one container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRoute {
    pub hostnames: Vec<String>,
    pub port: u16,
}

/// Ordered list of app routes. Empty means "no application routes".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppRoutes(pub Vec<AppRoute>);

impl AppRoutes {
    /// Routes for a launch: the overrides when any were given, otherwise one
    /// route per exposed port.
    ///
    /// Default routes are `<name>-<port>.<domain>` for every exposed port, with
    /// `<name>.<domain>` prepended on the monitored port. Overrides become
    /// `<prefix>.<domain>`, grouped per port in first-seen order.
    #[must_use]
    pub fn for_launch(
        name: &str,
        domain: &str,
        ports: &PortConfig,
        overrides: &[RouteOverride],
    ) -> Self {
        if overrides.is_empty() {
            let routes = ports
                .exposed
                .iter()
                .map(|&port| {
                    let mut hostnames = Vec::with_capacity(2);
                    if port == ports.monitored {
                        hostnames.push(format!("{name}.{domain}"));
                    }
                    hostnames.push(format!("{name}-{port}.{domain}"));
                    AppRoute { hostnames, port }
                })
                .collect();
            return Self(routes);
        }

        let mut routes: Vec<AppRoute> = Vec::new();
        for o in overrides {
            let hostname = format!("{}.{domain}", o.hostname_prefix);
            match routes.iter_mut().find(|r| r.port == o.port) {
                Some(route) => route.hostnames.push(hostname),
                None => routes.push(AppRoute {
                    hostnames: vec![hostname],
                    port: o.port,
                }),
            }
        }
        Self(routes)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Routing metadata holding only these routes.
    ///
    /// # Errors
    ///
    /// Returns an error if the routes cannot be serialized.
    pub fn routing_info(&self) -> serde_json::Result<RoutingInfo> {
        let mut info = RoutingInfo::new();
        self.store(&mut info)?;
        Ok(info)
    }

    /// Write these routes under [`APP_ROUTER_KEY`], leaving other keys alone.
    ///
    /// An empty list is written as `[]`, never `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the routes cannot be serialized.
    pub fn store(&self, info: &mut RoutingInfo) -> serde_json::Result<()> {
        let raw = serde_json::value::to_raw_value(&self.0)?;
        info.insert(APP_ROUTER_KEY.to_string(), Some(raw));
        Ok(())
    }

    /// Read the routes stored under [`APP_ROUTER_KEY`].
    ///
    /// A missing key, a `null` value, and an unreadable value all yield the
    /// empty list, so callers see one "no routes" state.
    #[must_use]
    pub fn from_routing_info(info: Option<&RoutingInfo>) -> Self {
        let Some(Some(raw)) = info.and_then(|i| i.get(APP_ROUTER_KEY)) else {
            return Self::default();
        };
        match serde_json::from_str::<Option<Vec<AppRoute>>>(raw.get()) {
            Ok(routes) => Self(routes.unwrap_or_default()),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable {APP_ROUTER_KEY} routes");
                Self::default()
            }
        }
    }
}
