//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod env;
pub mod error;
pub mod image;
pub mod launch;
pub mod port;
pub mod route;

pub use config::LtcConfig;
pub use error::{ConfigError, LaunchError, UsageError, ValidationError};
pub use image::{ImageMetadata, ImageReference};
pub use launch::LaunchSpec;
pub use port::{PortConfig, PortRequest, PortSource};
pub use route::{AppRoute, AppRoutes, RouteOverride, RoutingInfo};
