//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: receptor and registry HTTP
//! calls, the doppler log stream, the config file, and logging setup.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod logging;
pub mod logs;
pub mod receptor;
pub mod registry;
