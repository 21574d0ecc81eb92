//! Unit tests for ltc
//!
//! These tests use stubbed ports and virtual time; they run fast without
//! external I/O.

mod launch_spec;
mod lifecycle;
mod property_tests;
