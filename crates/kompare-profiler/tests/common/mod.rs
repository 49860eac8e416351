//! Shared test utilities for kompare-profiler integration tests.
//!
//! This module provides:
//! - `TestHarness`: an orchestrator wired to in-memory object storage and a
//!   job store of the test's choosing
//! - Test doubles for the report engine, object storage and job store

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
