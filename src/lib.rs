//! Casmclips - turn long videos into ranked short clips
//!
//! This library crate exposes the orchestrator and config loading for the
//! binary and for integration testing.

pub mod config;
pub mod pipeline;
