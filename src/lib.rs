//! prompt2video library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod config;
pub mod fal;
pub mod pipeline;
pub mod server;
