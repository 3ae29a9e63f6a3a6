//! # Kumu Admin Library
//!
//! This library exposes the console modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod render;
pub mod token;

// Re-export the workspace crates for convenience
pub use kumu_client;
pub use kumu_core;
