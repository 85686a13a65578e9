// ABOUTME: Library root for compose-adapter - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod group;
pub mod package;
pub mod registration;
pub mod runtime;
pub mod server;
pub mod types;
