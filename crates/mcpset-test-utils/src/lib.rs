//! Shared test utilities for the mcpset workspace.
//!
//! This crate provides a [`Sandbox`]: an ephemeral home directory with a
//! `.mcp` config directory, so tests never touch the real user's files.
//! It is a dev-dependency only, never published.

pub mod sandbox;

pub use sandbox::{Sandbox, TargetDecl};
