//! Unified interface for the hosting service (forge) deploynotes reads pull
//! requests from and publishes changelogs to.
//!
//! Provides token-based authentication, commit comparison, closed pull
//! request listing, repository content and release operations through a
//! common trait.

/// Configuration and authentication for forge platforms.
pub mod config;

/// Factory for creating forge implementations from a [`config::Remote`].
pub mod factory;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Logging and dry-run wrapper around a [`traits::Forge`].
pub mod manager;

/// Request and response types shared by all forge implementations.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
