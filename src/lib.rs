//! Routegen - nginx configuration from per-service deploy descriptors
//!
//! This library turns a directory of service descriptors into a single
//! reverse-proxy configuration:
//! - Scans one subdirectory per service for a `deploy.yml`
//! - Includes services that set `proxy.enabled: true`
//! - Resolves each service (or each of its explicit backends) into routes
//! - Groups routes by domain, one nginx `server` block per domain
//! - Resolves upstream hostnames per request so containers can come and go

pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod nginx;
pub mod registry;
pub mod routes;

pub use config::GeneratorConfig;
pub use error::GenerateError;
pub use generator::{generate, Generation};
