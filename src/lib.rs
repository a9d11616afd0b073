//! Azure App Service resources as queryable tables.
//!
//! Each table pairs a column schema with a paginated list retriever and a
//! get-by-key retriever over Azure Resource Manager.
//!
//! - [`azure`] - Resource Manager client (auth, session, pagination, models)
//! - [`plugin`] - Table traits, columns and the plugin registry
//! - [`tables`] - Function app and App Service plan tables
//! - [`config`] - Connection configuration

pub mod azure;
pub mod config;
pub mod error;
pub mod plugin;
pub mod tables;

pub use error::{Error, Result};

/// Version injected at compile time via AZURE_TABLES_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZURE_TABLES_VERSION") {
    Some(v) => v,
    None => "dev",
};
