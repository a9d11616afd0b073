//! Configuration Management
//!
//! Connection settings for the Azure tables. Values come from the config
//! file, then environment variables, then CLI flags (last one wins). The
//! file is read-only to this crate.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_ENVIRONMENT: &str = "AZURE_ENVIRONMENT";
pub const ENV_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";

/// Azure sovereign clouds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudEnvironment {
    #[default]
    Public,
    UsGovernment,
    China,
}

impl CloudEnvironment {
    /// Parse the names used by the Azure SDKs (`AzurePublicCloud`, ...)
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "azurepubliccloud" | "azurecloud" | "public" => Ok(Self::Public),
            "azureusgovernmentcloud" | "azureusgovernment" | "usgovernment" => {
                Ok(Self::UsGovernment)
            }
            "azurechinacloud" | "china" => Ok(Self::China),
            other => Err(Error::config(format!("Unknown Azure environment: {}", other))),
        }
    }

    /// Resource Manager endpoint
    pub fn management_endpoint(self) -> &'static str {
        match self {
            Self::Public => "https://management.azure.com",
            Self::UsGovernment => "https://management.usgovcloudapi.net",
            Self::China => "https://management.chinacloudapi.cn",
        }
    }

    /// Entra ID authority host
    pub fn authority_host(self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Never serialized
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    /// Cloud name, e.g. `AzureUSGovernmentCloud`
    #[serde(default)]
    pub environment: Option<String>,
    /// Overrides the environment's Resource Manager endpoint
    #[serde(default)]
    pub management_endpoint: Option<String>,
    /// Pre-acquired bearer token, only ever taken from the environment
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azure-tables").join("config.json"))
    }

    /// Load configuration from the default location, then apply the environment.
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring config file {:?}: {}", path, e);
                    None
                }
            })
            .unwrap_or_default();

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlay environment variables, using `lookup` to read them.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SUBSCRIPTION_ID) {
            self.subscription_id = Some(v);
        }
        if let Some(v) = get(ENV_TENANT_ID) {
            self.tenant_id = Some(v);
        }
        if let Some(v) = get(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = get(ENV_ENVIRONMENT) {
            self.environment = Some(v);
        }
        if let Some(v) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(v);
        }
    }

    /// Resolved cloud environment
    pub fn cloud(&self) -> Result<CloudEnvironment> {
        self.environment
            .as_deref()
            .map(CloudEnvironment::parse)
            .unwrap_or(Ok(CloudEnvironment::Public))
    }

    /// Resource Manager endpoint (explicit override > cloud default)
    pub fn effective_management_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = self.management_endpoint.as_deref() {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        Ok(self.cloud()?.management_endpoint().to_string())
    }

    /// Subscription the session is scoped to
    pub fn effective_subscription(&self) -> Result<String> {
        self.subscription_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "No subscription configured. Set {} or use --subscription",
                    ENV_SUBSCRIPTION_ID
                ))
            })
    }
}
