//! Azure Authentication
//!
//! Bearer tokens for Resource Manager, from a pre-acquired token, a service
//! principal secret, or the Azure CLI login.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// An access token with its expiry, when known
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// How long the token may still be used, with the refresh buffer applied
    fn usable_for(&self) -> Duration {
        let ttl = match self.expires_on {
            Some(expires_on) => (expires_on - Utc::now()).to_std().unwrap_or(Duration::ZERO),
            None => DEFAULT_TOKEN_TTL,
        };
        ttl.saturating_sub(TOKEN_EXPIRY_BUFFER)
    }
}

/// Source of bearer tokens for a scope
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// A token handed to us from outside (e.g. `AZURE_ACCESS_TOKEN`)
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: None,
        })
    }
}

/// OAuth2 client-credentials flow against Entra ID
pub struct ClientSecretCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

impl ClientSecretCredential {
    pub fn new(
        http: reqwest::Client,
        authority_host: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            http,
            authority_host: authority_host.trim_end_matches('/').to_string(),
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host,
            urlencoding::encode(&self.tenant_id)
        );
        tracing::debug!("Requesting client credentials token from {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::auth(format!(
                "token endpoint returned {} for client {}",
                status, self.client_id
            )));
        }

        let body: TokenResponse = response.json().await?;
        // expires_in is a number on v2 endpoints but a string on some clouds
        let expires_in = body.expires_in.and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        });

        Ok(AccessToken {
            token: body.access_token,
            expires_on: expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }
}

/// Tokens from the logged-in Azure CLI (`az account get-access-token`)
pub struct AzureCliCredential;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Local time, e.g. `2024-01-01 12:00:00.000000`
    #[serde(default)]
    expires_on: Option<String>,
    /// Unix timestamp, only emitted by newer CLI versions
    #[serde(default, rename = "expires_on")]
    expires_on_unix: Option<i64>,
}

/// Parse the expiry fields printed by `az account get-access-token`
fn parse_cli_expiry(unix: Option<i64>, local: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(ts) = unix {
        return DateTime::from_timestamp(ts, 0);
    }
    let naive = NaiveDateTime::parse_from_str(local?, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = scope.trim_end_matches("/.default");
        tracing::debug!("Requesting token from Azure CLI for {}", resource);

        let output = tokio::process::Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                resource,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| Error::auth(format!("failed to run Azure CLI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::auth(format!(
                "Azure CLI could not provide a token. Run 'az login'. ({})",
                stderr.trim()
            )));
        }

        let token: CliToken = serde_json::from_slice(&output.stdout)?;
        Ok(AccessToken {
            expires_on: parse_cli_expiry(token.expires_on_unix, token.expires_on.as_deref()),
            token: token.access_token,
        })
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Credential holder with token caching, cheap to clone
#[derive(Clone)]
pub struct AzureCredentials {
    provider: Arc<dyn TokenCredential>,
    scope: String,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl AzureCredentials {
    /// Wrap a token provider for the given Resource Manager endpoint
    pub fn new(provider: Arc<dyn TokenCredential>, management_endpoint: &str) -> Self {
        Self {
            provider,
            scope: format!("{}/.default", management_endpoint.trim_end_matches('/')),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// A fixed bearer token, mostly useful against test endpoints
    pub fn from_static_token(token: &str, management_endpoint: &str) -> Self {
        Self::new(Arc::new(StaticTokenCredential::new(token)), management_endpoint)
    }

    /// Pick a credential from configuration:
    /// access token > client secret > Azure CLI
    pub fn from_config(config: &Config, http: reqwest::Client) -> Result<Self> {
        let endpoint = config.effective_management_endpoint()?;

        if let Some(token) = config.access_token.as_deref() {
            tracing::info!("Using access token from environment");
            return Ok(Self::from_static_token(token, &endpoint));
        }

        if let (Some(tenant), Some(client), Some(secret)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.client_secret.as_deref(),
        ) {
            tracing::info!("Using client secret credential for client {}", client);
            let credential = ClientSecretCredential::new(
                http,
                config.cloud()?.authority_host(),
                tenant,
                client,
                secret,
            );
            return Ok(Self::new(Arc::new(credential), &endpoint));
        }

        tracing::info!("Using Azure CLI credential");
        Ok(Self::new(Arc::new(AzureCliCredential), &endpoint))
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = self.provider.get_token(&self.scope).await?;
        let usable_for = token.usable_for();

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.token.clone(),
                expires_at: Instant::now() + usable_for,
            });
        }

        tracing::debug!(
            "New token cached, usable for ~{} minutes",
            usable_for.as_secs() / 60
        );

        Ok(token.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCredential {
        calls: AtomicUsize,
        ttl_secs: i64,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(&self, scope: &str) -> Result<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken {
                token: format!("{}#{}", scope, n),
                expires_on: Some(Utc::now() + chrono::Duration::seconds(self.ttl_secs)),
            })
        }
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let provider = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            ttl_secs: 3600,
        });
        let creds = AzureCredentials::new(provider.clone(), "https://management.azure.com/");

        let first = creds.get_token().await.unwrap();
        let second = creds.get_token().await.unwrap();

        assert_eq!(first, "https://management.azure.com/.default#1");
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nearly_expired_token_is_not_reused() {
        // Expires inside the refresh buffer
        let provider = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
            ttl_secs: 30,
        });
        let creds = AzureCredentials::new(provider.clone(), "https://management.azure.com");

        creds.get_token().await.unwrap();
        creds.get_token().await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_static_credential_from_config() {
        let config = Config {
            access_token: Some("abc".to_string()),
            ..Default::default()
        };
        let creds = AzureCredentials::from_config(&config, reqwest::Client::new()).unwrap();
        let token = tokio_test::block_on(creds.get_token()).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_parse_cli_expiry() {
        let unix = parse_cli_expiry(Some(1_700_000_000), Some("ignored"));
        assert_eq!(unix.map(|d| d.timestamp()), Some(1_700_000_000));

        assert!(parse_cli_expiry(None, Some("2024-01-01 12:00:00.000000")).is_some());
        assert!(parse_cli_expiry(None, Some("not a date")).is_none());
        assert!(parse_cli_expiry(None, None).is_none());
    }
}
