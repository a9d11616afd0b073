//! Azure Session
//!
//! An authenticated handle scoped to one subscription, combining credentials,
//! the HTTP client and the Resource Manager endpoint.

use super::auth::AzureCredentials;
use super::http::AzureHttpClient;
use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

/// Subscription-scoped session
#[derive(Clone)]
pub struct Session {
    pub subscription_id: String,
    pub authorizer: AzureCredentials,
    pub http: AzureHttpClient,
    endpoint: Url,
}

impl Session {
    /// Create a session against an explicit endpoint
    pub fn new(
        subscription_id: &str,
        authorizer: AzureCredentials,
        http: AzureHttpClient,
        management_endpoint: &str,
    ) -> Result<Self> {
        if subscription_id.trim().is_empty() {
            return Err(Error::config("subscription id must not be empty"));
        }

        Ok(Self {
            subscription_id: subscription_id.to_string(),
            authorizer,
            http,
            endpoint: Url::parse(management_endpoint)?,
        })
    }

    /// Build a session from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let subscription_id = config.effective_subscription()?;
        let endpoint = config.effective_management_endpoint()?;
        let http = AzureHttpClient::new()?;
        let authorizer = AzureCredentials::from_config(config, http.inner().clone())?;

        tracing::info!(
            "New session for subscription {} at {}",
            subscription_id,
            endpoint
        );

        Self::new(&subscription_id, authorizer, http, &endpoint)
    }

    /// Make an authenticated GET request
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let token = self.authorizer.get_token().await?;
        self.http.get_json(url, &token).await
    }

    /// Make an authenticated GET request that tolerates the given statuses
    pub async fn get_json_accepting<T>(&self, url: &Url, accepted: &[StatusCode]) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let token = self.authorizer.get_token().await?;
        self.http.get_json_accepting(url, &token, accepted).await
    }

    // =========================================================================
    // Resource Manager URL helpers
    // =========================================================================

    /// `{endpoint}/subscriptions/{sub}/providers/{provider}/{resource_type}`
    pub fn provider_url(
        &self,
        provider: &str,
        resource_type: &str,
        api_version: &str,
    ) -> Result<Url> {
        let path = format!(
            "subscriptions/{}/providers/{}/{}",
            urlencoding::encode(&self.subscription_id),
            provider,
            resource_type
        );
        self.arm_url(&path, api_version)
    }

    /// `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{resource_type}/{name}`
    pub fn resource_url(
        &self,
        resource_group: &str,
        provider: &str,
        resource_type: &str,
        name: &str,
        api_version: &str,
    ) -> Result<Url> {
        let path = format!(
            "subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            provider,
            resource_type,
            urlencoding::encode(name)
        );
        self.arm_url(&path, api_version)
    }

    fn arm_url(&self, path: &str, api_version: &str) -> Result<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(endpoint: &str) -> Session {
        Session::new(
            "sub-1",
            AzureCredentials::from_static_token("t", endpoint),
            AzureHttpClient::new().unwrap(),
            endpoint,
        )
        .unwrap()
    }

    #[test]
    fn test_provider_url() {
        let s = session("https://management.azure.com");
        let url = s
            .provider_url("Microsoft.Web", "sites", "2020-06-01")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub-1/providers/Microsoft.Web/sites?api-version=2020-06-01"
        );
    }

    #[test]
    fn test_resource_url_encodes_segments() {
        let s = session("https://management.azure.com/");
        let url = s
            .resource_url("my rg", "Microsoft.Web", "serverfarms", "plan/1", "2020-06-01")
            .unwrap();
        assert_eq!(
            url.path(),
            "/subscriptions/sub-1/resourceGroups/my%20rg/providers/Microsoft.Web/serverfarms/plan%2F1"
        );
    }

    #[test]
    fn test_empty_subscription_rejected() {
        let result = Session::new(
            " ",
            AzureCredentials::from_static_token("t", "https://management.azure.com"),
            AzureHttpClient::new().unwrap(),
            "https://management.azure.com",
        );
        assert!(result.is_err());
    }
}
