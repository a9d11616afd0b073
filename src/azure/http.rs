//! HTTP utilities for Azure Resource Manager calls

use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("azure-tables/", env!("CARGO_PKG_VERSION"));

/// Correlation header understood by every ARM endpoint
const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(char::is_control, "")
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Decode the ARM error code and message from a failed response.
/// Falls back to the HTTP reason phrase when the body carries no code.
fn decode_error_body(body: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|detail| !detail.code.is_empty())
}

pub(crate) fn api_error(status: StatusCode, body: &str) -> Error {
    match decode_error_body(body) {
        Some(detail) => Error::Api {
            status: status.as_u16(),
            code: detail.code,
            message: detail.message,
        },
        None => Error::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("HttpError")
                .replace(' ', ""),
            message: body.to_string(),
        },
    }
}

/// HTTP client wrapper for ARM calls
#[derive(Clone)]
pub struct AzureHttpClient {
    client: Client,
}

impl AzureHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Underlying reqwest client, shared with the token credentials
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a JSON document; any non-2xx status is an error
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url, token: &str) -> Result<T> {
        let (status, body) = self.send_get(url, token).await?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET a single resource, treating the `accepted` statuses like success.
    ///
    /// A successful response with an empty body decodes to `T::default()`.
    /// An accepted status decodes to `T::default()` when the body is empty
    /// or unreadable; if it carries an ARM error code the error is returned
    /// as usual.
    pub async fn get_json_accepting<T>(
        &self,
        url: &Url,
        token: &str,
        accepted: &[StatusCode],
    ) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let (status, body) = self.send_get(url, token).await?;

        if status.is_success() {
            if body.trim().is_empty() {
                tracing::debug!("Empty {} body for {}", status, url.path());
                return Ok(T::default());
            }
            return Ok(serde_json::from_str(&body)?);
        }

        if !accepted.contains(&status) || decode_error_body(&body).is_some() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(api_error(status, &body));
        }

        tracing::debug!("Accepted {} with empty result for {}", status, url.path());
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(
                    "Undecodable {} body for {}, using empty result: {}",
                    status,
                    url.path(),
                    e
                );
                Ok(T::default())
            }
        }
    }

    async fn send_get(&self, url: &Url, token: &str) -> Result<(StatusCode, String)> {
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!("GET {} [{}]", url, request_id);

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header(CLIENT_REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        Ok((status, body))
    }
}
