use crate::config::Credentials;
use crate::error::AppError;
use crate::types::UsageSnapshot;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use tracing::{debug, error};

const CURSOR_BASE_URL: &str = "https://www.cursor.com";
const USAGE_PATH: &str = "/api/usage";
const SESSION_COOKIE: &str = "WorkosCursorSessionToken";

/// Source of usage snapshots.
#[async_trait]
pub trait UsageClient: Send + Sync {
    /// Fetches the current billing period's usage for `credentials`.
    ///
    /// # Errors
    /// `FetchFailed` for transport errors and non-2xx responses,
    /// `Unexpected` when the body cannot be decoded.
    async fn fetch_usage(&self, credentials: &Credentials) -> Result<UsageSnapshot, AppError>;
}

pub struct CursorApi {
    client: reqwest::Client,
    base_url: String,
}

impl Default for CursorApi {
    fn default() -> Self {
        Self::new(CURSOR_BASE_URL)
    }
}

impl CursorApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn usage_url(&self) -> String {
        format!("{}{USAGE_PATH}", self.base_url)
    }
}

#[async_trait]
impl UsageClient for CursorApi {
    async fn fetch_usage(&self, credentials: &Credentials) -> Result<UsageSnapshot, AppError> {
        let url = self.usage_url();
        debug!(%url, user = %credentials.user_id, "Fetching Cursor usage");

        let response = self
            .client
            .get(&url)
            .query(&[("user", credentials.user_id.as_str())])
            .header(COOKIE, format!("{SESSION_COOKIE}={}", credentials.token))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch Cursor usage: {e}");
                AppError::FetchFailed {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);
            error!(status = status.as_u16(), "Cursor usage request rejected: {message}");
            return Err(AppError::FetchFailed {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            error!("Failed to read Cursor usage response: {e}");
            AppError::FetchFailed {
                status: Some(status.as_u16()),
                message: e.to_string(),
            }
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Unexpected Cursor usage response: {e}");
            AppError::Unexpected(format!("Unexpected usage response: {e}"))
        })
    }
}
