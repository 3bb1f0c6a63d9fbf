//! [`ContactApi`] implementation for the respond.io REST API.
//!
//! The API credential is wrapped in [`secrecy::SecretString`] and is only
//! exposed when building request headers; it never appears in Debug output
//! or logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use courier_core::sync::api::{ContactApi, ListContactsQuery};
use courier_types::config::ApiConfig;
use courier_types::contact::{Contact, ContactIdentifier};
use courier_types::error::ApiError;
use courier_types::message::{ContactMessage, MessageContent, SendReceipt};

use super::types::{ContactListResponse, MessageListResponse, SendMessageRequest};

/// Request timeout for all API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backoff assumed when a 429 carries no usable Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// respond.io API client.
pub struct RespondClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl RespondClient {
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(config.api_key.clone()),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Classify a non-success response into the error taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 429 {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(ApiError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Parse a Retry-After header value (delay-seconds form).
fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

impl ContactApi for RespondClient {
    async fn list_contacts(&self, query: &ListContactsQuery) -> Result<Vec<Contact>, ApiError> {
        let url = self.url("/contact/list");
        debug!(%url, "listing contacts");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let body: ContactListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.items)
    }

    async fn list_messages(
        &self,
        contact: &ContactIdentifier,
        limit: usize,
    ) -> Result<Vec<ContactMessage>, ApiError> {
        let url = self.url(&format!("/contact/{contact}/message"));
        debug!(%url, limit, "listing messages");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let body: MessageListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.items)
    }

    async fn send_message(
        &self,
        contact: &ContactIdentifier,
        content: &MessageContent,
    ) -> Result<SendReceipt, ApiError> {
        let url = self.url(&format!("/contact/{contact}/message"));
        debug!(%url, "sending message");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SendMessageRequest { message: content })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RespondClient {
        RespondClient::new(&ApiConfig {
            api_key: "secret".to_string(),
            base_url: "https://api.respond.io/v2/".to_string(),
        })
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = client();
        assert_eq!(c.url("/contact/list"), "https://api.respond.io/v2/contact/list");
    }

    #[test]
    fn message_paths_use_typed_identifiers() {
        let c = client();
        let id = ContactIdentifier::from_recipient("user@example.com").unwrap();
        assert_eq!(
            c.url(&format!("/contact/{id}/message")),
            "https://api.respond.io/v2/contact/email:user@example.com/message"
        );
    }

    #[test]
    fn retry_after_header_is_parsed_as_seconds() {
        assert_eq!(parse_retry_after(Some("3")), Duration::from_secs(3));
        assert_eq!(parse_retry_after(Some(" 10 ")), Duration::from_secs(10));
    }

    #[test]
    fn missing_or_malformed_retry_after_uses_default() {
        assert_eq!(parse_retry_after(None), DEFAULT_RETRY_AFTER);
        assert_eq!(
            parse_retry_after(Some("Wed, 21 Oct 2026 07:28:00 GMT")),
            DEFAULT_RETRY_AFTER
        );
    }
}
