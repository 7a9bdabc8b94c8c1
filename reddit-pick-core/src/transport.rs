use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::FeedSettings;
use crate::contract::{HttpResponse, Transport};
use crate::error::CollaboratorError;

/// [`Transport`] over a shared `reqwest::Client`.
///
/// Every request carries the configured user agent and is bounded by the
/// configured timeout; an expired timeout comes back as an error.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(feed: &FeedSettings) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .user_agent(feed.user_agent.clone())
            .timeout(Duration::from_secs(feed.timeout_secs))
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                e
            })?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, CollaboratorError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        debug!(url, status, bytes = body.len(), "GET completed");
        Ok(HttpResponse { status, body })
    }
}
