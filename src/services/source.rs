use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::error::FetchError;

/// Anything that can produce the raw JSON payload for a source URL
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Plain HTTP GET against the configured URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(None, None)
    }

    /// Build a source with an optional per-request timeout and user agent.
    ///
    /// Without a timeout a hung request never completes.
    pub fn with_options(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let res = self.client.get(url).send().await?;
        // The status is not checked; only the body has to parse as JSON
        let status = res.status();
        let body = res.bytes().await?;
        debug!("fetched {} bytes from {} ({})", body.len(), url, status);
        Ok(serde_json::from_slice(&body)?)
    }
}
