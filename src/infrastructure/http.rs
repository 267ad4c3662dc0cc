use crate::logs::{LogEntry, LogSource};
use crate::types::{MonitorError, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::time::Duration;
use url::Url;

/// Fetches the log window over HTTP GET
pub struct HttpLogSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpLogSource {
    /// `entry_cap` is forwarded as the `limit` query parameter; the server
    /// decides how many entries actually come back. Every request is abandoned
    /// after `request_timeout`.
    pub fn new(base_url: &str, entry_cap: usize, request_timeout: Duration) -> Result<Self> {
        let mut url = Url::parse(base_url)?;
        url.query_pairs_mut()
            .append_pair("limit", &entry_cap.to_string());

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_entries(&self) -> Result<Vec<LogEntry>> {
        let response = self
            .client
            .get(self.url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::HttpStatus {
                status: response.status().as_u16(),
                url: self.url.to_string(),
            });
        }

        let entries = response.json::<Vec<LogEntry>>().await?;
        tracing::debug!("Fetched {} log entries from {}", entries.len(), self.url);
        Ok(entries)
    }
}

impl LogSource for HttpLogSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<LogEntry>>> {
        self.fetch_entries().boxed()
    }
}
