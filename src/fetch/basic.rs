use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Plain `reqwest` client with connect and request timeouts. No retries.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// # Errors
    ///
    /// Returns [`DashboardError::Fetch`](crate::error::DashboardError::Fetch)
    /// if the underlying client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
