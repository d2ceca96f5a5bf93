//! HTTP retrieval of the raw case feed.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::debug;

use crate::error::{DashboardError, Result};

/// Feed queried when no source is given: every location, all fields, WGS84.
pub const DEFAULT_FEED_URL: &str = "https://services1.arcgis.com/0MSEUqKaxRlEPj5g/arcgis/rest/services/Coronavirus_2019_nCoV_Cases/FeatureServer/1/query?where=1%3D1&outFields=*&outSR=4326&f=json";

/// Issues a single GET against `url` and returns the response body.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidUrl`] if `url` does not parse and
/// [`DashboardError::Fetch`] on transport failure or a non-2xx status.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = reqwest::Url::parse(url).map_err(|e| DashboardError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?.to_vec();
    debug!(bytes = bytes.len(), "Feed body received");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"features":[]}"#))
            .mount(&server)
            .await;

        let client = BasicClient::new().unwrap();
        let bytes = fetch_bytes(&client, &format!("{}/query", server.uri()))
            .await
            .unwrap();

        assert_eq!(bytes, br#"{"features":[]}"#.to_vec());
    }

    #[tokio::test]
    async fn test_fetch_bytes_server_error_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = BasicClient::new().unwrap();
        let result = fetch_bytes(&client, &server.uri()).await;

        assert!(matches!(result, Err(DashboardError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_fetch_bytes_invalid_url() {
        let client = BasicClient::new().unwrap();
        let result = fetch_bytes(&client, "not a url").await;

        assert!(matches!(result, Err(DashboardError::InvalidUrl { .. })));
    }

    #[test]
    fn test_basic_client_builds() {
        assert!(BasicClient::new().is_ok());
    }
}
