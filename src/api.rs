//! HTTP client for the pathfinder server

use crate::config::Config;
use crate::error::{PathError, Result};
use crate::model::RouteRequest;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// The three endpoints of the pathfinder server, returning raw bodies
pub trait PathService: Send + Sync {
    /// `GET /buildings`
    fn buildings(&self) -> impl Future<Output = Result<String>> + Send;

    /// `GET /findPath?start=..&end=..`
    fn find_path(&self, request: &RouteRequest) -> impl Future<Output = Result<String>> + Send;

    /// `GET /directions?start=..&end=..`
    fn directions(&self, request: &RouteRequest) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed pathfinder client
#[derive(Debug, Clone)]
pub struct HttpPathService {
    client: Client,
    base_url: String,
}

impl HttpPathService {
    /// Create a new API client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned {}", endpoint, status);
            Err(PathError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl PathService for HttpPathService {
    async fn buildings(&self) -> Result<String> {
        self.get_text("buildings", &[]).await
    }

    async fn find_path(&self, request: &RouteRequest) -> Result<String> {
        self.get_text(
            "findPath",
            &[("start", request.start.as_str()), ("end", request.end.as_str())],
        )
        .await
    }

    async fn directions(&self, request: &RouteRequest) -> Result<String> {
        self.get_text(
            "directions",
            &[("start", request.start.as_str()), ("end", request.end.as_str())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:4567/".to_string();
        let service = HttpPathService::new(&config).unwrap();
        assert_eq!(service.base_url(), "http://localhost:4567");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let mut config = Config::default();
        // Port 9 (discard) is essentially never listening on loopback
        config.api.base_url = "http://127.0.0.1:9".to_string();
        config.api.timeout_secs = 2;
        let service = HttpPathService::new(&config).unwrap();
        assert!(matches!(service.buildings().await, Err(PathError::Transport(_))));
    }
}
