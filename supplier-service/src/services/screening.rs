//! Client for the external scraping (watchlist screening) service.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use crate::config::ScrapingServiceConfig;
use crate::models::{ScrapingLoginRequest, ScrapingLoginResponse, ScreeningResponse};
use crate::services::ServiceError;

/// Login plus company lookup against the scraping service.
#[async_trait]
pub trait ScreeningClient: Send + Sync {
    /// `None` on any transport or non-2xx failure; the cause is logged.
    async fn login(
        &self,
        username: &str,
        password: &str,
        tenant_id: &str,
    ) -> Option<ScrapingLoginResponse>;

    async fn scrape_company(
        &self,
        company_name: &str,
        bearer_token: &str,
    ) -> Result<ScreeningResponse, ServiceError>;
}

/// reqwest-backed [`ScreeningClient`].
#[derive(Clone)]
pub struct HttpScreeningClient {
    client: Client,
    base_url: String,
}

impl HttpScreeningClient {
    pub fn new(config: &ScrapingServiceConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build scraping HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ScreeningClient for HttpScreeningClient {
    #[instrument(skip(self, password), fields(tenant_id = %tenant_id))]
    async fn login(
        &self,
        username: &str,
        password: &str,
        tenant_id: &str,
    ) -> Option<ScrapingLoginResponse> {
        let body = ScrapingLoginRequest {
            username,
            password,
            tenant_id,
        };

        let response = match self.client.post(self.url("login")).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Scraping service login request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %text, "Scraping service rejected login");
            return None;
        }

        match response.json::<ScrapingLoginResponse>().await {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::error!(error = %e, "Scraping service login response was not valid JSON");
                None
            }
        }
    }

    #[instrument(skip(self, bearer_token))]
    async fn scrape_company(
        &self,
        company_name: &str,
        bearer_token: &str,
    ) -> Result<ScreeningResponse, ServiceError> {
        let response = self
            .client
            .get(self.url("scrape"))
            .query(&[("nombre", company_name)])
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Scraping service request failed");
                ServiceError::External(format!("Scraping service request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %text, "Scraping service returned an error");
            return Err(ServiceError::External(format!(
                "Scraping service returned {}",
                status
            )));
        }

        response.json::<ScreeningResponse>().await.map_err(|e| {
            tracing::error!(error = %e, "Scraping service response could not be decoded");
            ServiceError::External(format!("Invalid scraping service response: {}", e))
        })
    }
}
