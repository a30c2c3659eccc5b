use secrecy::{ExposeSecret, Secret};

use crate::config::ScrapingApiConfig;

/// Scraping-service account credentials.
#[derive(Debug, Clone)]
pub struct ScrapingCredentials {
    pub username: String,
    pub password: Secret<String>,
    pub tenant_id: String,
}

impl ScrapingCredentials {
    /// Username and password are both present.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.expose_secret().trim().is_empty()
    }
}

/// Hands out the configured scraping credentials. Values are not validated here.
#[derive(Debug, Clone)]
pub struct CredentialProvider {
    config: ScrapingApiConfig,
}

impl CredentialProvider {
    pub fn new(config: ScrapingApiConfig) -> Self {
        Self { config }
    }

    pub fn credentials(&self) -> ScrapingCredentials {
        ScrapingCredentials {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            tenant_id: self.config.tenant_id.clone(),
        }
    }
}
