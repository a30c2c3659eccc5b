use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub use service_core::config::Environment;

/// Minimum HMAC key length accepted outside of `dev`.
const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct SupplierConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub scraping_service: ScrapingServiceConfig,
    pub scraping_api: ScrapingApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub valid_issuer: String,
    pub valid_audience: String,
    pub token_lifetime_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct ScrapingServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Service-account credentials for the scraping API.
#[derive(Debug, Clone)]
pub struct ScrapingApiConfig {
    pub username: String,
    pub password: Secret<String>,
    pub tenant_id: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl SupplierConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = SupplierConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("supplier-service"), false)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), false)?,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                // Blank outside prod selects the in-memory store.
                url: Secret::new(get_env("DATABASE_URL", Some(""), is_prod)?),
                max_connections: parse_number(
                    "DATABASE_MAX_CONNECTIONS",
                    &get_env("DATABASE_MAX_CONNECTIONS", Some("10"), false)?,
                )?,
                min_connections: parse_number(
                    "DATABASE_MIN_CONNECTIONS",
                    &get_env("DATABASE_MIN_CONNECTIONS", Some("1"), false)?,
                )?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env(
                    "JWT_SECRET",
                    Some("dev-only-signing-key-change-me-0123456789"),
                    is_prod,
                )?),
                valid_issuer: get_env("JWT_VALID_ISSUER", Some("supplier-service"), is_prod)?,
                valid_audience: get_env("JWT_VALID_AUDIENCE", Some("supplier-clients"), is_prod)?,
                token_lifetime_minutes: parse_number(
                    "JWT_TOKEN_LIFETIME_MINUTES",
                    &get_env("JWT_TOKEN_LIFETIME_MINUTES", Some("30"), false)?,
                )?,
            },
            scraping_service: ScrapingServiceConfig {
                base_url: get_env("SCRAPING_SERVICE_BASE_URL", None, is_prod)?,
                timeout_seconds: parse_number(
                    "SCRAPING_SERVICE_TIMEOUT_SECONDS",
                    &get_env("SCRAPING_SERVICE_TIMEOUT_SECONDS", Some("100"), false)?,
                )?,
            },
            // Missing credentials are tolerated at startup; screening reports them.
            scraping_api: ScrapingApiConfig {
                username: env::var("SCRAPING_API_USERNAME").unwrap_or_default(),
                password: Secret::new(env::var("SCRAPING_API_PASSWORD").unwrap_or_default()),
                tenant_id: env::var("SCRAPING_API_TENANT_ID").unwrap_or_default(),
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.token_lifetime_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_TOKEN_LIFETIME_MINUTES must be positive"
            )));
        }

        let base_url = self.scraping_service.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SCRAPING_SERVICE_BASE_URL must not be blank"
            )));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SCRAPING_SERVICE_BASE_URL must be an http(s) URL"
            )));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS"
            )));
        }

        if self.environment == Environment::Prod {
            if self.jwt.secret.expose_secret().len() < MIN_JWT_SECRET_BYTES {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} bytes in production",
                    MIN_JWT_SECRET_BYTES
                )));
            }

            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_uses_default_outside_prod() {
        let value = get_env("SUPPLIER_TEST_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_get_env_requires_value_in_prod() {
        assert!(get_env("SUPPLIER_TEST_UNSET_KEY", Some("fallback"), true).is_err());
    }

    #[test]
    fn test_parse_number_reports_key() {
        let err = parse_number::<u32>("DATABASE_MAX_CONNECTIONS", "ten").unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
        assert_eq!(parse_number::<u32>("X", " 12 ").unwrap(), 12);
    }

    fn sample(environment: Environment) -> SupplierConfig {
        SupplierConfig {
            common: core_config::Config { port: 8080 },
            environment,
            service_name: "supplier-service".to_string(),
            service_version: "test".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: Secret::new("postgres://localhost/suppliers".to_string()),
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: Secret::new("x".repeat(MIN_JWT_SECRET_BYTES)),
                valid_issuer: "issuer".to_string(),
                valid_audience: "audience".to_string(),
                token_lifetime_minutes: 30,
            },
            scraping_service: ScrapingServiceConfig {
                base_url: "http://scraper.local/".to_string(),
                timeout_seconds: 30,
            },
            scraping_api: ScrapingApiConfig {
                username: String::new(),
                password: Secret::new(String::new()),
                tenant_id: String::new(),
            },
            security: SecurityConfig {
                allowed_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample(Environment::Prod).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = sample(Environment::Dev);
        config.scraping_service.base_url = "ftp://scraper.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_weak_secret_and_wildcard_in_prod() {
        let mut config = sample(Environment::Prod);
        config.jwt.secret = Secret::new("short".to_string());
        assert!(config.validate().is_err());

        let mut config = sample(Environment::Prod);
        config.security.allowed_origins = vec!["*".to_string()];
        assert!(config.validate().is_err());

        let mut config = sample(Environment::Dev);
        config.security.allowed_origins = vec!["*".to_string()];
        assert!(config.validate().is_ok());
    }
}
