//! Common test utilities for supplier-service integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::{Config as CommonConfig, Environment};
use std::sync::{Arc, Once};
use supplier_service::{
    build_router,
    config::{
        DatabaseConfig, JwtConfig, ScrapingApiConfig, ScrapingServiceConfig, SecurityConfig,
        SupplierConfig,
    },
    services::{HttpScreeningClient, InMemoryStore},
    AppState,
};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";
pub const JWT_ISSUER: &str = "supplier-service-test";
pub const JWT_AUDIENCE: &str = "supplier-clients-test";
pub const STRONG_PASSWORD: &str = "Proveedor#2024";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,supplier_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

/// Options for [`spawn_app_with`].
pub struct TestOptions {
    pub scraping_base_url: String,
    pub scraping_username: String,
    pub scraping_password: String,
    pub environment: Environment,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            // Nothing listens here; tests that screen point it at a mock server.
            scraping_base_url: "http://127.0.0.1:9/".to_string(),
            scraping_username: "svc-user".to_string(),
            scraping_password: "svc-pass".to_string(),
            environment: Environment::Prod,
        }
    }
}

pub fn test_config(options: &TestOptions) -> SupplierConfig {
    SupplierConfig {
        common: CommonConfig { port: 8080 },
        environment: options.environment,
        service_name: "supplier-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: Secret::new(String::new()),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: Secret::new(JWT_SECRET.to_string()),
            valid_issuer: JWT_ISSUER.to_string(),
            valid_audience: JWT_AUDIENCE.to_string(),
            token_lifetime_minutes: 30,
        },
        scraping_service: ScrapingServiceConfig {
            base_url: options.scraping_base_url.clone(),
            timeout_seconds: 5,
        },
        scraping_api: ScrapingApiConfig {
            username: options.scraping_username.clone(),
            password: Secret::new(options.scraping_password.clone()),
            tenant_id: "tenant-test".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["https://app.example.com".to_string()],
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(TestOptions::default())
}

/// Router over fresh in-memory stores and a real HTTP screening client.
pub fn spawn_app_with(options: TestOptions) -> TestApp {
    init_tracing();

    let config = test_config(&options);
    let store = InMemoryStore::new();
    let screening = HttpScreeningClient::new(&config.scraping_service)
        .expect("Failed to build screening client");

    let state = AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(screening),
    );

    TestApp {
        router: build_router(state),
        store,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    /// Register a `User` account and return a token for it.
    pub async fn user_token(&self, email: &str) -> String {
        let res = self
            .post(
                "/api/auth/register",
                json!({ "email": email, "password": STRONG_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);
        self.login(email).await
    }

    /// Register an `Admin` account and return a token for it.
    pub async fn admin_token(&self, email: &str) -> String {
        let res = self
            .post(
                "/api/auth/register-admin",
                json!({ "email": email, "password": STRONG_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register-admin failed: {}", res.body);
        self.login(email).await
    }

    pub async fn login(&self, email: &str) -> String {
        let res = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": STRONG_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    /// Create a supplier and return its id.
    pub async fn create_supplier(&self, body: Value) -> String {
        let res = self.post("/api/proveedores", body).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body["id"].as_str().unwrap().to_string()
    }
}

/// A valid supplier payload with the given names and RUC.
pub fn supplier_payload(legal_name: &str, trade_name: &str, ruc: &str) -> Value {
    json!({
        "razonSocial": legal_name,
        "nombreComercial": trade_name,
        "ruc": ruc,
        "telefono": "+51 1 555 0101",
        "correoElectronico": "contacto@proveedor.pe",
        "sitioWeb": "https://proveedor.pe",
        "direccion": "Av. Javier Prado 123, Lima",
        "pais": "Peru",
        "facturacionAnualUsd": 1500000.50
    })
}
