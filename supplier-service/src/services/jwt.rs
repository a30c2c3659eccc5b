use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// HS256 token issuer and validator.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
    issuer: String,
    audience: String,
    token_lifetime_minutes: i64,
}

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Fresh per token
    pub jti: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// A signed token and its expiry (Unix timestamp).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        if secret.is_empty() {
            tracing::warn!("JWT secret is empty; every token will be rejected");
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            has_secret: !secret.is_empty(),
            issuer: config.valid_issuer.clone(),
            audience: config.valid_audience.clone(),
            token_lifetime_minutes: config.token_lifetime_minutes,
        }
    }

    /// Sign an access token for a user with one `roles` entry per role.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
    ) -> Result<IssuedToken, anyhow::Error> {
        self.sign(user_id, email, roles, Utc::now(), Duration::minutes(self.token_lifetime_minutes))
    }

    fn sign(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
        issued_at: chrono::DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<IssuedToken, anyhow::Error> {
        let exp = issued_at + lifetime;

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(IssuedToken {
            token,
            expires_at: exp.timestamp(),
        })
    }

    /// Validate signature, issuer, audience and expiry (no clock skew).
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        if token.is_empty() {
            return Err(anyhow::anyhow!("Token is empty"));
        }
        if !self.has_secret {
            return Err(anyhow::anyhow!("JWT secret is not configured"));
        }

        let header = decode_header(token)
            .map_err(|e| anyhow::anyhow!("Malformed token header: {}", e))?;
        if header.alg != Algorithm::HS256 {
            return Err(anyhow::anyhow!("Unexpected signing algorithm: {:?}", header.alg));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }

    /// Boolean form of [`validate_access_token`](Self::validate_access_token).
    pub fn verify_token(&self, token: &str) -> bool {
        match self.validate_access_token(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Token verification failed");
                false
            }
        }
    }
}
