//! Registration, login and token verification.

use std::sync::Arc;
use tracing::instrument;

use crate::dtos::AuthResponse;
use crate::models::{Role, User};
use crate::services::policy::PasswordPolicy;
use crate::services::store::UserStore;
use crate::services::{JwtService, ServiceError};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

const DUPLICATE_EMAIL_REASON: &str = "A user with this email already exists.";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
    policy: PasswordPolicy,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self {
            users,
            jwt,
            policy: PasswordPolicy::default(),
        }
    }

    /// New account holding `User`.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        self.create_account(email, password, &[Role::User]).await
    }

    /// New account holding `Admin` and `User`.
    pub async fn register_admin(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        self.create_account(email, password, &[Role::Admin, Role::User]).await
    }

    #[instrument(skip(self, email, password))]
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        roles: &[Role],
    ) -> Result<(), ServiceError> {
        let email = email.trim();

        if self.users.find_by_email(email).await?.is_some() {
            return Err(ServiceError::RegistrationFailed(vec![
                DUPLICATE_EMAIL_REASON.to_string()
            ]));
        }

        let violations = self.policy.violations(password);
        if !violations.is_empty() {
            return Err(ServiceError::RegistrationFailed(
                violations.iter().map(|v| v.to_string()).collect(),
            ));
        }

        let hash = hash_password(&Password::new(password.to_string()))?;
        let user = User::new(email.to_string(), hash.into_string());

        match self.users.create_with_roles(&user, roles).await {
            Ok(()) => {}
            Err(ServiceError::UserAlreadyExists) => {
                return Err(ServiceError::RegistrationFailed(vec![
                    DUPLICATE_EMAIL_REASON.to_string()
                ]));
            }
            Err(e) => return Err(e),
        }

        tracing::info!(user_id = %user.user_id, roles = ?roles, "User registered");
        Ok(())
    }

    /// `None` for an unknown email or a wrong password.
    #[instrument(skip(self, email, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthResponse>, ServiceError> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            tracing::info!("Login rejected: unknown email");
            return Ok(None);
        };

        let stored = PasswordHashString::new(user.password_hash.clone());
        if verify_password(&Password::new(password.to_string()), &stored).is_err() {
            tracing::info!(user_id = %user.user_id, "Login rejected: wrong password");
            return Ok(None);
        }

        let roles = self.users.roles_for(user.user_id).await?;
        let issued = self
            .jwt
            .generate_access_token(&user.user_id.to_string(), &user.email, &roles)?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(Some(AuthResponse {
            user_id: user.user_id.to_string(),
            email: user.email,
            token: issued.token,
            roles,
        }))
    }

    pub fn verify_token(&self, token: &str) -> bool {
        self.jwt.verify_token(token)
    }
}
