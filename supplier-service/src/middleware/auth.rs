use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::models::{AuthContext, Role};
use crate::AppState;

/// Requires a valid bearer token and exposes the caller as [`AuthContext`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let claims = state.jwt.validate_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthContext {
        subject: claims.sub,
        email: claims.email,
        roles: claims.roles,
    });

    Ok(next.run(req).await)
}

/// Layered inside [`auth_middleware`]; refuses callers without `Admin`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let is_admin = req
        .extensions()
        .get::<AuthContext>()
        .map(|ctx| ctx.has_role(Role::Admin))
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !is_admin {
        tracing::warn!("Admin-only route refused for non-admin caller");
        return Err(AppError::Forbidden(
            "Administrator role required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Extractor for the caller resolved by [`auth_middleware`].
pub struct AuthUser(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<AuthContext>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Auth context missing from request extensions"))
        })?;

        Ok(AuthUser(ctx.clone()))
    }
}
