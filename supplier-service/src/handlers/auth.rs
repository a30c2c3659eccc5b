//! `/api/auth` handlers.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

use crate::dtos::{
    AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, VerifyTokenRequest,
    VerifyTokenResponse,
};
use crate::services::ServiceError;
use crate::utils::ValidatedJson;
use crate::AppState;

const REGISTRATION_FAILED: &str = "User creation failed! Please check user details and try again.";

fn registration_outcome(result: Result<(), ServiceError>, success: &str) -> Result<Response, AppError> {
    match result {
        Ok(()) => Ok((StatusCode::CREATED, Json(RegisterResponse::success(success))).into_response()),
        Err(ServiceError::RegistrationFailed(reasons)) => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RegisterResponse::error(REGISTRATION_FAILED, reasons)),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let result = state
        .auth_service
        .register(&payload.email, &payload.password)
        .await;
    registration_outcome(result, "User created successfully!")
}

pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let result = state
        .auth_service
        .register_admin(&payload.email, &payload.password)
        .await;
    registration_outcome(result, "Admin user created successfully!")
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password.".to_string()))
}

pub async fn verify_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyTokenRequest>,
) -> Result<Response, AppError> {
    let token = payload
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Token is required.".to_string()))?;

    if state.auth_service.verify_token(token) {
        return Ok(Json(VerifyTokenResponse {
            is_valid: true,
            message: None,
        })
        .into_response());
    }

    Ok((
        StatusCode::UNAUTHORIZED,
        Json(VerifyTokenResponse {
            is_valid: false,
            message: Some("Invalid or expired token.".to_string()),
        }),
    )
        .into_response())
}
