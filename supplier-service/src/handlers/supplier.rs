//! `/api/proveedores` handlers.

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::dtos::{LegalNameQuery, SupplierRequest, SupplierResponse};
use crate::middleware::AuthUser;
use crate::models::{ListQuery, PagedResult, PaginationParams, ScreeningResponse};
use crate::utils::{ApiPath, ApiQuery, ValidatedJson};
use crate::AppState;

pub async fn list_suppliers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<PagedResult<SupplierResponse>>, AppError> {
    let page = state
        .supplier_service
        .list_all(ListQuery::from(params))
        .await?;
    Ok(Json(page.map(SupplierResponse::from)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SupplierResponse>, AppError> {
    let supplier = state.supplier_service.get_by_id(id).await?;
    Ok(Json(supplier.into()))
}

pub async fn get_supplier_by_legal_name(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LegalNameQuery>,
) -> Result<Json<SupplierResponse>, AppError> {
    let legal_name = query
        .razon_social
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("The legal name (razonSocial) must not be empty.".to_string()))?;

    let supplier = state
        .supplier_service
        .get_by_legal_name(legal_name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No supplier found with legal name '{}'.", legal_name))
        })?;

    Ok(Json(supplier.into()))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = state.supplier_service.create(payload.into_fields()).await?;
    let location = format!("/api/proveedores/{}", supplier.supplier_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(SupplierResponse::from(supplier)),
    ))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<SupplierRequest>,
) -> Result<StatusCode, AppError> {
    state
        .supplier_service
        .update(id, payload.into_fields())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.supplier_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn screen_supplier(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    AuthUser(caller): AuthUser,
) -> Result<Json<ScreeningResponse>, AppError> {
    let result = state
        .supplier_service
        .perform_screening(id, &caller)
        .await?;
    Ok(Json(result))
}
