use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequestParts, Path, Query,
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// Path parameters whose rejection is a problem-details 404: a segment that
/// does not parse (say, an id that is not a UUID) names no resource.
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| {
                tracing::debug!(error = %e.body_text(), path = %parts.uri.path(), "Unroutable path parameter");
                AppError::NotFound(format!("No resource matches '{}'.", parts.uri.path()))
            })?;

        Ok(ApiPath(value))
    }
}

/// Query string whose rejection is a problem-details 400.
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;

        Ok(ApiQuery(value))
    }
}
