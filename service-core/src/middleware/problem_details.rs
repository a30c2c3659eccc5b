//! Development-only enrichment of 5xx problem-details bodies.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Environment;
use crate::error::ErrorDetail;

/// Rewrites internal-error responses to include the error text, its kind and
/// the captured trace when running in `dev`. In `prod` the sanitized body is
/// passed through untouched.
pub async fn expose_error_details(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if !environment.is_dev() {
        return response;
    }

    let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let status = response.status();
    let mut problem = detail.problem;
    problem.detail = format!("{} Technical details: {}", problem.detail, detail.message);
    problem.exception_type = Some(detail.kind.to_string());
    problem.stack_trace = Some(detail.trace);

    (status, Json(problem)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    fn app(environment: Environment) -> Router {
        Router::new()
            .route(
                "/boom",
                get(|| async { Err::<(), _>(AppError::InternalError(anyhow::anyhow!("disk full"))) }),
            )
            .layer(from_fn_with_state(environment, expose_error_details))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_dev_exposes_error_details() {
        let response = app(Environment::Dev)
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["exceptionType"], "InternalError");
        assert!(body["detail"].as_str().unwrap().contains("disk full"));
        assert!(body.get("stackTrace").is_some());
    }

    #[tokio::test]
    async fn test_prod_redacts_error_details() {
        let response = app(Environment::Prod)
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body.get("exceptionType").is_none());
        assert!(body.get("stackTrace").is_none());
        assert!(!body["detail"].as_str().unwrap().contains("disk full"));
        assert_eq!(body["status"], 500);
        assert_eq!(body["type"], "about:blank");
    }
}
