use service_core::error::AppError;
use thiserror::Error;

/// Field key under which every duplicate-RUC failure is reported.
pub const RUC_FIELD: &str = "RUC";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("The resource '{resource}' with identifier '{id}' was not found.")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Registration failed: {}", .0.join("; "))]
    RegistrationFailed(Vec<String>),

    #[error("External service error: {0}")]
    External(String),

    #[error("{0}")]
    Operational(String),
}

impl ServiceError {
    pub fn duplicate_ruc(ruc: &str) -> Self {
        ServiceError::Validation {
            field: RUC_FIELD.to_string(),
            message: format!("A supplier with RUC '{}' is already registered.", ruc),
        }
    }

    pub fn supplier_not_found(id: impl ToString) -> Self {
        ServiceError::NotFound {
            resource: "Proveedor",
            id: id.to_string(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(e.into()),
            ServiceError::Internal(e) => AppError::InternalError(e),
            e @ ServiceError::NotFound { .. } => AppError::NotFound(e.to_string()),
            ServiceError::Validation { field, message } => AppError::field(field, message),
            ServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ServiceError::UserAlreadyExists => {
                AppError::BadRequest("A user with this email already exists.".to_string())
            }
            e @ ServiceError::RegistrationFailed(_) => AppError::InternalError(anyhow::anyhow!(e)),
            ServiceError::External(msg) => AppError::BadGateway(msg),
            ServiceError::Operational(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
        }
    }
}
