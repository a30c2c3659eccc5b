//! Persistence seams for suppliers and identities.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ListQuery, Role, Supplier, User};
use crate::services::ServiceError;

/// Supplier persistence. Implementations reject a duplicate RUC atomically
/// on insert and update with [`ServiceError::duplicate_ruc`].
#[async_trait]
pub trait SupplierStore: Send + Sync {
    /// One page of the filtered, ordered listing plus the filtered total.
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Supplier>, i64), ServiceError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError>;

    /// First supplier (oldest first) whose legal name contains `legal_name`,
    /// ignoring case.
    async fn get_by_legal_name(&self, legal_name: &str) -> Result<Option<Supplier>, ServiceError>;

    async fn ruc_exists(&self, ruc: &str, excluding: Option<Uuid>) -> Result<bool, ServiceError>;

    async fn insert(&self, supplier: &Supplier) -> Result<(), ServiceError>;

    /// Returns `false` when no row with that id exists.
    async fn update(&self, supplier: &Supplier) -> Result<bool, ServiceError>;

    /// Returns `false` when no row with that id exists.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

/// User and role persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError>;

    /// Creates the user and its role assignments together. A taken email
    /// yields [`ServiceError::UserAlreadyExists`].
    async fn create_with_roles(&self, user: &User, roles: &[Role]) -> Result<(), ServiceError>;

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError>;
}
