//! Business logic and its infrastructure seams.

mod auth;
pub mod credentials;
mod database;
pub mod error;
mod jwt;
mod memory;
pub mod metrics;
pub mod policy;
pub mod screening;
pub mod store;
mod supplier;

pub use auth::AuthService;
pub use credentials::{CredentialProvider, ScrapingCredentials};
pub use database::Database;
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, IssuedToken, JwtService};
pub use memory::InMemoryStore;
pub use screening::{HttpScreeningClient, ScreeningClient};
pub use store::{SupplierStore, UserStore};
pub use supplier::SupplierService;
