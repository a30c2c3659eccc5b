pub mod auth;
pub mod metrics;

pub use auth::{auth_middleware, require_admin, AuthUser};
pub use metrics::metrics_middleware;
