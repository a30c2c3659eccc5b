pub mod auth;
pub mod supplier;

pub use auth::{
    AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, VerifyTokenRequest,
    VerifyTokenResponse,
};
pub use supplier::{LegalNameQuery, SupplierRequest, SupplierResponse};
