pub mod pagination;
pub mod screening;
pub mod supplier;
pub mod user;

pub use pagination::{
    ListQuery, PagedResult, PaginationParams, SortDirection, SortField, MAX_PAGE_SIZE,
};
pub use screening::{ScrapingLoginRequest, ScrapingLoginResponse, ScreeningMatch, ScreeningResponse};
pub use supplier::{Supplier, SupplierFields};
pub use user::{AuthContext, Role, User};
