pub mod auth;
pub mod response;
pub mod tenant_scope;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use tenant_scope::{tenant_scope_middleware, ActiveTenant, TenantDb};
