pub mod auth;
pub mod cors;
pub mod response;
pub mod tenant;

pub use auth::AuthUser;
pub use response::{ApiResponse, ApiResult};
pub use tenant::{MaybeTenant, RequireTenant, OVERRIDE_HOST_HEADER};
