pub mod domains;
pub mod settings;

use crate::database::models::{Tenant, UserRole};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Dashboard mutations require the authenticated user to own the resolved
/// tenant (platform admins may act on any store). This is the security
/// boundary: a valid session for store A grants nothing on store B.
pub fn ensure_owner(auth: &AuthUser, tenant: &Tenant) -> Result<(), ApiError> {
    if auth.role == UserRole::PlatformAdmin || auth.id == tenant.owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("You do not own this store"))
    }
}
