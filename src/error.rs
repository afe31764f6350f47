// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidSlug(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
    /// Host or slug parsed but no matching tenant. Always rendered with the
    /// same body regardless of which resolution branch missed, so a probe
    /// cannot distinguish "unregistered" from "malformed".
    TenantNotFound,

    // 402 Payment Required
    TenantInactive(String),

    // 409 Conflict
    Conflict(String),
    DomainConflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::TenantInactive(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TenantNotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DomainConflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidSlug(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::TenantNotFound => "Store not found",
            ApiError::TenantInactive(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::DomainConflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidSlug(_) => "INVALID_SLUG",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TenantNotFound => "STORE_NOT_FOUND",
            ApiError::TenantInactive(_) => "STORE_INACTIVE",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::DomainConflict(_) => "DOMAIN_IN_USE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_slug(message: impl Into<String>) -> Self {
        ApiError::InvalidSlug(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn tenant_inactive(message: impl Into<String>) -> Self {
        ApiError::TenantInactive(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn domain_conflict(message: impl Into<String>) -> Self {
        ApiError::DomainConflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // Log the real error but return generic message
        tracing::error!("SQLx error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<crate::services::domain_service::DomainError> for ApiError {
    fn from(err: crate::services::domain_service::DomainError) -> Self {
        use crate::services::domain_service::DomainError;
        match err {
            DomainError::Conflict(domain) => {
                ApiError::domain_conflict(format!("Domain '{}' is already in use", domain))
            }
            DomainError::NoChallenge => {
                ApiError::not_found("No verification challenge outstanding for this store")
            }
            DomainError::InvalidDomain(msg) => ApiError::bad_request(msg),
            DomainError::Database(e) => e.into(),
        }
    }
}

impl From<crate::tenant::slug::SlugError> for ApiError {
    fn from(err: crate::tenant::slug::SlugError) -> Self {
        ApiError::invalid_slug(err.to_string())
    }
}

impl From<crate::services::tenant_service::TenantServiceError> for ApiError {
    fn from(err: crate::services::tenant_service::TenantServiceError) -> Self {
        use crate::services::tenant_service::TenantServiceError;
        match err {
            TenantServiceError::Slug(e) => e.into(),
            TenantServiceError::AlreadyExists(slug) => {
                ApiError::conflict(format!("Subdomain '{}' is already taken", slug))
            }
            TenantServiceError::NotFound => ApiError::not_found("Store not found"),
            TenantServiceError::Database(e) => e.into(),
        }
    }
}

impl From<crate::services::user_service::UserServiceError> for ApiError {
    fn from(err: crate::services::user_service::UserServiceError) -> Self {
        use crate::services::user_service::UserServiceError;
        match err {
            UserServiceError::EmailTaken => ApiError::conflict("Email already registered"),
            // One message for both unknown-email and bad-password
            UserServiceError::InvalidCredentials => {
                ApiError::unauthorized("Invalid email or password")
            }
            UserServiceError::Hashing(e) => {
                tracing::error!("bcrypt error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserServiceError::Database(e) => e.into(),
        }
    }
}

impl From<crate::services::registration::RegistrationError> for ApiError {
    fn from(err: crate::services::registration::RegistrationError) -> Self {
        use crate::services::registration::RegistrationError;
        match err {
            RegistrationError::User(e) => e.into(),
            RegistrationError::Tenant(e) => e.into(),
            RegistrationError::Database(e) => e.into(),
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
