pub mod domain_service;
pub mod registration;
pub mod tenant_service;
pub mod user_service;
