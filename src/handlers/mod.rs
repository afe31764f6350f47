pub mod admin;
pub mod dashboard;
pub mod public;
pub mod store;
pub mod whoami;
