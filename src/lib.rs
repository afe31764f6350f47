pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod domains;
pub mod error;
pub mod handlers;
pub mod handoff;
pub mod middleware;
pub mod services;
pub mod state;
pub mod tenant;
