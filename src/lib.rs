//! Hotel Management Backend Library
//!
//! Staff authentication plus guest, room and booking records over HTTP.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod store;

pub use api::create_router;
pub use config::Config;
