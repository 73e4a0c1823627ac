//! Authentication Module
//! Mission: Staff accounts, stateless JWT sessions and the request guard

pub mod api;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use error::AuthError;
pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
pub use models::User;
pub use user_store::UserStore;
