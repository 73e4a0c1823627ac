//! Runtime configuration
//!
//! Every option can be given as a flag or through the environment (a `.env`
//! file is loaded first).

use clap::Parser;

/// Development-only signing secret; a warning is logged when it is in use
pub const DEV_SECRET_KEY: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Longest accepted session lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

#[derive(Parser, Debug, Clone)]
#[command(name = "hotel-backend")]
#[command(about = "Hotel management API - guests, rooms and bookings")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database file holding users and records
    #[arg(long, env = "DATABASE_PATH", default_value = "hotel_management.db")]
    pub database_path: String,

    /// Secret used to sign session tokens
    #[arg(long, env = "SECRET_KEY", default_value = DEV_SECRET_KEY, hide_env_values = true)]
    pub secret_key: String,

    /// Allowed CORS origins (comma-separated)
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub cors_origins: Vec<String>,

    /// Session token lifetime in hours
    #[arg(
        long,
        env = "TOKEN_TTL_HOURS",
        default_value_t = crate::auth::jwt::DEFAULT_EXPIRATION_HOURS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    pub token_ttl_hours: i64,

    /// bcrypt work factor for password hashes
    #[arg(
        long,
        env = "BCRYPT_COST",
        default_value_t = bcrypt::DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}
