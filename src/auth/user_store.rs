//! User Storage
//! Mission: Register staff accounts and verify their credentials with SQLite

use crate::auth::{
    error::AuthError,
    models::{RegisterRequest, User, DEFAULT_ROLE, MIN_PASSWORD_LEN},
};
use crate::store::{open_database, IN_MEMORY};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, ErrorCode, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    name TEXT,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

/// User storage with SQLite backend
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = open_database(db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize users schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            bcrypt_cost: DEFAULT_COST,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(IN_MEMORY)
    }

    /// Override the bcrypt work factor (lower values are only sensible in tests)
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Create a new user after validating the request.
    ///
    /// Uniqueness of the email is enforced by the insert itself.
    pub fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let (email, password) = validate_registration(&request)?;

        let password_hash = hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            name: request.name,
            role: request.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at: Utc::now(),
        };

        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT INTO users (id, email, password_hash, name, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.email,
                user.password_hash,
                user.name,
                user.role,
                user.created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                debug!("Registration rejected, email taken: {}", user.email);
                return Err(AuthError::Conflict);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }

        info!("✅ Registered user: {} ({})", user.email, user.role);
        Ok(user)
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, email, password_hash, name, role, created_at
                 FROM users WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()
            .context("Failed to load user")?;

        Ok(user)
    }

    /// Verify email and password, returning the matching user
    pub fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .get_user_by_email(email)?
            .ok_or(AuthError::UserNotFound)?;

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<(&str, &str), AuthError> {
    let email = request.email.as_deref().filter(|e| !e.is_empty());
    let password = request.password.as_deref().filter(|p| !p.is_empty());

    let (Some(email), Some(password)) = (email, password) else {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    if !email.contains('@') {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    Ok((email, password))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        role: row.get(4)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
            .with_timezone(&Utc),
    })
}
