//! JWT Token Handler
//! Mission: Issue and validate stateless, expiring session tokens

use crate::auth::{
    error::AuthError,
    models::{Claims, User},
};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Default token lifetime
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_hours: DEFAULT_EXPIRATION_HOURS,
        }
    }

    pub fn with_expiration_hours(mut self, hours: i64) -> Self {
        self.expiration_hours = hours;
        self
    }

    pub fn expiration_hours(&self) -> i64 {
        self.expiration_hours
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let lifetime =
            Duration::try_hours(self.expiration_hours).context("Invalid token lifetime")?;
        let exp = Utc::now()
            .checked_add_signed(lifetime)
            .context("Invalid timestamp")?
            .timestamp();

        debug!(
            "Generating JWT for {}, expires in {}h",
            user.email, self.expiration_hours
        );

        self.sign(&Claims {
            email: user.email.clone(),
            exp,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Validate signature and expiry, returning the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => {
                        debug!("Rejected JWT: {}", err);
                        AuthError::MalformedToken
                    }
                }
            })?;

        Ok(decoded.claims)
    }
}
