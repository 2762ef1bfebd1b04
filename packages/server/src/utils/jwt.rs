use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::role::Role;

/// JWT Claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // User ID
    pub email: String,
    pub role: Role,
    pub iat: i64, // Issued-at timestamp
    pub exp: i64, // Expiration timestamp
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, role: Role, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            email: email.to_owned(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Sign a fresh HS256 token for a user, valid for `ttl` from now.
pub fn sign(user_id: Uuid, email: &str, role: Role, secret: &str, ttl: Duration) -> Result<(String, Claims)> {
    let claims = Claims::new(user_id, email, role, Utc::now(), ttl);
    let token = encode_claims(&claims, secret)?;
    Ok((token, claims))
}

/// Encode an arbitrary claim set with the given secret.
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to encode JWT")
}

/// Verify and decode a JWT token.
///
/// Expiry is checked with zero leeway; `exp`, `iat` and `sub` must be present.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
