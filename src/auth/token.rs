use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifetime of an issued access token.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Represents the claims encoded within an access token.
///
/// Only `email` is interpreted by the server; whatever else the client posted to
/// `/jwt` rides along in `extra` and is handed back on verification.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Identity of the token holder.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Rejects the request with `Forbidden` unless the token belongs to `email`.
    pub fn ensure_email(&self, email: &str) -> Result<(), AppError> {
        if self.email == email {
            Ok(())
        } else {
            log::debug!("token for {} tried to access {}", self.email, email);
            Err(AppError::forbidden())
        }
    }
}

/// Signs and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Issues a token for `email` carrying the extra client-supplied claims.
    ///
    /// Any `iat`/`exp` in `extra` is discarded; the server always sets its own.
    pub fn issue(&self, email: &str, mut extra: Map<String, Value>) -> Result<String, AppError> {
        extra.remove("iat");
        extra.remove("exp");
        extra.remove("email");

        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            extra,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token string and decodes its claims.
    ///
    /// Expired, malformed and badly signed tokens all map to the same
    /// `Unauthorized` error; the cause is only logged.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("rejected access token: {}", e);
                AppError::unauthorized()
            })
    }
}
