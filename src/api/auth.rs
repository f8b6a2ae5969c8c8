use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;
use crate::api::rest::ApiState;
use crate::error::{Error, Result};
use crate::utils::helper::current_timestamp;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User email
    pub exp: u64,    // Expiration time
    pub iat: u64,    // Issued at
}

pub struct JwtAuth {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtAuth {
    pub fn new(secret: &str, algorithm: &str) -> Result<Self> {
        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| Error::ConfigError(format!("Unsupported JWT algorithm: {algorithm}")))?;

        Ok(JwtAuth {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn generate_token(&self, email: &str, ttl_secs: u64) -> Result<String> {
        let now = current_timestamp();

        let claims = Claims {
            sub: email.to_string(),
            exp: now + ttl_secs,
            iat: now,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| Error::AuthenticationError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(self.algorithm),
        )
        .map_err(|_| Error::TokenRejected)?;

        Ok(token_data.claims)
    }
}

/// Rejects any request without a valid, unexpired bearer token. Verified
/// claims are attached to the request for handlers that want the caller's
/// identity.
pub async fn require_auth(
    State(state): State<Arc<ApiState>>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Salted SHA-256, stored as `hexsalt$hexdigest`. The plaintext never
/// touches the store.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = salted_digest(&salt, password);
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => salted_digest(salt, password) == digest,
        None => false,
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert!(!stored.contains("hunter2"));
    }

    #[test]
    fn password_hashes_are_salted() {
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("hunter2", "no-separator-here"));
    }

    #[test]
    fn token_round_trips() {
        let jwt = JwtAuth::new("secret", "HS256").unwrap();
        let token = jwt.generate_token("alice@example.com", 60).unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let jwt = JwtAuth::new("secret", "HS256").unwrap();
        let other = JwtAuth::new("different", "HS256").unwrap();
        let token = other.generate_token("alice@example.com", 60).unwrap();
        assert!(matches!(jwt.verify_token(&token), Err(Error::TokenRejected)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtAuth::new("secret", "HS256").unwrap();
        let now = current_timestamp();
        // Far enough in the past to clear the default validation leeway.
        let claims = Claims {
            sub: "alice@example.com".to_string(),
            exp: now - 300,
            iat: now - 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(jwt.verify_token(&token), Err(Error::TokenRejected)));
    }

    #[test]
    fn unknown_algorithm_is_a_config_error() {
        assert!(matches!(
            JwtAuth::new("secret", "ROT13"),
            Err(Error::ConfigError(_))
        ));
    }
}
