//! Password hashing and bearer token primitives.
//!
//! Both sit behind traits so services and the auth middleware can be exercised
//! with the real implementations or swapped out in tests.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Argon2, PasswordHash};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::Role;
use crate::config::AuthConfig;
use crate::ids::UserId;
use crate::policy::Actor;

/// One-way password hashing.
pub trait PasswordHashing: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, CredentialError>;
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Issues and verifies the bearer tokens that identify an [`Actor`].
pub trait TokenAuthority: Send + Sync {
    fn issue(&self, user: &UserId, role: Role, now: DateTime<Utc>)
        -> Result<String, CredentialError>;
    fn verify(&self, token: &str) -> Result<Actor, CredentialError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token encoding failed: {0}")]
    Encoding(String),
    #[error("invalid or expired token")]
    InvalidToken,
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHashing for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| CredentialError::Hashing(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Claims carried inside issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 tokens signed with the configured secret.
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtAuthority {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
        )
    }
}

impl TokenAuthority for JwtAuthority {
    fn issue(
        &self,
        user: &UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = Claims {
            sub: user.0.clone(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| CredentialError::Encoding(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Actor, CredentialError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| CredentialError::InvalidToken)?;
        if data.claims.sub.trim().is_empty() {
            return Err(CredentialError::InvalidToken);
        }
        Ok(Actor {
            id: UserId(data.claims.sub),
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_round_trips_and_rejects_wrong_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("Str0ng!pass").expect("hashes");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Str0ng!pass", &hash).expect("verifies"));
        assert!(!hasher.verify("Wr0ng!pass", &hash).expect("verifies"));
    }

    #[test]
    fn verify_reports_malformed_hashes() {
        let hasher = Argon2Hasher;
        assert!(matches!(
            hasher.verify("anything", "not-a-hash"),
            Err(CredentialError::Hashing(_))
        ));
    }

    #[test]
    fn issued_tokens_verify_into_actor() {
        let authority = JwtAuthority::new(b"test-secret", Duration::hours(1));
        let user = UserId::from("user-1");
        let token = authority
            .issue(&user, Role::Company, Utc::now())
            .expect("token issues");

        let actor = authority.verify(&token).expect("token verifies");
        assert_eq!(actor.id, user);
        assert_eq!(actor.role, Role::Company);
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let authority = JwtAuthority::new(b"test-secret", Duration::hours(1));
        let user = UserId::from("user-1");

        let stale = authority
            .issue(&user, Role::Applicant, Utc::now() - Duration::hours(3))
            .expect("token issues");
        assert!(matches!(
            authority.verify(&stale),
            Err(CredentialError::InvalidToken)
        ));

        let other = JwtAuthority::new(b"other-secret", Duration::hours(1));
        let foreign = other
            .issue(&user, Role::Applicant, Utc::now())
            .expect("token issues");
        assert!(matches!(
            authority.verify(&foreign),
            Err(CredentialError::InvalidToken)
        ));
        assert!(authority.verify("garbage").is_err());
    }
}
