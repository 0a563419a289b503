use std::sync::Arc;

use chrono::Utc;
use validator::{Validate, ValidationErrors};

use super::credentials::{CredentialError, PasswordHashing, TokenAuthority};
use super::domain::{normalize_email, AuthSession, LoginRequest, SignUpRequest, User, UserView};
use super::repository::UserRepository;
use crate::ids::UserId;
use crate::policy::Actor;
use crate::store::RepositoryError;

/// Sign-up, login, and profile lookups.
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHashing>,
    tokens: Arc<dyn TokenAuthority>,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHashing>,
        tokens: Arc<dyn TokenAuthority>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Register a new account and hand back a session for it.
    pub fn sign_up(&self, request: SignUpRequest) -> Result<AuthSession, IdentityError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        if self.users.find_by_email(&email)?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name: request.name.trim().to_string(),
            email,
            password_hash: self.hasher.hash(&request.password)?,
            role: request.role,
            created_at: now,
            updated_at: now,
        };

        // A concurrent sign-up can still win between the lookup and this insert.
        let user = self.users.insert(user).map_err(|err| match err {
            RepositoryError::Conflict => IdentityError::EmailTaken,
            other => IdentityError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "account registered");
        self.session_for(&user)
    }

    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub fn login(&self, request: LoginRequest) -> Result<AuthSession, IdentityError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let Some(user) = self.users.find_by_email(&email)? else {
            tracing::debug!("login for unknown email");
            return Err(IdentityError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(IdentityError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    pub fn profile(&self, actor: &Actor) -> Result<UserView, IdentityError> {
        self.users
            .find_by_id(&actor.id)?
            .map(|user| user.view())
            .ok_or(IdentityError::NotFound)
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, IdentityError> {
        let token = self.tokens.issue(&user.id, user.role, Utc::now())?;
        Ok(AuthSession {
            token,
            user: user.view(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::credentials::{Argon2Hasher, JwtAuthority};
    use crate::identity::domain::Role;
    use crate::store::InMemoryUserRepository;

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(Argon2Hasher),
            Arc::new(JwtAuthority::new(b"identity-tests", chrono::Duration::hours(1))),
        )
    }

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            name: "Grace Hopper".to_string(),
            email: email.to_string(),
            password: "C0bol!rocks".to_string(),
            role: Role::Company,
        }
    }

    #[test]
    fn sign_up_normalizes_email_and_hides_hash() {
        let session = service()
            .sign_up(sign_up_request("  Grace@Example.COM "))
            .expect("sign up succeeds");
        assert_eq!(session.user.email, "grace@example.com");
        assert_eq!(session.user.role, Role::Company);
        assert!(!session.token.is_empty());

        let encoded = serde_json::to_string(&session).expect("serializes");
        assert!(!encoded.contains("argon2"));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let service = service();
        service
            .sign_up(sign_up_request("grace@example.com"))
            .expect("first sign up");
        assert!(matches!(
            service.sign_up(sign_up_request("GRACE@example.com")),
            Err(IdentityError::EmailTaken)
        ));
    }

    #[test]
    fn login_fails_identically_for_unknown_email_and_wrong_password() {
        let service = service();
        service
            .sign_up(sign_up_request("grace@example.com"))
            .expect("sign up");

        let wrong_password = service
            .login(LoginRequest {
                email: "grace@example.com".to_string(),
                password: "Wr0ng!pass".to_string(),
            })
            .expect_err("wrong password");
        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "C0bol!rocks".to_string(),
            })
            .expect_err("unknown email");
        assert_eq!(wrong_password.to_string(), unknown.to_string());
        assert!(matches!(unknown, IdentityError::InvalidCredentials));
    }

    #[test]
    fn login_and_profile_round_trip() {
        let service = service();
        let created = service
            .sign_up(sign_up_request("grace@example.com"))
            .expect("sign up");
        let session = service
            .login(LoginRequest {
                email: "Grace@example.com".to_string(),
                password: "C0bol!rocks".to_string(),
            })
            .expect("login");
        assert_eq!(session.user.id, created.user.id);

        let actor = Actor::new(created.user.id.clone(), Role::Company);
        assert_eq!(service.profile(&actor).expect("profile"), created.user);

        let ghost = Actor::new(UserId::from("ghost"), Role::Applicant);
        assert!(matches!(
            service.profile(&ghost),
            Err(IdentityError::NotFound)
        ));
    }

    #[test]
    fn invalid_sign_up_reports_validation_errors() {
        let mut request = sign_up_request("not-an-email");
        request.password = "weak".to_string();
        assert!(matches!(
            service().sign_up(request),
            Err(IdentityError::Validation(_))
        ));
    }
}
