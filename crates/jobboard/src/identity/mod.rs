//! Accounts, credentials, and the bearer-token gate in front of protected routes.

pub mod credentials;
pub mod domain;
pub mod middleware;
pub mod repository;
pub mod router;
pub mod service;

pub use credentials::{
    Argon2Hasher, CredentialError, JwtAuthority, PasswordHashing, TokenAuthority,
};
pub use domain::{AuthSession, LoginRequest, Role, SignUpRequest, User, UserView};
pub use middleware::{require_bearer, AuthState};
pub use repository::UserRepository;
pub use router::{auth_router, user_router};
pub use service::{IdentityError, IdentityService};
