use super::domain::User;
use crate::ids::UserId;
use crate::store::RepositoryError;

/// Account storage. `insert` must reject a second account with the same
/// (normalized) email with [`RepositoryError::Conflict`].
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Company accounts whose name contains `fragment`, case-insensitively.
    fn find_companies_by_name(&self, fragment: &str) -> Result<Vec<User>, RepositoryError>;
}
