use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::RepositoryError;
use crate::applications::domain::{Application, ApplicationStatus};
use crate::applications::repository::ApplicationRepository;
use crate::identity::domain::{Role, User};
use crate::identity::repository::UserRepository;
use crate::ids::{ApplicationId, JobId, UserId};
use crate::jobs::domain::{contains_ignore_case, Job, JobQuery};
use crate::jobs::repository::JobRepository;
use crate::pagination::{Page, PageRequest};

/// Records kept in insertion order so "newest first" is a reverse walk with a
/// stable sort on the timestamp.
#[derive(Debug)]
struct Table<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Table<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<T>>, RepositoryError> {
        self.rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<T>>, RepositoryError> {
        self.rows
            .write()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".to_string()))
    }
}

fn newest_first<T, K, F>(rows: &[T], keep: F, key: K) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
    K: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut matched: Vec<T> = rows.iter().rev().filter(|row| keep(row)).cloned().collect();
    matched.sort_by(|a, b| key(b).cmp(&key(a)));
    matched
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Table<User>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut rows = self.users.write()?;
        if rows
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email) || existing.id == user.id)
        {
            return Err(RepositoryError::Conflict);
        }
        rows.push(user.clone());
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let rows = self.users.read()?;
        Ok(rows
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let rows = self.users.read()?;
        Ok(rows.iter().find(|user| &user.id == id).cloned())
    }

    fn find_companies_by_name(&self, fragment: &str) -> Result<Vec<User>, RepositoryError> {
        let rows = self.users.read()?;
        Ok(rows
            .iter()
            .filter(|user| user.role == Role::Company && contains_ignore_case(&user.name, fragment))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryJobRepository {
    jobs: Table<Job>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut rows = self.jobs.write()?;
        if rows.iter().any(|existing| existing.id == job.id) {
            return Err(RepositoryError::Conflict);
        }
        rows.push(job.clone());
        Ok(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let rows = self.jobs.read()?;
        Ok(rows.iter().find(|job| &job.id == id).cloned())
    }

    fn list(&self, query: &JobQuery, page: PageRequest) -> Result<Page<Job>, RepositoryError> {
        let rows = self.jobs.read()?;
        let matched = newest_first(&rows, |job| query.matches(job), |job| job.created_at);
        Ok(page.slice(matched))
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut rows = self.jobs.write()?;
        let slot = rows
            .iter_mut()
            .find(|existing| existing.id == job.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = job;
        Ok(())
    }

    fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut rows = self.jobs.write()?;
        let before = rows.len();
        rows.retain(|job| &job.id != id);
        if rows.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    applications: Table<Application>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut rows = self.applications.write()?;
        let taken = rows.iter().any(|existing| {
            existing.id == application.id
                || (existing.applicant_id == application.applicant_id
                    && existing.job_id == application.job_id)
        });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        rows.push(application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let rows = self.applications.read()?;
        Ok(rows.iter().find(|application| &application.id == id).cloned())
    }

    fn find_by_applicant(
        &self,
        applicant: &UserId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        let rows = self.applications.read()?;
        let matched = newest_first(
            &rows,
            |application| &application.applicant_id == applicant,
            |application| application.applied_at,
        );
        Ok(page.slice(matched))
    }

    fn find_by_job(
        &self,
        job: &JobId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        let rows = self.applications.read()?;
        let matched = newest_first(
            &rows,
            |application| &application.job_id == job,
            |application| application.applied_at,
        );
        Ok(page.slice(matched))
    }

    fn find_by_applicant_and_job(
        &self,
        applicant: &UserId,
        job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        let rows = self.applications.read()?;
        Ok(rows
            .iter()
            .find(|application| &application.applicant_id == applicant && &application.job_id == job)
            .cloned())
    }

    fn find_by_resume_link(&self, link: &str) -> Result<Option<Application>, RepositoryError> {
        let rows = self.applications.read()?;
        Ok(rows
            .iter()
            .find(|application| application.resume_link == link)
            .cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut rows = self.applications.write()?;
        let application = rows
            .iter_mut()
            .find(|application| &application.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if application.status != expected {
            return Err(RepositoryError::Conflict);
        }
        application.status = next;
        Ok(application.clone())
    }
}
