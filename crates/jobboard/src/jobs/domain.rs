use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::{JobId, UserId};

/// A posted job. `created_by` is the owning company account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub is_published: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Unpublished jobs are only visible to their owner.
    pub fn visible_to(&self, viewer: &UserId) -> bool {
        self.is_published || &self.created_by == viewer
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 20,
        max = 2000,
        message = "description must be 20 to 2000 characters"
    ))]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl CreateJobRequest {
    /// Trim the title so length rules see what will be stored.
    pub fn trimmed(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }

    pub fn into_job(self, owner: UserId, now: DateTime<Utc>) -> Job {
        Job {
            id: JobId::generate(),
            title: self.title,
            description: self.description,
            location: normalize_location(self.location),
            is_published: self.is_published.unwrap_or(true),
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "title must be 1 to 100 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 20,
        max = 2000,
        message = "description must be 20 to 2000 characters"
    ))]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl UpdateJobRequest {
    pub fn trimmed(mut self) -> Self {
        self.title = self.title.map(|title| title.trim().to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.is_published.is_none()
    }

    pub fn apply_to(self, job: &mut Job, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(location) = self.location {
            job.location = normalize_location(Some(location));
        }
        if let Some(published) = self.is_published {
            job.is_published = published;
        }
        job.updated_at = now;
    }
}

fn normalize_location(location: Option<String>) -> Option<String> {
    location
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Query-string filters for the public job listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Store-level query produced from a [`JobFilter`] once company names are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub creators: Option<Vec<UserId>>,
    pub published_only: bool,
}

impl JobQuery {
    pub fn matches(&self, job: &Job) -> bool {
        if self.published_only && !job.is_published {
            return false;
        }
        if let Some(title) = &self.title {
            if !contains_ignore_case(&job.title, title) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            let found = job
                .location
                .as_deref()
                .is_some_and(|value| contains_ignore_case(value, location));
            if !found {
                return false;
            }
        }
        if let Some(creators) = &self.creators {
            if !creators.contains(&job.created_by) {
                return false;
            }
        }
        true
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}
