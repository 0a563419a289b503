use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::{ApplicationId, JobId, UserId};

/// Status tracked for every application. `Applied` is the initial state;
/// `Hired` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Reviewed,
    Interview,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Statuses reachable in a single step. Never contains `self`.
    pub const fn allowed_targets(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Reviewed, Interview, Rejected, Hired],
            Reviewed => &[Interview, Rejected, Hired],
            Interview => &[Hired, Rejected],
            Hired | Rejected => &[],
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Labels match exactly, capitalization included.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'; expected one of Applied, Reviewed, Interview, Hired, Rejected")]
pub struct UnknownStatus(pub String);

/// Stored application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_id: UserId,
    pub job_id: JobId,
    pub resume_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Uploaded resume as received from the multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Applicant-provided payload for a new application.
#[derive(Debug, Clone, Validate)]
pub struct ApplySubmission {
    #[validate(length(max = 2000, message = "cover letter must be at most 2000 characters"))]
    pub cover_letter: Option<String>,
    pub resume: ResumeUpload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

impl StatusUpdateRequest {
    pub fn requested(&self) -> Result<ApplicationStatus, UnknownStatus> {
        self.status.parse()
    }
}

/// Row in an applicant's own application history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Row in a company's list of applicants for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobApplicationView {
    pub id: ApplicationId,
    pub applicant_id: UserId,
    pub applicant_name: Option<String>,
    pub resume_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChangeView {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_parse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.label().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("interview".parse::<ApplicationStatus>().is_err());
        assert!(" Hired".parse::<ApplicationStatus>().is_err());
        assert!("Withdrawn".parse::<ApplicationStatus>().is_err());
        assert!("".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn terminal_statuses_have_no_targets() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.is_terminal(), status.allowed_targets().is_empty());
            assert!(!status.allowed_targets().contains(&status));
        }
    }

    #[test]
    fn status_serializes_with_capitalized_label() {
        let encoded = serde_json::to_string(&ApplicationStatus::Interview).expect("serializes");
        assert_eq!(encoded, "\"Interview\"");
    }
}
