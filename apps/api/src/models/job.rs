use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobCategory {
    WordProcessing,
    ExcelDataEntry,
    Design,
    Typesetting,
    /// Filter-only: matches every category, never stored on a job.
    AllJobs,
}

impl JobCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::WordProcessing => "word-processing",
            JobCategory::ExcelDataEntry => "excel-data-entry",
            JobCategory::Design => "design",
            JobCategory::Typesetting => "typesetting",
            JobCategory::AllJobs => "all-jobs",
        }
    }
}

impl FromStr for JobCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word-processing" => Ok(JobCategory::WordProcessing),
            "excel-data-entry" => Ok(JobCategory::ExcelDataEntry),
            "design" => Ok(JobCategory::Design),
            "typesetting" => Ok(JobCategory::Typesetting),
            "all-jobs" => Ok(JobCategory::AllJobs),
            other => Err(UnknownVariant::new("job category", other)),
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for JobStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(JobStatus::Open),
            "in-progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(UnknownVariant::new("job status", other)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: JobCategory,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub requirements: Vec<String>,
    pub client_id: Uuid,
    pub client_name: String,
    pub status: JobStatus,
    /// Ids of proposals submitted to this job. Only changed through the
    /// repository's add/remove proposal operations.
    pub proposals: Vec<Uuid>,
    pub selected_proposal: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level changes an owner may apply to a job. Proposal references are
/// deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<JobCategory>,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub requirements: Option<Vec<String>>,
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn apply(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(category) = self.category {
            job.category = category;
        }
        if let Some(budget) = self.budget {
            job.budget = budget;
        }
        if let Some(deadline) = self.deadline {
            job.deadline = deadline;
        }
        if let Some(requirements) = &self.requirements {
            job.requirements = requirements.clone();
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        job.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub requirements: Vec<String>,
    pub client_id: Uuid,
    pub client_name: String,
    pub status: String,
    pub proposals: Vec<Uuid>,
    pub selected_proposal: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = UnknownVariant;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category.parse()?,
            budget: row.budget,
            deadline: row.deadline,
            requirements: row.requirements,
            client_id: row.client_id,
            client_name: row.client_name,
            status: row.status.parse()?,
            proposals: row.proposals,
            selected_proposal: row.selected_proposal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in [
            JobCategory::WordProcessing,
            JobCategory::ExcelDataEntry,
            JobCategory::Design,
            JobCategory::Typesetting,
            JobCategory::AllJobs,
        ] {
            assert_eq!(category.as_str().parse::<JobCategory>().unwrap(), category);
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_status_serde_uses_kebab_case() {
        let status: JobStatus = serde_json::from_str(r#""in-progress""#).unwrap();
        assert_eq!(status, JobStatus::InProgress);
        assert!("in_progress".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_patch_ignores_proposal_fields() {
        let patch: JobPatch = serde_json::from_str(
            r#"{"title": "  New title ", "proposals": ["x"], "selectedProposal": "y"}"#,
        )
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("  New title "));
        assert!(patch.status.is_none());
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row = JobRow {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: "design".to_string(),
            budget: 10.0,
            deadline: now,
            requirements: vec![],
            client_id: Uuid::new_v4(),
            client_name: "c".to_string(),
            status: "archived".to_string(),
            proposals: vec![],
            selected_proposal: None,
            created_at: now,
            updated_at: now,
        };
        let err = Job::try_from(row).unwrap_err();
        assert!(err.to_string().contains("archived"));
    }
}
