use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, FieldError};
use crate::models::job::{Job, JobCategory, JobPatch, JobStatus};
use crate::repositories::JobRepository;
use crate::users::validation::finish;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: JobCategory,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

fn check_text(field: &str, label: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    }
}

fn check_budget(budget: f64, errors: &mut Vec<FieldError>) {
    if !budget.is_finite() || budget < 0.0 {
        errors.push(FieldError::new(
            "budget",
            "Budget must be a non-negative number",
        ));
    }
}

fn check_category(category: JobCategory, errors: &mut Vec<FieldError>) {
    if category == JobCategory::AllJobs {
        errors.push(FieldError::new(
            "category",
            "all-jobs is a filter, not a job category",
        ));
    }
}

fn validate_patch(patch: &JobPatch) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if let Some(title) = &patch.title {
        check_text("title", "Title", title, &mut errors);
    }
    if let Some(description) = &patch.description {
        check_text("description", "Description", description, &mut errors);
    }
    if let Some(category) = patch.category {
        check_category(category, &mut errors);
    }
    if let Some(budget) = patch.budget {
        check_budget(budget, &mut errors);
    }
    if let Some(status) = patch.status {
        if !matches!(status, JobStatus::Completed | JobStatus::Cancelled) {
            errors.push(FieldError::new(
                "status",
                "A job can only be marked completed or cancelled",
            ));
        }
    }
    finish(errors)
}

/// Creation, lookup and owner-only edits of jobs. Moving a job to
/// in-progress happens only through proposal acceptance.
pub struct JobLifecycle<'a> {
    jobs: &'a dyn JobRepository,
}

impl<'a> JobLifecycle<'a> {
    pub fn new(jobs: &'a dyn JobRepository) -> Self {
        Self { jobs }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        owner_name: &str,
        input: NewJob,
    ) -> Result<Job, AppError> {
        let mut errors = Vec::new();
        check_text("title", "Title", &input.title, &mut errors);
        check_text("description", "Description", &input.description, &mut errors);
        check_category(input.category, &mut errors);
        check_budget(input.budget, &mut errors);
        finish(errors)?;

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            category: input.category,
            budget: input.budget,
            deadline: input.deadline,
            requirements: input.requirements,
            client_id: owner_id,
            client_name: owner_name.to_string(),
            status: JobStatus::Open,
            proposals: Vec::new(),
            selected_proposal: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.insert(&job).await?;
        info!("Created job {} for client {owner_id}", job.id);
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    /// Newest first, optionally narrowed to one status.
    pub async fn list(&self, status: Option<JobStatus>) -> Result<Vec<Job>, AppError> {
        match status {
            Some(status) => self.jobs.find_by_status(status).await,
            None => self.jobs.find_all().await,
        }
    }

    /// `all-jobs` matches every job. Unknown names are a validation error.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Job>, AppError> {
        let category: JobCategory = category
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid category: {category}")))?;
        match category {
            JobCategory::AllJobs => self.jobs.find_all().await,
            category => self.jobs.find_by_category(category).await,
        }
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, AppError> {
        self.jobs.find_by_client(client_id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: JobPatch,
        acting_client_id: Uuid,
    ) -> Result<Job, AppError> {
        validate_patch(&patch)?;

        let job = self.get(id).await?;
        if job.client_id != acting_client_id {
            return Err(AppError::Forbidden(
                "You can only update your own jobs".to_string(),
            ));
        }

        let job = self
            .jobs
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        info!("Updated job {id}");
        Ok(job)
    }

    /// Removes the job and every proposal submitted to it.
    pub async fn delete(&self, id: Uuid, acting_client_id: Uuid) -> Result<(), AppError> {
        let job = self.get(id).await?;
        if job.client_id != acting_client_id {
            return Err(AppError::Forbidden(
                "You can only delete your own jobs".to_string(),
            ));
        }
        if !self.jobs.delete(id).await? {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        info!("Deleted job {id}");
        Ok(())
    }
}
