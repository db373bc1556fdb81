use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobCategory, JobPatch, JobRow, JobStatus};
use crate::repositories::{JobRepository, PgStore};

fn into_jobs(rows: Vec<JobRow>) -> Result<Vec<Job>, AppError> {
    rows.into_iter()
        .map(|row| Job::try_from(row).map_err(AppError::from))
        .collect()
}

fn into_job(row: Option<JobRow>) -> Result<Option<Job>, AppError> {
    Ok(row.map(Job::try_from).transpose()?)
}

#[async_trait]
impl JobRepository for PgStore {
    async fn find_all(&self) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        into_jobs(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        into_job(row)
    }

    async fn find_by_category(&self, category: JobCategory) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE category = $1 ORDER BY created_at DESC",
        )
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await?;
        into_jobs(rows)
    }

    async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        into_jobs(rows)
    }

    async fn find_by_status(&self, status: JobStatus) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        into_jobs(rows)
    }

    async fn insert(&self, job: &Job) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, description, category, budget, deadline, requirements,
                 client_id, client_name, status, proposals, selected_proposal,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.category.as_str())
        .bind(job.budget)
        .bind(job.deadline)
        .bind(&job.requirements)
        .bind(job.client_id)
        .bind(&job.client_name)
        .bind(job.status.as_str())
        .bind(&job.proposals)
        .bind(job.selected_proposal)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                budget = COALESCE($5, budget),
                deadline = COALESCE($6, deadline),
                requirements = COALESCE($7, requirements),
                status = COALESCE($8, status),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.budget)
        .bind(patch.deadline)
        .bind(patch.requirements.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        into_job(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // proposals go with the job through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_proposal(
        &self,
        job_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET proposals = CASE
                    WHEN $2 = ANY(proposals) THEN proposals
                    ELSE array_append(proposals, $2)
                END,
                updated_at = now()
            WHERE id = $1 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await?;
        into_job(row)
    }

    async fn remove_proposal(
        &self,
        job_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET proposals = array_remove(proposals, $2),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(proposal_id)
        .fetch_optional(&self.pool)
        .await?;
        into_job(row)
    }
}
