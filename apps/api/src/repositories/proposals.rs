use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobRow, JobStatus};
use crate::models::proposal::{Acceptance, Proposal, ProposalPatch, ProposalRow, ProposalStatus};
use crate::repositories::{AcceptOutcome, PgStore, ProposalRepository, DUPLICATE_PROPOSAL};

fn into_proposals(rows: Vec<ProposalRow>) -> Result<Vec<Proposal>, AppError> {
    rows.into_iter()
        .map(|row| Proposal::try_from(row).map_err(AppError::from))
        .collect()
}

#[async_trait]
impl ProposalRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        let row = sqlx::query_as::<_, ProposalRow>("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Proposal::try_from).transpose()?)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        let rows = sqlx::query_as::<_, ProposalRow>(
            "SELECT * FROM proposals WHERE job_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        into_proposals(rows)
    }

    async fn find_by_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        let rows = sqlx::query_as::<_, ProposalRow>(
            "SELECT * FROM proposals WHERE freelancer_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(freelancer_id)
        .fetch_all(&self.pool)
        .await?;
        into_proposals(rows)
    }

    async fn insert(&self, proposal: &Proposal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO proposals
                (id, job_id, freelancer_id, freelancer_name, rate, delivery_time,
                 cover_letter, status, submitted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(proposal.id)
        .bind(proposal.job_id)
        .bind(proposal.freelancer_id)
        .bind(&proposal.freelancer_name)
        .bind(proposal.rate)
        .bind(proposal.delivery_time)
        .bind(&proposal.cover_letter)
        .bind(proposal.status.as_str())
        .bind(proposal.submitted_at)
        .bind(proposal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_PROPOSAL))?;
        Ok(())
    }

    async fn update_pending(
        &self,
        id: Uuid,
        patch: &ProposalPatch,
    ) -> Result<Option<Proposal>, AppError> {
        let row = sqlx::query_as::<_, ProposalRow>(
            r#"
            UPDATE proposals
            SET rate = COALESCE($2, rate),
                delivery_time = COALESCE($3, delivery_time),
                cover_letter = COALESCE($4, cover_letter),
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.rate)
        .bind(patch.delivery_time)
        .bind(patch.cover_letter.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Proposal::try_from).transpose()?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn accept(&self, id: Uuid) -> Result<AcceptOutcome, AppError> {
        // Dropping `tx` without commit rolls every write back.
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ProposalRow>(
            "SELECT * FROM proposals WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current.map(Proposal::try_from).transpose()? else {
            return Ok(AcceptOutcome::ProposalMissing);
        };
        if current.status != ProposalStatus::Pending {
            return Ok(AcceptOutcome::ProposalNotPending(current.status));
        }

        let accepted = sqlx::query_as::<_, ProposalRow>(
            r#"
            UPDATE proposals
            SET status = 'accepted', updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let job = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = 'in-progress', selected_proposal = $1, updated_at = now()
            WHERE id = $2 AND status = 'open'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(current.job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            let status: Option<String> = sqlx::query_scalar("SELECT status FROM jobs WHERE id = $1")
                .bind(current.job_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(match status {
                None => AcceptOutcome::JobMissing,
                Some(status) => AcceptOutcome::JobNotOpen(status.parse::<JobStatus>()?),
            });
        };

        let rejected: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE proposals
            SET status = 'rejected', updated_at = now()
            WHERE job_id = $1 AND id <> $2 AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(current.job_id)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Acceptance of proposal {id} committed");

        Ok(AcceptOutcome::Accepted(Acceptance {
            proposal: Proposal::try_from(accepted)?,
            job: Job::try_from(job)?,
            rejected,
        }))
    }
}
