//! Proposal state machine: `pending` moves once to `accepted`, `rejected`
//! or `withdrawn`, and never leaves those states.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, FieldError};
use crate::models::job::{Job, JobStatus};
use crate::models::proposal::{Proposal, ProposalPatch, ProposalStatus};
use crate::repositories::{AcceptOutcome, JobRepository, ProposalRepository};
use crate::users::validation::finish;

const JOB_CLOSED: &str = "This job is no longer accepting proposals";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub job_id: Uuid,
    pub rate: f64,
    pub delivery_time: i32,
    #[serde(default)]
    pub cover_letter: String,
}

fn check_rate(rate: f64, errors: &mut Vec<FieldError>) {
    if !rate.is_finite() || rate <= 0.0 {
        errors.push(FieldError::new("rate", "Rate must be greater than 0"));
    }
}

fn check_delivery_time(days: i32, errors: &mut Vec<FieldError>) {
    if days < 1 {
        errors.push(FieldError::new(
            "deliveryTime",
            "Delivery time must be at least 1 day",
        ));
    }
}

fn check_cover_letter(cover_letter: &str, errors: &mut Vec<FieldError>) {
    if cover_letter.trim().is_empty() {
        errors.push(FieldError::new("coverLetter", "Cover letter is required"));
    }
}

pub struct ProposalLifecycle<'a> {
    jobs: &'a dyn JobRepository,
    proposals: &'a dyn ProposalRepository,
}

impl<'a> ProposalLifecycle<'a> {
    pub fn new(jobs: &'a dyn JobRepository, proposals: &'a dyn ProposalRepository) -> Self {
        Self { jobs, proposals }
    }

    async fn load_job(&self, id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Proposal, AppError> {
        self.proposals
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))
    }

    pub async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        self.proposals.find_by_job(job_id).await
    }

    pub async fn list_by_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        self.proposals.find_by_freelancer(freelancer_id).await
    }

    pub async fn submit(
        &self,
        freelancer_id: Uuid,
        freelancer_name: &str,
        input: NewProposal,
    ) -> Result<Proposal, AppError> {
        let mut errors = Vec::new();
        check_rate(input.rate, &mut errors);
        check_delivery_time(input.delivery_time, &mut errors);
        check_cover_letter(&input.cover_letter, &mut errors);
        finish(errors)?;

        let job = self.load_job(input.job_id).await?;
        if job.status != JobStatus::Open {
            return Err(AppError::InvalidState(JOB_CLOSED.to_string()));
        }
        if job.client_id == freelancer_id {
            return Err(AppError::Forbidden(
                "You cannot submit a proposal for your own job".to_string(),
            ));
        }

        let now = Utc::now();
        let proposal = Proposal {
            id: Uuid::new_v4(),
            job_id: job.id,
            freelancer_id,
            freelancer_name: freelancer_name.to_string(),
            rate: input.rate,
            delivery_time: input.delivery_time,
            cover_letter: input.cover_letter,
            status: ProposalStatus::Pending,
            submitted_at: now,
            updated_at: now,
        };
        self.proposals.insert(&proposal).await?;

        // The job may have been accepted or removed since it was read.
        if self.jobs.add_proposal(job.id, proposal.id).await?.is_none() {
            self.proposals.delete(proposal.id).await?;
            return Err(match self.jobs.find_by_id(job.id).await? {
                Some(_) => AppError::InvalidState(JOB_CLOSED.to_string()),
                None => AppError::NotFound("Job not found".to_string()),
            });
        }
        info!(
            "Freelancer {freelancer_id} submitted proposal {} on job {}",
            proposal.id, job.id
        );
        Ok(proposal)
    }

    /// Accepts one proposal, starts its job and rejects the other pending
    /// proposals, all in one repository write.
    pub async fn accept(&self, id: Uuid, acting_client_id: Uuid) -> Result<Proposal, AppError> {
        let proposal = self.get(id).await?;
        let job = self.load_job(proposal.job_id).await?;
        if job.client_id != acting_client_id {
            return Err(AppError::Forbidden(
                "You can only accept proposals for your own jobs".to_string(),
            ));
        }

        match self.proposals.accept(id).await? {
            AcceptOutcome::Accepted(acceptance) => {
                info!(
                    "Accepted proposal {id} on job {}, rejected {} other(s)",
                    acceptance.job.id,
                    acceptance.rejected.len()
                );
                Ok(acceptance.proposal)
            }
            AcceptOutcome::ProposalMissing => {
                Err(AppError::NotFound("Proposal not found".to_string()))
            }
            AcceptOutcome::ProposalNotPending(_) => Err(AppError::InvalidState(
                "You can only accept pending proposals".to_string(),
            )),
            AcceptOutcome::JobMissing => Err(AppError::NotFound("Job not found".to_string())),
            AcceptOutcome::JobNotOpen(_) => Err(AppError::InvalidState(JOB_CLOSED.to_string())),
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: ProposalPatch,
        acting_freelancer_id: Uuid,
    ) -> Result<Proposal, AppError> {
        let mut errors = Vec::new();
        if let Some(rate) = patch.rate {
            check_rate(rate, &mut errors);
        }
        if let Some(days) = patch.delivery_time {
            check_delivery_time(days, &mut errors);
        }
        if let Some(cover_letter) = &patch.cover_letter {
            check_cover_letter(cover_letter, &mut errors);
        }
        finish(errors)?;

        let not_pending =
            || AppError::InvalidState("You can only update pending proposals".to_string());

        let proposal = self.get(id).await?;
        if proposal.freelancer_id != acting_freelancer_id {
            return Err(AppError::Forbidden(
                "You can only update your own proposals".to_string(),
            ));
        }
        if proposal.status.is_terminal() {
            return Err(not_pending());
        }

        let updated = self
            .proposals
            .update_pending(id, &patch)
            .await?
            .ok_or_else(not_pending)?;
        info!("Updated proposal {id}");
        Ok(updated)
    }

    /// Detaches the proposal from its job and deletes it.
    pub async fn withdraw(&self, id: Uuid, acting_freelancer_id: Uuid) -> Result<bool, AppError> {
        let proposal = self.get(id).await?;
        if proposal.freelancer_id != acting_freelancer_id {
            return Err(AppError::Forbidden(
                "You can only withdraw your own proposals".to_string(),
            ));
        }
        if proposal.status.is_terminal() {
            return Err(AppError::InvalidState(
                "You can only withdraw pending proposals".to_string(),
            ));
        }

        self.jobs.remove_proposal(proposal.job_id, id).await?;
        self.proposals.delete(id).await?;
        info!("Withdrew proposal {id} from job {}", proposal.job_id);
        Ok(true)
    }
}
