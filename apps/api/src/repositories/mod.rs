//! Persistence ports for users, jobs and proposals.
//!
//! Managers only see these traits. `PgStore` is the production adapter; tests
//! run against the in-memory adapter in `memory`.

mod jobs;
#[cfg(test)]
pub mod memory;
mod proposals;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobCategory, JobPatch, JobStatus};
use crate::models::proposal::{Acceptance, Proposal, ProposalPatch, ProposalStatus};
use crate::models::user::User;

pub const DUPLICATE_EMAIL: &str = "Email already in use";
pub const DUPLICATE_PROPOSAL: &str = "You have already submitted a proposal for this job";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Newest first.
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks up by the normalized (trimmed, lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Writes every field of an existing user back to the store.
    ///
    /// Fails with `NotFound` when the user no longer exists and with
    /// `Conflict` when the new email belongs to someone else.
    async fn save(&self, user: &User) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Job>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError>;

    async fn find_by_category(&self, category: JobCategory) -> Result<Vec<Job>, AppError>;

    async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, AppError>;

    async fn find_by_status(&self, status: JobStatus) -> Result<Vec<Job>, AppError>;

    async fn insert(&self, job: &Job) -> Result<(), AppError>;

    /// Merges the patch and refreshes `updated_at`. `None` when the job is gone.
    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError>;

    /// Deletes the job together with its proposals.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Set-like append: an id already present is not added twice.
    /// `None` when the job is gone or no longer open.
    async fn add_proposal(&self, job_id: Uuid, proposal_id: Uuid)
        -> Result<Option<Job>, AppError>;

    async fn remove_proposal(
        &self,
        job_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Option<Job>, AppError>;
}

/// Result of the atomic acceptance write. Anything but `Accepted` means
/// nothing was written.
#[derive(Debug, Clone)]
pub enum AcceptOutcome {
    Accepted(Acceptance),
    ProposalMissing,
    ProposalNotPending(ProposalStatus),
    JobMissing,
    JobNotOpen(JobStatus),
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError>;

    /// Newest first by submission time.
    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Proposal>, AppError>;

    /// Newest first by submission time.
    async fn find_by_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<Proposal>, AppError>;

    /// Fails with `Conflict` when the freelancer already has a proposal on
    /// the job.
    async fn insert(&self, proposal: &Proposal) -> Result<(), AppError>;

    /// Merges the patch only while the proposal is still pending.
    /// `None` when the proposal is gone or no longer pending.
    async fn update_pending(
        &self,
        id: Uuid,
        patch: &ProposalPatch,
    ) -> Result<Option<Proposal>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// In one atomic unit: marks the proposal accepted, moves its job from
    /// open to in-progress with the proposal selected, and rejects every other
    /// pending proposal on that job.
    async fn accept(&self, id: Uuid) -> Result<AcceptOutcome, AppError>;
}

/// PostgreSQL-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
