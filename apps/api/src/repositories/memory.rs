//! In-memory store implementing every repository trait, for manager and
//! router tests.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobCategory, JobPatch, JobStatus};
use crate::models::proposal::{Acceptance, Proposal, ProposalPatch, ProposalStatus};
use crate::models::user::{normalize_email, User};
use crate::repositories::{
    AcceptOutcome, JobRepository, ProposalRepository, UserRepository, DUPLICATE_EMAIL,
    DUPLICATE_PROPOSAL,
};

/// Thread-safe in-memory store. Records keep insertion order so that
/// newest-first listings are deterministic even when timestamps collide.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    jobs: Vec<Job>,
    proposals: Vec<Proposal>,
}

fn poisoned<T>(err: PoisonError<T>) -> AppError {
    AppError::Internal(anyhow::anyhow!("in-memory store lock poisoned: {err}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, AppError> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, AppError> {
        self.state.write().map_err(poisoned)
    }

    fn jobs_where(&self, keep: impl Fn(&Job) -> bool) -> Result<Vec<Job>, AppError> {
        let state = self.read()?;
        let mut jobs: Vec<Job> = state.jobs.iter().rev().filter(|j| keep(j)).cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    fn proposals_where(&self, keep: impl Fn(&Proposal) -> bool) -> Result<Vec<Proposal>, AppError> {
        let state = self.read()?;
        let mut proposals: Vec<Proposal> = state
            .proposals
            .iter()
            .rev()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        proposals.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(proposals)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let state = self.read()?;
        let mut users: Vec<User> = state.users.iter().rev().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.write()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.write()?;
        if state
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        *stored = user.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.write()?;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Job>, AppError> {
        self.jobs_where(|_| true)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.read()?.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn find_by_category(&self, category: JobCategory) -> Result<Vec<Job>, AppError> {
        self.jobs_where(|j| j.category == category)
    }

    async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, AppError> {
        self.jobs_where(|j| j.client_id == client_id)
    }

    async fn find_by_status(&self, status: JobStatus) -> Result<Vec<Job>, AppError> {
        self.jobs_where(|j| j.status == status)
    }

    async fn insert(&self, job: &Job) -> Result<(), AppError> {
        self.write()?.jobs.push(job.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError> {
        let mut state = self.write()?;
        Ok(state.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            patch.apply(job);
            job.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.write()?;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.id != id);
        let deleted = state.jobs.len() < before;
        if deleted {
            state.proposals.retain(|p| p.job_id != id);
        }
        Ok(deleted)
    }

    async fn add_proposal(
        &self,
        job_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let mut state = self.write()?;
        let open = state
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id && j.status == JobStatus::Open);
        Ok(open.map(|job| {
            if !job.proposals.contains(&proposal_id) {
                job.proposals.push(proposal_id);
            }
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn remove_proposal(
        &self,
        job_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<Option<Job>, AppError> {
        let mut state = self.write()?;
        Ok(state.jobs.iter_mut().find(|j| j.id == job_id).map(|job| {
            job.proposals.retain(|id| *id != proposal_id);
            job.updated_at = Utc::now();
            job.clone()
        }))
    }
}

#[async_trait]
impl ProposalRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposal>, AppError> {
        Ok(self.read()?.proposals.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        self.proposals_where(|p| p.job_id == job_id)
    }

    async fn find_by_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<Proposal>, AppError> {
        self.proposals_where(|p| p.freelancer_id == freelancer_id)
    }

    async fn insert(&self, proposal: &Proposal) -> Result<(), AppError> {
        let mut state = self.write()?;
        if state
            .proposals
            .iter()
            .any(|p| p.job_id == proposal.job_id && p.freelancer_id == proposal.freelancer_id)
        {
            return Err(AppError::Conflict(DUPLICATE_PROPOSAL.to_string()));
        }
        state.proposals.push(proposal.clone());
        Ok(())
    }

    async fn update_pending(
        &self,
        id: Uuid,
        patch: &ProposalPatch,
    ) -> Result<Option<Proposal>, AppError> {
        let mut state = self.write()?;
        Ok(state
            .proposals
            .iter_mut()
            .find(|p| p.id == id && p.status == ProposalStatus::Pending)
            .map(|proposal| {
                patch.apply(proposal);
                proposal.clone()
            }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.write()?;
        let before = state.proposals.len();
        state.proposals.retain(|p| p.id != id);
        Ok(state.proposals.len() < before)
    }

    async fn accept(&self, id: Uuid) -> Result<AcceptOutcome, AppError> {
        let mut state = self.write()?;

        let Some(current) = state.proposals.iter().find(|p| p.id == id).cloned() else {
            return Ok(AcceptOutcome::ProposalMissing);
        };
        if current.status != ProposalStatus::Pending {
            return Ok(AcceptOutcome::ProposalNotPending(current.status));
        }
        let Some(job_status) = state
            .jobs
            .iter()
            .find(|j| j.id == current.job_id)
            .map(|j| j.status)
        else {
            return Ok(AcceptOutcome::JobMissing);
        };
        if job_status != JobStatus::Open {
            return Ok(AcceptOutcome::JobNotOpen(job_status));
        }

        let now = Utc::now();
        let mut accepted = None;
        let mut rejected = Vec::new();
        for proposal in state.proposals.iter_mut() {
            if proposal.id == id {
                proposal.status = ProposalStatus::Accepted;
                proposal.updated_at = now;
                accepted = Some(proposal.clone());
            } else if proposal.job_id == current.job_id
                && proposal.status == ProposalStatus::Pending
            {
                proposal.status = ProposalStatus::Rejected;
                proposal.updated_at = now;
                rejected.push(proposal.id);
            }
        }

        let mut job = None;
        if let Some(stored) = state.jobs.iter_mut().find(|j| j.id == current.job_id) {
            stored.status = JobStatus::InProgress;
            stored.selected_proposal = Some(id);
            stored.updated_at = now;
            job = Some(stored.clone());
        }

        match (accepted, job) {
            (Some(proposal), Some(job)) => Ok(AcceptOutcome::Accepted(Acceptance {
                proposal,
                job,
                rejected,
            })),
            _ => Err(AppError::Internal(anyhow::anyhow!(
                "in-memory acceptance lost track of proposal {id}"
            ))),
        }
    }
}
