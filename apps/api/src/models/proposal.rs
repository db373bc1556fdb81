use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::Job;
use crate::models::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Withdrawn => "withdrawn",
        }
    }

    /// Accepted, rejected and withdrawn proposals never change state again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

impl FromStr for ProposalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProposalStatus::Pending),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            "withdrawn" => Ok(ProposalStatus::Withdrawn),
            other => Err(UnknownVariant::new("proposal status", other)),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub freelancer_name: String,
    pub rate: f64,
    /// Days.
    pub delivery_time: i32,
    pub cover_letter: String,
    pub status: ProposalStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPatch {
    pub rate: Option<f64>,
    pub delivery_time: Option<i32>,
    pub cover_letter: Option<String>,
}

impl ProposalPatch {
    pub fn apply(&self, proposal: &mut Proposal) {
        if let Some(rate) = self.rate {
            proposal.rate = rate;
        }
        if let Some(delivery_time) = self.delivery_time {
            proposal.delivery_time = delivery_time;
        }
        if let Some(cover_letter) = &self.cover_letter {
            proposal.cover_letter = cover_letter.clone();
        }
        proposal.updated_at = Utc::now();
    }
}

/// Everything written by a successful acceptance.
#[derive(Debug, Clone)]
pub struct Acceptance {
    pub proposal: Proposal,
    pub job: Job,
    pub rejected: Vec<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProposalRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub freelancer_name: String,
    pub rate: f64,
    pub delivery_time: i32,
    pub cover_letter: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = UnknownVariant;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            job_id: row.job_id,
            freelancer_id: row.freelancer_id,
            freelancer_name: row.freelancer_name,
            rate: row.rate,
            delivery_time: row.delivery_time,
            cover_letter: row.cover_letter,
            status: row.status.parse()?,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Accepted.is_terminal());
        assert!(ProposalStatus::Rejected.is_terminal());
        assert!(ProposalStatus::Withdrawn.is_terminal());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let now = Utc::now();
        let mut proposal = Proposal {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            freelancer_name: "Grace".to_string(),
            rate: 40.0,
            delivery_time: 5,
            cover_letter: "I can do this".to_string(),
            status: ProposalStatus::Pending,
            submitted_at: now,
            updated_at: now,
        };
        let patch = ProposalPatch {
            rate: Some(55.5),
            ..Default::default()
        };
        patch.apply(&mut proposal);
        assert_eq!(proposal.rate, 55.5);
        assert_eq!(proposal.delivery_time, 5);
        assert_eq!(proposal.cover_letter, "I can do this");
        assert!(proposal.updated_at >= now);
    }

    #[test]
    fn test_proposal_serializes_camel_case() {
        let now = Utc::now();
        let proposal = Proposal {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            freelancer_name: "Grace".to_string(),
            rate: 40.0,
            delivery_time: 5,
            cover_letter: "Hi".to_string(),
            status: ProposalStatus::Withdrawn,
            submitted_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["deliveryTime"], 5);
        assert_eq!(json["status"], "withdrawn");
        assert!(json.get("submittedAt").is_some());
    }
}
