//! Credit records: the unit of account of the registry.
//!
//! A credit is a discrete, uniquely serial-numbered quantity of verified
//! carbon removal. Its `amount` is fixed at mint. Ownership moves via
//! registry transfer; retirement is the one-way exit from circulation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CreditId, EvidenceRef, ProjectId};

/// Lifecycle status of a credit.
///
/// `Active → Retired` is the only transition and it is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditStatus {
    /// In circulation: transferable, listable, auctionable.
    Active,
    /// Permanently removed from circulation and attributed to a
    /// beneficiary. **Irreversible.**
    Retired,
}

impl std::fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Retired => write!(f, "RETIRED"),
        }
    }
}

/// Verifier annotation attached to a credit post-hoc. Latest wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verifier: AccountId,
    /// Verification method (e.g., "remote-sensing", "field-audit").
    pub method: String,
    /// Verifier-assigned certainty, 0..=100.
    pub confidence_score: u8,
    pub evidence_refs: Vec<EvidenceRef>,
    pub methodology: String,
    pub verified_at: DateTime<Utc>,
}

/// Retirement record. Written once, never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retirement {
    /// Why the credit was retired (offset claim, compliance filing, ...).
    pub reason: String,
    /// Who the removal is attributed to.
    pub beneficiary: String,
    pub retired_at: DateTime<Utc>,
}

/// A registry credit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    pub id: CreditId,
    /// Externally assigned serial, unique across the registry for all time.
    pub serial_number: String,
    /// Year the underlying removal occurred.
    pub vintage: u16,
    /// Tonnes of removal. Fixed at mint; never mutated.
    pub amount: u64,
    pub project_id: ProjectId,
    pub methodology: String,
    pub issuer: AccountId,
    pub owner: AccountId,
    pub status: CreditStatus,
    /// Evidence supplied at mint time.
    pub mint_evidence: EvidenceRef,
    pub verification: Option<Verification>,
    pub retirement: Option<Retirement>,
    pub issued_at: DateTime<Utc>,
}

impl Credit {
    /// Whether the credit is still in circulation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CreditStatus::Active
    }

    /// Whether the credit carries a verification annotation.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }
}

impl std::fmt::Display for Credit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Credit[{}] serial={} vintage={} amount={} {}",
            self.id, self.serial_number, self.vintage, self.amount, self.status,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Credit {
    pub fn dummy_active(owner: AccountId, amount: u64) -> Self {
        Self {
            id: CreditId(0),
            serial_number: format!("CC-TEST-{}", uuid::Uuid::now_v7()),
            vintage: 2024,
            amount,
            project_id: ProjectId::new(),
            methodology: "direct-air-capture".to_string(),
            issuer: AccountId::new(),
            owner,
            status: CreditStatus::Active,
            mint_evidence: EvidenceRef::digest(b"dummy evidence"),
            verification: None,
            retirement: None,
            issued_at: Utc::now(),
        }
    }
}
