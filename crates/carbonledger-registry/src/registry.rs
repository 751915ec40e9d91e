//! The credit registry: the authoritative arena of credit records.
//!
//! Credits live in an arena keyed by [`CreditId`]; secondary indices
//! (by owner, by project) are explicit id sets maintained inside the same
//! operation as the primary record mutation. Every operation validates
//! fully before touching state — a rejected call leaves the registry
//! exactly as it was.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};

use carbonledger_types::{
    AccountId, Credit, CreditId, CreditStatus, EvidenceRef, EventOutbox, LedgerError,
    LifecycleEvent, ProjectId, RegistryConfig, Result, Retirement, Verification,
};

use crate::transfer_log::TransferRecord;

/// Owns credit records, their indices, and the registry event outbox.
///
/// The registry assumes at most one in-flight mutation at a time; the
/// surrounding execution model serializes callers.
pub struct CreditRegistry {
    config: RegistryConfig,
    /// Arena of all credits ever minted.
    credits: HashMap<CreditId, Credit>,
    /// Active credits per owner. Retirement removes the credit here.
    by_owner: HashMap<AccountId, BTreeSet<CreditId>>,
    /// Active credits per project. Retirement removes the credit here.
    by_project: HashMap<ProjectId, BTreeSet<CreditId>>,
    /// Every serial number ever used. Serials are never reusable, even
    /// after retirement.
    serials: HashSet<String>,
    /// Accounts allowed to mint.
    issuers: HashSet<AccountId>,
    /// Accounts allowed to verify.
    verifiers: HashSet<AccountId>,
    /// Append-only record of every ownership movement.
    transfer_log: Vec<TransferRecord>,
    next_id: CreditId,
    /// Sum of all minted amounts, for conservation queries.
    total_minted: u64,
    outbox: EventOutbox,
}

impl CreditRegistry {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            credits: HashMap::new(),
            by_owner: HashMap::new(),
            by_project: HashMap::new(),
            serials: HashSet::new(),
            issuers: HashSet::new(),
            verifiers: HashSet::new(),
            transfer_log: Vec::new(),
            next_id: CreditId(0),
            total_minted: 0,
            outbox: EventOutbox::new(),
        }
    }

    // =====================================================================
    // Authorization
    // =====================================================================

    /// Register an account as an authorized issuer.
    pub fn authorize_issuer(&mut self, issuer: AccountId) {
        self.issuers.insert(issuer);
    }

    /// Register an account as an authorized verifier.
    pub fn authorize_verifier(&mut self, verifier: AccountId) {
        self.verifiers.insert(verifier);
    }

    #[must_use]
    pub fn is_issuer(&self, account: &AccountId) -> bool {
        self.issuers.contains(account)
    }

    #[must_use]
    pub fn is_verifier(&self, account: &AccountId) -> bool {
        self.verifiers.contains(account)
    }

    // =====================================================================
    // Mutations
    // =====================================================================

    /// Mint a new credit to `to`.
    ///
    /// # Errors
    /// - `UnauthorizedIssuer` if `issuer` is not registered
    /// - `DuplicateSerial` if the serial number was ever used
    /// - `InvalidVintage` outside the configured window
    /// - `InvalidAmount` if `amount` is zero
    #[allow(clippy::too_many_arguments)]
    pub fn mint(
        &mut self,
        issuer: AccountId,
        to: AccountId,
        serial_number: &str,
        vintage: u16,
        amount: u64,
        project_id: ProjectId,
        methodology: &str,
        evidence: EvidenceRef,
        now: DateTime<Utc>,
    ) -> Result<CreditId> {
        if !self.issuers.contains(&issuer) {
            return Err(LedgerError::UnauthorizedIssuer);
        }
        if self.serials.contains(serial_number) {
            return Err(LedgerError::DuplicateSerial {
                serial: serial_number.to_string(),
            });
        }
        if !self.config.accepts_vintage(vintage) {
            return Err(LedgerError::InvalidVintage {
                vintage,
                min: self.config.min_vintage,
                max: self.config.max_vintage,
            });
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount {
                reason: "mint amount must be positive".to_string(),
            });
        }
        if to.is_nil() {
            return Err(LedgerError::NullRecipient);
        }

        let id = self.next_id;
        self.next_id = self.next_id.next();

        let credit = Credit {
            id,
            serial_number: serial_number.to_string(),
            vintage,
            amount,
            project_id,
            methodology: methodology.to_string(),
            issuer,
            owner: to,
            status: CreditStatus::Active,
            mint_evidence: evidence,
            verification: None,
            retirement: None,
            issued_at: now,
        };

        self.serials.insert(serial_number.to_string());
        self.by_owner.entry(to).or_default().insert(id);
        self.by_project.entry(project_id).or_default().insert(id);
        self.total_minted += amount;
        self.credits.insert(id, credit);

        tracing::info!(
            credit_id = %id,
            owner = %to,
            serial = serial_number,
            vintage,
            amount,
            "Credit minted"
        );

        self.outbox.push(
            LifecycleEvent::CreditMinted {
                credit_id: id,
                owner: to,
                amount,
                serial_number: serial_number.to_string(),
            },
            now,
        );

        Ok(id)
    }

    /// Move ownership of a credit from `from` to `to`.
    ///
    /// Ownership is re-validated here, at call time — callers (peer
    /// transfers and marketplace settlement alike) never pass a cached
    /// owner through this check.
    ///
    /// # Errors
    /// - `CreditNotFound`
    /// - `NotOwner` if `from` is not the current owner
    /// - `CreditNotActive` if the credit is retired
    /// - `NullRecipient` for the nil account or a self-transfer
    pub fn transfer(
        &mut self,
        credit_id: CreditId,
        from: AccountId,
        to: AccountId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if to.is_nil() || to == from {
            return Err(LedgerError::NullRecipient);
        }
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(LedgerError::CreditNotFound(credit_id))?;
        if credit.owner != from {
            return Err(LedgerError::NotOwner(credit_id));
        }
        if !credit.is_active() {
            return Err(LedgerError::CreditNotActive(credit_id));
        }

        credit.owner = to;
        if let Some(set) = self.by_owner.get_mut(&from) {
            set.remove(&credit_id);
            if set.is_empty() {
                self.by_owner.remove(&from);
            }
        }
        self.by_owner.entry(to).or_default().insert(credit_id);
        self.transfer_log.push(TransferRecord {
            credit_id,
            from,
            to,
            transferred_at: now,
        });

        tracing::info!(credit_id = %credit_id, from = %from, to = %to, "Credit transferred");

        self.outbox.push(
            LifecycleEvent::CreditTransferred {
                credit_id,
                from,
                to,
            },
            now,
        );

        Ok(())
    }

    /// Permanently retire a credit, attributing it to `beneficiary`.
    ///
    /// Irreversible: the credit leaves the active indices and can never
    /// be transferred, listed, or auctioned again.
    ///
    /// # Errors
    /// - `CreditNotFound`, `NotOwner`, `CreditNotActive`
    /// - `MissingReason` if `reason` is empty or blank
    pub fn retire(
        &mut self,
        credit_id: CreditId,
        owner: AccountId,
        reason: &str,
        beneficiary: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(LedgerError::MissingReason);
        }
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(LedgerError::CreditNotFound(credit_id))?;
        if credit.owner != owner {
            return Err(LedgerError::NotOwner(credit_id));
        }
        if !credit.is_active() {
            return Err(LedgerError::CreditNotActive(credit_id));
        }

        credit.status = CreditStatus::Retired;
        credit.retirement = Some(Retirement {
            reason: reason.to_string(),
            beneficiary: beneficiary.to_string(),
            retired_at: now,
        });
        let amount = credit.amount;
        let project_id = credit.project_id;

        if let Some(set) = self.by_owner.get_mut(&owner) {
            set.remove(&credit_id);
            if set.is_empty() {
                self.by_owner.remove(&owner);
            }
        }
        if let Some(set) = self.by_project.get_mut(&project_id) {
            set.remove(&credit_id);
            if set.is_empty() {
                self.by_project.remove(&project_id);
            }
        }

        tracing::info!(
            credit_id = %credit_id,
            owner = %owner,
            amount,
            beneficiary,
            "Credit retired"
        );

        self.outbox.push(
            LifecycleEvent::CreditRetired {
                credit_id,
                owner,
                amount,
                beneficiary: beneficiary.to_string(),
            },
            now,
        );

        Ok(())
    }

    /// Attach (or replace) a verification annotation. Latest wins.
    ///
    /// Verification is an annotation only — it works on retired credits
    /// and never affects ownership.
    ///
    /// # Errors
    /// - `CreditNotFound`
    /// - `UnauthorizedVerifier` if `verifier` is not registered
    /// - `InvalidConfidenceScore` above 100
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &mut self,
        credit_id: CreditId,
        verifier: AccountId,
        method: &str,
        confidence_score: u8,
        evidence_refs: Vec<EvidenceRef>,
        methodology: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.verifiers.contains(&verifier) {
            return Err(LedgerError::UnauthorizedVerifier);
        }
        if confidence_score > 100 {
            return Err(LedgerError::InvalidConfidenceScore(confidence_score));
        }
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(LedgerError::CreditNotFound(credit_id))?;

        credit.verification = Some(Verification {
            verifier,
            method: method.to_string(),
            confidence_score,
            evidence_refs,
            methodology: methodology.to_string(),
            verified_at: now,
        });

        tracing::debug!(
            credit_id = %credit_id,
            verifier = %verifier,
            confidence_score,
            "Credit verified"
        );

        self.outbox.push(
            LifecycleEvent::CreditVerified {
                credit_id,
                verifier,
                confidence_score,
            },
            now,
        );

        Ok(())
    }

    // =====================================================================
    // Queries
    // =====================================================================

    /// Look up a credit by id.
    #[must_use]
    pub fn credit(&self, id: CreditId) -> Option<&Credit> {
        self.credits.get(&id)
    }

    /// Active credits owned by `owner`, in id order.
    #[must_use]
    pub fn credits_by_owner(&self, owner: &AccountId) -> Vec<&Credit> {
        self.by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.credits.get(id))
            .collect()
    }

    /// Active credits originating from `project`, in id order.
    #[must_use]
    pub fn credits_by_project(&self, project: &ProjectId) -> Vec<&Credit> {
        self.by_project
            .get(project)
            .into_iter()
            .flatten()
            .filter_map(|id| self.credits.get(id))
            .collect()
    }

    /// Whether `owner` currently holds `credit_id` in the active index.
    #[must_use]
    pub fn owner_holds(&self, owner: &AccountId, credit_id: CreditId) -> bool {
        self.by_owner
            .get(owner)
            .is_some_and(|set| set.contains(&credit_id))
    }

    /// Total amount across all active credits.
    #[must_use]
    pub fn total_active_amount(&self) -> u64 {
        self.credits
            .values()
            .filter(|c| c.is_active())
            .map(|c| c.amount)
            .sum()
    }

    /// Total amount across all retired credits.
    #[must_use]
    pub fn total_retired_amount(&self) -> u64 {
        self.credits
            .values()
            .filter(|c| !c.is_active())
            .map(|c| c.amount)
            .sum()
    }

    /// Sum of all amounts ever minted. Conservation:
    /// `total_active_amount + total_retired_amount == total_minted_amount`.
    #[must_use]
    pub fn total_minted_amount(&self) -> u64 {
        self.total_minted
    }

    /// Whether a serial number has ever been used.
    #[must_use]
    pub fn serial_exists(&self, serial: &str) -> bool {
        self.serials.contains(serial)
    }

    /// The append-only ownership-movement log.
    #[must_use]
    pub fn transfer_log(&self) -> &[TransferRecord] {
        &self.transfer_log
    }

    /// The registry's event outbox, for external consumers to drain.
    pub fn outbox_mut(&mut self) -> &mut EventOutbox {
        &mut self.outbox
    }

    #[must_use]
    pub fn outbox(&self) -> &EventOutbox {
        &self.outbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CreditRegistry, AccountId, AccountId) {
        let mut registry = CreditRegistry::new(RegistryConfig::default());
        let issuer = AccountId::new();
        let owner = AccountId::new();
        registry.authorize_issuer(issuer);
        (registry, issuer, owner)
    }

    fn mint_one(registry: &mut CreditRegistry, issuer: AccountId, to: AccountId) -> CreditId {
        registry
            .mint(
                issuer,
                to,
                &format!("CC-{}", registry.total_minted_amount()),
                2024,
                100,
                ProjectId::new(),
                "direct-air-capture",
                EvidenceRef::digest(b"batch"),
                Utc::now(),
            )
            .unwrap()
    }

    #[test]
    fn mint_creates_active_indexed_credit() {
        let (mut registry, issuer, owner) = setup();
        let project = ProjectId::new();
        let id = registry
            .mint(
                issuer,
                owner,
                "CC-001",
                2024,
                500,
                project,
                "biochar",
                EvidenceRef::digest(b"e"),
                Utc::now(),
            )
            .unwrap();

        let credit = registry.credit(id).unwrap();
        assert!(credit.is_active());
        assert_eq!(credit.amount, 500);
        assert_eq!(credit.owner, owner);
        assert!(registry.owner_holds(&owner, id));
        assert_eq!(registry.credits_by_project(&project).len(), 1);
        assert_eq!(registry.total_active_amount(), 500);
    }

    #[test]
    fn unauthorized_issuer_rejected() {
        let (mut registry, _, owner) = setup();
        let stranger = AccountId::new();
        let err = registry
            .mint(
                stranger,
                owner,
                "CC-001",
                2024,
                100,
                ProjectId::new(),
                "biochar",
                EvidenceRef::digest(b"e"),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedIssuer));
        assert_eq!(registry.total_minted_amount(), 0);
    }

    #[test]
    fn duplicate_serial_rejected() {
        let (mut registry, issuer, owner) = setup();
        registry
            .mint(
                issuer,
                owner,
                "CC-001",
                2024,
                100,
                ProjectId::new(),
                "biochar",
                EvidenceRef::digest(b"e"),
                Utc::now(),
            )
            .unwrap();
        let err = registry
            .mint(
                issuer,
                owner,
                "CC-001",
                2025,
                200,
                ProjectId::new(),
                "biochar",
                EvidenceRef::digest(b"e2"),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateSerial { .. }));
        // Only the first mint counted.
        assert_eq!(registry.total_minted_amount(), 100);
    }

    #[test]
    fn vintage_window_enforced() {
        let mut registry = CreditRegistry::new(RegistryConfig::new(2020, 2030).unwrap());
        let issuer = AccountId::new();
        registry.authorize_issuer(issuer);
        let err = registry
            .mint(
                issuer,
                AccountId::new(),
                "CC-001",
                2019,
                100,
                ProjectId::new(),
                "biochar",
                EvidenceRef::digest(b"e"),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidVintage { .. }));
    }

    #[test]
    fn zero_amount_rejected() {
        let (mut registry, issuer, owner) = setup();
        let err = registry
            .mint(
                issuer,
                owner,
                "CC-001",
                2024,
                0,
                ProjectId::new(),
                "biochar",
                EvidenceRef::digest(b"e"),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn transfer_moves_between_indices() {
        let (mut registry, issuer, alice) = setup();
        let bob = AccountId::new();
        let id = mint_one(&mut registry, issuer, alice);

        registry.transfer(id, alice, bob, Utc::now()).unwrap();

        assert_eq!(registry.credit(id).unwrap().owner, bob);
        assert!(!registry.owner_holds(&alice, id));
        assert!(registry.owner_holds(&bob, id));
        assert_eq!(registry.transfer_log().len(), 1);
    }

    #[test]
    fn transfer_by_non_owner_rejected() {
        let (mut registry, issuer, alice) = setup();
        let mallory = AccountId::new();
        let id = mint_one(&mut registry, issuer, alice);

        let err = registry
            .transfer(id, mallory, AccountId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotOwner(_)));
        assert_eq!(registry.credit(id).unwrap().owner, alice);
    }

    #[test]
    fn transfer_to_nil_or_self_rejected() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);

        let err = registry
            .transfer(id, alice, AccountId::nil(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::NullRecipient));

        let err = registry.transfer(id, alice, alice, Utc::now()).unwrap_err();
        assert!(matches!(err, LedgerError::NullRecipient));
    }

    #[test]
    fn retire_is_permanent() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);

        registry
            .retire(id, alice, "2025 offset claim", "ACME Corp", Utc::now())
            .unwrap();

        let credit = registry.credit(id).unwrap();
        assert!(!credit.is_active());
        assert_eq!(credit.retirement.as_ref().unwrap().beneficiary, "ACME Corp");
        assert!(!registry.owner_holds(&alice, id));
        assert_eq!(registry.total_active_amount(), 0);
        assert_eq!(registry.total_retired_amount(), 100);

        // Any further mutation fails CreditNotActive.
        let err = registry
            .transfer(id, alice, AccountId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::CreditNotActive(_)));
        let err = registry
            .retire(id, alice, "again", "B", Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::CreditNotActive(_)));
    }

    #[test]
    fn retire_requires_reason() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);
        let err = registry
            .retire(id, alice, "   ", "ACME", Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingReason));
        assert!(registry.credit(id).unwrap().is_active());
    }

    #[test]
    fn verify_overwrites_latest_wins() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);
        let verifier = AccountId::new();
        registry.authorize_verifier(verifier);

        registry
            .verify(id, verifier, "remote-sensing", 80, vec![], "dac-v1", Utc::now())
            .unwrap();
        registry
            .verify(id, verifier, "field-audit", 95, vec![], "dac-v1", Utc::now())
            .unwrap();

        let v = registry.credit(id).unwrap().verification.as_ref().unwrap();
        assert_eq!(v.confidence_score, 95);
        assert_eq!(v.method, "field-audit");
    }

    #[test]
    fn verify_rejects_bad_score_and_stranger() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);
        let verifier = AccountId::new();
        registry.authorize_verifier(verifier);

        let err = registry
            .verify(id, verifier, "m", 101, vec![], "dac", Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfidenceScore(101)));

        let err = registry
            .verify(id, AccountId::new(), "m", 50, vec![], "dac", Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedVerifier));
        assert!(!registry.credit(id).unwrap().is_verified());
    }

    #[test]
    fn supply_conservation_through_lifecycle() {
        let (mut registry, issuer, alice) = setup();
        let a = mint_one(&mut registry, issuer, alice);
        let _b = mint_one(&mut registry, issuer, alice);
        assert_eq!(
            registry.total_active_amount() + registry.total_retired_amount(),
            registry.total_minted_amount()
        );

        registry.retire(a, alice, "claim", "ACME", Utc::now()).unwrap();
        assert_eq!(
            registry.total_active_amount() + registry.total_retired_amount(),
            registry.total_minted_amount()
        );
    }

    #[test]
    fn events_emitted_only_on_commit() {
        let (mut registry, issuer, alice) = setup();
        let id = mint_one(&mut registry, issuer, alice);
        let before = registry.outbox().len();

        // Failed transfer emits nothing.
        let _ = registry
            .transfer(id, AccountId::new(), AccountId::new(), Utc::now())
            .unwrap_err();
        assert_eq!(registry.outbox().len(), before);

        registry
            .transfer(id, alice, AccountId::new(), Utc::now())
            .unwrap();
        assert_eq!(registry.outbox().len(), before + 1);
        let events = registry.outbox_mut().drain();
        assert!(matches!(
            events.last().unwrap().event,
            LifecycleEvent::CreditTransferred { .. }
        ));
    }
}
