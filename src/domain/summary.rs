//! Run summaries reported after a provisioning command.
//!
//! Every (market, tier) pair and every fundraising round yields one
//! [`SummaryEntry`]. Failures carry a [`FailureKind`] so operators can tell
//! a declined prompt from an exhausted RPC retry at a glance.

use std::fmt;

use alloy_primitives::Address;
use serde::Serialize;

/// Classification of a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Invalid parameters, refused before any transaction.
    Configuration,
    /// A required ledger singleton is missing.
    NotInitialized,
    /// The operator declined the confirmation prompt.
    UserRejected,
    /// Not enough settlement token to seed liquidity.
    InsufficientBalance,
    /// Remote call failed after the retry budget was spent.
    TransientRpcFailure,
    /// Explorer verification failed.
    VerificationFailure,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::NotInitialized => "not initialized",
            Self::UserRejected => "user rejected",
            Self::InsufficientBalance => "insufficient balance",
            Self::TransientRpcFailure => "rpc failure",
            Self::VerificationFailure => "verification failure",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Outcome of provisioning one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Created { address: Address },
    Reused { address: Address },
    Failed { kind: FailureKind, reason: String },
}

impl EntryStatus {
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        match self {
            Self::Created { address } | Self::Reused { address } => Some(*address),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of the optional liquidity seeding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedStatus {
    Seeded { amount: String },
    /// Nothing configured, or the instance already holds liquidity.
    Skipped,
    Failed { kind: FailureKind, reason: String },
}

/// One row of a run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    /// Human label, e.g. `Junior Pool @ 0x12..` or `BP for 0x34..`.
    pub subject: String,
    /// Market the subject belongs to, when there is one.
    pub market: Option<Address>,
    #[serde(flatten)]
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeding: Option<SeedStatus>,
}

/// Ordered collection of summary entries for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    entries: Vec<SummaryEntry>,
}

impl RunSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SummaryEntry) {
        self.entries.push(entry);
    }

    /// Record a failure for `subject`.
    pub fn failed(
        &mut self,
        subject: impl Into<String>,
        market: Option<Address>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) {
        self.push(SummaryEntry {
            subject: subject.into(),
            market,
            status: EntryStatus::Failed {
                kind,
                reason: reason.into(),
            },
            seeding: None,
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Entries whose provisioning failed.
    pub fn failures(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.iter().filter(|e| e.status.is_failure())
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    #[must_use]
    pub fn created_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Created { .. }))
            .count()
    }

    #[must_use]
    pub fn reused_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Reused { .. }))
            .count()
    }

    pub fn extend(&mut self, other: RunSummary) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
