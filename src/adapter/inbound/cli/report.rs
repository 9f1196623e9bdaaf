//! Rendering of run summaries and bulk outcomes.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output::{self, Tone};
use crate::application::orchestrator::BulkOutcome;
use crate::domain::summary::{EntryStatus, RunSummary, SeedStatus, SummaryEntry};

/// How a command finished, mapped to the process exit code by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The command ran to the end but some steps failed.
    CompletedWithFailures,
}

impl Outcome {
    #[must_use]
    pub const fn from_failures(has_failures: bool) -> Self {
        if has_failures {
            Self::CompletedWithFailures
        } else {
            Self::Completed
        }
    }

    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::CompletedWithFailures => 2,
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Seeding")]
    seeding: String,
}

#[derive(Tabled)]
struct BulkRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Result")]
    result: String,
}

fn summary_row(entry: &SummaryEntry) -> SummaryRow {
    let (status, address) = match &entry.status {
        EntryStatus::Created { address } => {
            (output::tint("created", Tone::Good), address.to_string())
        }
        EntryStatus::Reused { address } => {
            (output::tint("reused", Tone::Faint), address.to_string())
        }
        EntryStatus::Failed { kind, reason } => {
            (output::tint(format!("{kind}: {reason}"), Tone::Bad), String::new())
        }
    };
    let seeding = match &entry.seeding {
        None => String::new(),
        Some(SeedStatus::Skipped) => output::tint("skipped", Tone::Faint),
        Some(SeedStatus::Seeded { amount }) => {
            output::tint(format!("seeded {amount}"), Tone::Good)
        }
        Some(SeedStatus::Failed { kind, reason }) => {
            output::tint(format!("{kind}: {reason}"), Tone::Bad)
        }
    };
    SummaryRow {
        subject: entry.subject.clone(),
        status,
        address,
        seeding,
    }
}

/// Print a run summary as a table, or as JSON.
pub fn summary(command: &str, summary: &RunSummary) -> Outcome {
    let outcome = Outcome::from_failures(summary.has_failures());

    if output::is_json() {
        output::result(json!({
            "command": command,
            "created": summary.created_count(),
            "reused": summary.reused_count(),
            "failed": summary.failures().count(),
            "summary": summary,
        }));
        return outcome;
    }

    output::section("Summary");
    if summary.is_empty() {
        output::note("Nothing to do");
        return outcome;
    }

    let rows: Vec<_> = summary.entries().iter().map(summary_row).collect();
    output::table(&Table::new(rows).to_string());
    output::field("Created", summary.created_count());
    output::field("Reused", summary.reused_count());

    let failed = summary.failures().count();
    if failed > 0 {
        output::warning(&format!("{failed} step(s) failed"));
    } else {
        output::success("All steps completed");
    }
    outcome
}

/// Print a bulk outcome as a table, or as JSON.
pub fn bulk(command: &str, outcome: &BulkOutcome) -> Outcome {
    let result = Outcome::from_failures(outcome.has_failures());

    if output::is_json() {
        output::result(json!({
            "command": command,
            "outcome": outcome,
        }));
        return result;
    }

    output::section("Result");
    let mut rows = Vec::new();
    rows.extend(outcome.succeeded.iter().map(|a| BulkRow {
        address: a.to_string(),
        result: output::tint("done", Tone::Good),
    }));
    rows.extend(outcome.skipped.iter().map(|a| BulkRow {
        address: a.to_string(),
        result: output::tint("skipped", Tone::Faint),
    }));
    rows.extend(outcome.failed.iter().map(|f| BulkRow {
        address: f.address.to_string(),
        result: output::tint(format!("{}: {}", f.kind, f.reason), Tone::Bad),
    }));

    if rows.is_empty() {
        output::note("Nothing to do");
        return result;
    }
    output::table(&Table::new(rows).to_string());

    if outcome.has_failures() {
        output::warning(&format!("{} address(es) failed", outcome.failed.len()));
    } else {
        output::success(&format!(
            "{} done, {} skipped",
            outcome.succeeded.len(),
            outcome.skipped.len()
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use crate::application::orchestrator::BulkFailure;
    use crate::domain::summary::FailureKind;

    #[test]
    fn failures_exit_with_two() {
        assert_eq!(Outcome::from_failures(true).exit_code(), 2);
        assert_eq!(Outcome::from_failures(false).exit_code(), 0);
    }

    #[test]
    fn bulk_outcome_reports_failures() {
        let outcome = BulkOutcome {
            succeeded: vec![Address::with_last_byte(1)],
            skipped: vec![],
            failed: vec![BulkFailure {
                address: Address::with_last_byte(2),
                kind: FailureKind::TransientRpcFailure,
                reason: "timeout".into(),
            }],
        };
        assert_eq!(bulk("registry.register-all", &outcome), Outcome::CompletedWithFailures);
    }
}
