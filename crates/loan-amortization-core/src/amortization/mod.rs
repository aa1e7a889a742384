//! Fixed-EMI loan amortization under a piecewise-constant rate timeline.
//!
//! The EMI is derived once from the loan terms. Rate changes re-split each
//! later installment into interest and principal without touching the EMI,
//! so a rate cut shortens the loan and a rate rise can leave a residual
//! balance when the tenure runs out. All math uses `rust_decimal::Decimal`.

pub mod params;
pub mod progress;
pub mod rate_changes;
pub mod schedule;
pub mod session;
pub mod summary;
pub mod view;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money};
use crate::AmortizationResult;

pub use params::LoanParameters;
pub use progress::ProgressSummary;
pub use rate_changes::{RateChange, RateChangeRegistry};
pub use schedule::{ScheduleEntry, Termination, BALANCE_EPSILON};
pub use session::LoanSession;
pub use summary::{Duration, LoanSummary};

/// Input for a one-shot amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub loan: LoanParameters,
    /// Rate changes in the order they were requested. Each is validated
    /// against the schedule in force when it is applied; a later change for
    /// the same installment replaces an earlier one.
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_through: Option<NaiveDate>,
}

/// Output of a one-shot amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub emi: Money,
    pub summary: LoanSummary,
    pub progress: ProgressSummary,
    /// Registered changes, ascending by installment number.
    pub rate_changes: Vec<RateChange>,
    pub schedule: Vec<ScheduleEntry>,
}

/// Build the full schedule, summary and progress for `input`.
pub fn build_amortization(
    input: &AmortizationInput,
) -> AmortizationResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let session = replay(input)?;
    let schedule = session.schedule();
    let summary = session.summary();

    if !summary.fully_amortized {
        warnings.push(format!(
            "EMI does not cover the loan within {} months; {} remains outstanding after the last installment",
            input.loan.tenure_months,
            summary.final_balance.round_dp(2)
        ));
    }
    let last_installment = schedule.last().map_or(0, |e| e.installment_number);
    for change in session.rate_changes() {
        if change.installment_number > last_installment {
            warnings.push(format!(
                "Rate change at installment {} is beyond the final installment {} and was not applied",
                change.installment_number, last_installment
            ));
        }
    }

    let output = AmortizationOutput {
        emi: session.emi(),
        summary,
        progress: session.progress(input.paid_through),
        rate_changes: session.rate_changes(),
        schedule: schedule.to_vec(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-EMI amortization — annuity EMI, monthly compounding, EMI held across rate changes",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "tenure_months": input.loan.tenure_months,
            "initial_annual_rate_pct": input.loan.initial_annual_rate_pct.to_string(),
            "start_date": input.loan.start_date.to_string(),
            "rate_changes": input.rate_changes.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Apply the input's rate changes one at a time, as a user would.
pub fn replay(input: &AmortizationInput) -> AmortizationResult<LoanSession> {
    let mut session = LoanSession::new(input.loan.clone())?;
    for change in &input.rate_changes {
        session.upsert_rate_change(change.installment_number, change.annual_rate_pct)?;
    }
    Ok(session)
}
