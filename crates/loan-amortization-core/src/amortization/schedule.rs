use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::params::{installment_date, LoanParameters};
use super::rate_changes::RateChange;
use crate::emi::monthly_rate;
use crate::types::{Money, RatePercent};
use crate::{AmortizationError, AmortizationResult};

/// Balances at or below this are treated as fully repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// One installment of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub installment_number: u32,
    pub date: NaiveDate,
    pub effective_annual_rate_pct: RatePercent,
    /// Equals the EMI except possibly on the final installment.
    pub emi_paid: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub remaining_balance: Money,
    pub rate_changed_here: bool,
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Balance reached zero on or before the last installment.
    PaidOff,
    /// Every installment was used and a balance above epsilon remains.
    TenureExhausted,
}

/// Generate the schedule for `params` at a fixed `emi`, applying
/// `rate_changes` in ascending installment order.
///
/// Changes must already be unique per installment. A change beyond the
/// point where the loan pays off is never reached and has no effect.
pub fn generate_schedule(
    params: &LoanParameters,
    emi: Money,
    rate_changes: &[RateChange],
) -> AmortizationResult<Vec<ScheduleEntry>> {
    let mut pending: Vec<RateChange> = rate_changes.to_vec();
    pending.sort_by_key(|c| c.installment_number);
    let mut pending = pending.into_iter().peekable();

    let mut schedule: Vec<ScheduleEntry> = Vec::with_capacity(params.tenure_months as usize);
    let mut balance = params.principal;
    let mut current_rate = params.initial_annual_rate_pct;
    let mut installment: u32 = 1;
    let mut total_amount = params.principal;

    while balance > BALANCE_EPSILON && installment <= params.tenure_months {
        // Changes keyed below the current installment can only occur if the
        // caller skipped deduplication; they are stale and ignored.
        while pending
            .next_if(|c| c.installment_number < installment)
            .is_some()
        {}
        let rate_changed_here = match pending.next_if(|c| c.installment_number == installment) {
            Some(change) => {
                current_rate = change.annual_rate_pct;
                true
            }
            None => false,
        };

        let date = installment_date(params.start_date, installment)?;
        let interest_portion = balance
            .checked_mul(monthly_rate(current_rate))
            .ok_or_else(|| overflow(installment, current_rate))?;
        let principal_portion = emi
            .checked_sub(interest_portion)
            .ok_or_else(|| overflow(installment, current_rate))?;
        // Principal plus accrued interest must stay representable too
        total_amount = total_amount
            .checked_add(interest_portion)
            .ok_or_else(|| overflow(installment, current_rate))?;

        if principal_portion > balance {
            // Final installment overshoots: pay only what is owed.
            schedule.push(ScheduleEntry {
                installment_number: installment,
                date,
                effective_annual_rate_pct: current_rate,
                emi_paid: interest_portion + balance,
                interest_portion,
                principal_portion: balance,
                remaining_balance: Decimal::ZERO,
                rate_changed_here,
            });
            balance = Decimal::ZERO;
            break;
        }

        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| overflow(installment, current_rate))?;
        let remaining_balance = if balance <= BALANCE_EPSILON && balance >= Decimal::ZERO {
            Decimal::ZERO
        } else {
            balance
        };

        schedule.push(ScheduleEntry {
            installment_number: installment,
            date,
            effective_annual_rate_pct: current_rate,
            emi_paid: emi,
            interest_portion,
            principal_portion,
            remaining_balance,
            rate_changed_here,
        });
        installment += 1;
    }

    let termination = termination_of(&schedule);
    tracing::debug!(
        entries = schedule.len(),
        tenure = params.tenure_months,
        ?termination,
        "schedule generated"
    );
    if termination == Termination::TenureExhausted {
        tracing::warn!(
            residual = %balance,
            tenure = params.tenure_months,
            "tenure exhausted before the balance was repaid"
        );
    }

    Ok(schedule)
}

fn overflow(installment: u32, rate: RatePercent) -> AmortizationError {
    AmortizationError::invalid(
        "annual_rate_pct",
        format!(
            "a rate of {rate}% grows the balance beyond the representable range by installment {installment}"
        ),
    )
}

/// Classify how a generated schedule ended.
pub fn termination_of(schedule: &[ScheduleEntry]) -> Termination {
    match schedule.last() {
        Some(last) if last.remaining_balance > BALANCE_EPSILON => Termination::TenureExhausted,
        _ => Termination::PaidOff,
    }
}
