use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::ScheduleEntry;
use crate::types::Money;

/// Paid/unpaid split of a schedule as of a "paid through" date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_through: Option<NaiveDate>,
    pub installments_paid: u32,
    pub installments_remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paid_installment: Option<u32>,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub interest_remaining: Money,
    pub principal_remaining: Money,
}

/// Partition `schedule` into the installments due on or before `paid_through`
/// and the rest.
///
/// The schedule is date-ordered, so the paid set is always a prefix: the scan
/// stops at the first installment dated after `paid_through`. With no date,
/// nothing counts as paid.
pub fn partition_by_date(
    schedule: &[ScheduleEntry],
    paid_through: Option<NaiveDate>,
) -> ProgressSummary {
    let total_interest: Money = schedule.iter().map(|e| e.interest_portion).sum();
    let total_principal: Money = schedule.iter().map(|e| e.principal_portion).sum();

    let mut installments_paid: u32 = 0;
    let mut last_paid_installment = None;
    let mut interest_paid = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;

    if let Some(cutoff) = paid_through {
        for entry in schedule.iter().take_while(|e| e.date <= cutoff) {
            installments_paid += 1;
            last_paid_installment = Some(entry.installment_number);
            interest_paid += entry.interest_portion;
            principal_paid += entry.principal_portion;
        }
    }

    ProgressSummary {
        paid_through,
        installments_paid,
        installments_remaining: schedule.len() as u32 - installments_paid,
        last_paid_installment,
        interest_paid,
        principal_paid,
        interest_remaining: total_interest - interest_paid,
        principal_remaining: total_principal - principal_paid,
    }
}

/// True when `entry` falls on or before `paid_through`.
pub fn is_paid(entry: &ScheduleEntry, paid_through: Option<NaiveDate>) -> bool {
    paid_through.is_some_and(|cutoff| entry.date <= cutoff)
}
