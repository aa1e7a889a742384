use serde::{Deserialize, Serialize};

use super::params::LoanParameters;
use super::schedule::{termination_of, ScheduleEntry, Termination};
use crate::types::Money;

/// Loan length expressed as whole years plus leftover months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub years: u32,
    pub months: u32,
}

impl Duration {
    pub fn from_months(total: u32) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} years {} months", self.years, self.months)
    }
}

/// Headline figures for a generated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub emi: Money,
    pub total_interest: Money,
    /// Sum of principal portions actually scheduled.
    pub total_principal_repaid: Money,
    /// Principal plus total interest.
    pub total_amount: Money,
    pub total_installments: u32,
    pub duration: Duration,
    /// Balance left after the last installment; nonzero only when the
    /// tenure ran out first.
    pub final_balance: Money,
    pub fully_amortized: bool,
}

pub fn summarize(params: &LoanParameters, emi: Money, schedule: &[ScheduleEntry]) -> LoanSummary {
    let total_interest: Money = schedule.iter().map(|e| e.interest_portion).sum();
    let total_principal_repaid: Money = schedule.iter().map(|e| e.principal_portion).sum();
    let total_installments = schedule.len() as u32;
    let final_balance = schedule
        .last()
        .map(|e| e.remaining_balance)
        .unwrap_or(params.principal);

    LoanSummary {
        emi,
        total_interest,
        total_principal_repaid,
        total_amount: params.principal + total_interest,
        total_installments,
        duration: Duration::from_months(total_installments),
        final_balance,
        fully_amortized: !schedule.is_empty()
            && termination_of(schedule) == Termination::PaidOff,
    }
}
