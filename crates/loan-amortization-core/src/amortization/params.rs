use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::types::{Money, RatePercent};
use crate::AmortizationResult;

/// ISO-8601 calendar date format accepted on every input surface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Caller-supplied loan terms. Immutable once a schedule has been generated;
/// changing any field means starting a fresh session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    /// Maximum number of installments (the requested tenure).
    pub tenure_months: u32,
    /// Annual rate in percent; zero means interest-free amortization.
    pub initial_annual_rate_pct: RatePercent,
    /// Date of the first installment.
    pub start_date: NaiveDate,
}

impl LoanParameters {
    pub fn validate(&self) -> AmortizationResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(AmortizationError::invalid(
                "principal",
                "Principal must be greater than zero",
            ));
        }
        if self.tenure_months == 0 {
            return Err(AmortizationError::invalid(
                "tenure_months",
                "Tenure must be at least one month",
            ));
        }
        if self.initial_annual_rate_pct < Decimal::ZERO {
            return Err(AmortizationError::invalid(
                "initial_annual_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        // The last possible installment date must be representable.
        installment_date(self.start_date, self.tenure_months)?;
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date, naming `field` in the error.
pub fn parse_date(field: &str, text: &str) -> AmortizationResult<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmortizationError::invalid(field, "A date is required"));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
        AmortizationError::invalid(field, format!("'{trimmed}' is not a valid YYYY-MM-DD date ({e})"))
    })
}

/// Due date of installment `number` (1-based): the start date advanced by
/// `number - 1` calendar months, clamped to the end of shorter months.
pub fn installment_date(start: NaiveDate, number: u32) -> AmortizationResult<NaiveDate> {
    start
        .checked_add_months(Months::new(number.saturating_sub(1)))
        .ok_or_else(|| {
            AmortizationError::invalid(
                "start_date",
                format!("Installment {number} falls outside the supported calendar range"),
            )
        })
}
