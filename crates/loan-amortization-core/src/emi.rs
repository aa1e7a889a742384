use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{Money, RatePercent};
use crate::AmortizationResult;

/// Months per year under flat monthly compounding.
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage rate into the per-month decimal rate.
pub fn monthly_rate(annual_rate_pct: RatePercent) -> Decimal {
    annual_rate_pct / dec!(100) / MONTHS_PER_YEAR
}

/// Equated Monthly Installment for a fixed-installment annuity loan.
///
/// `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate,
/// or `P / n` for an interest-free loan.
pub fn compute_emi(
    principal: Money,
    annual_rate_pct: RatePercent,
    tenure_months: u32,
) -> AmortizationResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Principal must be greater than zero",
        ));
    }
    if tenure_months == 0 {
        return Err(AmortizationError::invalid(
            "tenure_months",
            "Tenure must be at least one month",
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }

    let n = Decimal::from(tenure_months);
    if annual_rate_pct.is_zero() {
        return Ok(principal / n);
    }

    let r = monthly_rate(annual_rate_pct);
    let factor = (Decimal::ONE + r)
        .checked_powi(i64::from(tenure_months))
        .ok_or_else(|| {
            AmortizationError::invalid(
                "tenure_months",
                format!("Compounding factor overflows for {tenure_months} months at {annual_rate_pct}%"),
            )
        })?;

    // factor > 1 whenever r > 0 and n >= 1, so the denominator is nonzero
    Ok(principal * r * factor / (factor - Decimal::ONE))
}
