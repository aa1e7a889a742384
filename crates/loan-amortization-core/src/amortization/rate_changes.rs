use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::types::RatePercent;
use crate::AmortizationResult;

/// A new annual rate taking effect from a given installment onwards.
/// The EMI is never recomputed; only the interest/principal split moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChange {
    pub installment_number: u32,
    pub annual_rate_pct: RatePercent,
}

/// Rate changes keyed by installment number. At most one change per
/// installment; iteration order is established on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateChangeRegistry {
    changes: HashMap<u32, RatePercent>,
}

impl RateChangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the change at `change.installment_number`.
    ///
    /// `schedule_len` is the length of the schedule currently in force; the
    /// installment must fall inside it. Returns the rate that was replaced.
    pub fn upsert(
        &mut self,
        change: RateChange,
        schedule_len: usize,
    ) -> AmortizationResult<Option<RatePercent>> {
        validate_change(&change, schedule_len)?;
        let previous = self
            .changes
            .insert(change.installment_number, change.annual_rate_pct);
        tracing::debug!(
            installment = change.installment_number,
            rate = %change.annual_rate_pct,
            replaced = previous.is_some(),
            "rate change registered"
        );
        Ok(previous)
    }

    /// Drop the change at `installment_number`, returning its rate if present.
    pub fn remove(&mut self, installment_number: u32) -> Option<RatePercent> {
        let removed = self.changes.remove(&installment_number);
        tracing::debug!(
            installment = installment_number,
            removed = removed.is_some(),
            "rate change removed"
        );
        removed
    }

    /// All changes, ascending by installment number.
    pub fn list(&self) -> Vec<RateChange> {
        let mut out: Vec<RateChange> = self
            .changes
            .iter()
            .map(|(&installment_number, &annual_rate_pct)| RateChange {
                installment_number,
                annual_rate_pct,
            })
            .collect();
        out.sort_by_key(|c| c.installment_number);
        out
    }

    pub fn get(&self, installment_number: u32) -> Option<RatePercent> {
        self.changes.get(&installment_number).copied()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

fn validate_change(change: &RateChange, schedule_len: usize) -> AmortizationResult<()> {
    let n = change.installment_number as usize;
    if n < 1 || n > schedule_len {
        return Err(AmortizationError::invalid(
            "installment_number",
            format!("Payment number must be between 1 and {schedule_len}"),
        ));
    }
    if change.annual_rate_pct < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}
