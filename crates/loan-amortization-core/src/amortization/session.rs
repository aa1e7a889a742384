use chrono::NaiveDate;

use super::params::LoanParameters;
use super::progress::{partition_by_date, ProgressSummary};
use super::rate_changes::{RateChange, RateChangeRegistry};
use super::schedule::{generate_schedule, ScheduleEntry};
use super::summary::{summarize, LoanSummary};
use crate::emi::compute_emi;
use crate::types::{Money, RatePercent};
use crate::AmortizationResult;

/// The caller-held state of one loan: its terms, the EMI derived from them,
/// the registered rate changes and the schedule currently in force.
///
/// Every mutation validates first and builds the replacement schedule in
/// full before committing, so a failed call leaves the session untouched and
/// readers never see a partially built schedule.
#[derive(Debug, Clone)]
pub struct LoanSession {
    params: LoanParameters,
    emi: Money,
    rate_changes: RateChangeRegistry,
    schedule: Vec<ScheduleEntry>,
}

impl LoanSession {
    pub fn new(params: LoanParameters) -> AmortizationResult<Self> {
        params.validate()?;
        let emi = compute_emi(
            params.principal,
            params.initial_annual_rate_pct,
            params.tenure_months,
        )?;
        let schedule = generate_schedule(&params, emi, &[])?;
        tracing::debug!(emi = %emi, entries = schedule.len(), "loan session created");
        Ok(Self {
            params,
            emi,
            rate_changes: RateChangeRegistry::new(),
            schedule,
        })
    }

    /// Replace the loan terms. Discards every rate change and recomputes the
    /// EMI and schedule from scratch.
    pub fn reset(&mut self, params: LoanParameters) -> AmortizationResult<()> {
        *self = Self::new(params)?;
        Ok(())
    }

    /// Register (or replace) a rate change and regenerate at the same EMI.
    /// Returns the rate previously registered for that installment, if any.
    pub fn upsert_rate_change(
        &mut self,
        installment_number: u32,
        annual_rate_pct: RatePercent,
    ) -> AmortizationResult<Option<RatePercent>> {
        let mut registry = self.rate_changes.clone();
        let previous = registry.upsert(
            RateChange {
                installment_number,
                annual_rate_pct,
            },
            self.schedule.len(),
        )?;
        self.commit(registry)?;
        Ok(previous)
    }

    /// Drop the rate change at `installment_number` and regenerate.
    pub fn remove_rate_change(
        &mut self,
        installment_number: u32,
    ) -> AmortizationResult<Option<RatePercent>> {
        let mut registry = self.rate_changes.clone();
        let removed = registry.remove(installment_number);
        self.commit(registry)?;
        Ok(removed)
    }

    fn commit(&mut self, registry: RateChangeRegistry) -> AmortizationResult<()> {
        let schedule = generate_schedule(&self.params, self.emi, &registry.list())?;
        self.rate_changes = registry;
        self.schedule = schedule;
        Ok(())
    }

    pub fn params(&self) -> &LoanParameters {
        &self.params
    }

    pub fn emi(&self) -> Money {
        self.emi
    }

    /// Registered rate changes, ascending by installment number.
    pub fn rate_changes(&self) -> Vec<RateChange> {
        self.rate_changes.list()
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    pub fn summary(&self) -> LoanSummary {
        summarize(&self.params, self.emi, &self.schedule)
    }

    pub fn progress(&self, paid_through: Option<NaiveDate>) -> ProgressSummary {
        partition_by_date(&self.schedule, paid_through)
    }
}
