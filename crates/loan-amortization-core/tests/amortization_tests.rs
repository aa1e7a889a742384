use chrono::NaiveDate;
use loan_amortization_core::amortization::progress::partition_by_date;
use loan_amortization_core::amortization::schedule::generate_schedule;
use loan_amortization_core::amortization::{
    LoanParameters, LoanSession, RateChange, ScheduleEntry, BALANCE_EPSILON,
};
use loan_amortization_core::emi::compute_emi;
use loan_amortization_core::AmortizationError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 10 lakh over 20 years at 8.5%
fn home_loan() -> LoanParameters {
    LoanParameters {
        principal: dec!(1000000),
        tenure_months: 240,
        initial_annual_rate_pct: dec!(8.5),
        start_date: date(2024, 1, 5),
    }
}

fn assert_entry_invariants(schedule: &[ScheduleEntry]) {
    for e in schedule {
        assert!(
            (e.interest_portion + e.principal_portion - e.emi_paid).abs() < dec!(0.0000001),
            "installment {} does not split its payment",
            e.installment_number
        );
    }
    for pair in schedule.windows(2) {
        assert_eq!(pair[1].installment_number, pair[0].installment_number + 1);
        assert!(pair[1].date > pair[0].date);
    }
}

// ===========================================================================
// EMI
// ===========================================================================

#[test]
fn test_interest_free_emi_is_exact() {
    assert_eq!(compute_emi(dec!(120000), Decimal::ZERO, 12).unwrap(), dec!(10000));
}

#[test]
fn test_home_loan_emi() {
    let emi = compute_emi(dec!(1000000), dec!(8.5), 240).unwrap();
    assert!((emi - dec!(8678.23)).abs() < dec!(0.01));
}

// ===========================================================================
// Schedule generation
// ===========================================================================

#[test]
fn test_schedule_repays_principal_exactly() {
    let session = LoanSession::new(home_loan()).unwrap();
    let schedule = session.schedule();

    assert_eq!(schedule.len(), 240);
    assert_entry_invariants(schedule);

    let principal_sum: Decimal = schedule.iter().map(|e| e.principal_portion).sum();
    assert!((principal_sum - dec!(1000000)).abs() < BALANCE_EPSILON);
    assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);

    for pair in schedule.windows(2) {
        assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
    }
}

#[test]
fn test_balance_tracks_principal_portions() {
    let session = LoanSession::new(home_loan()).unwrap();
    let schedule = session.schedule();
    let mut balance = dec!(1000000);
    for e in &schedule[..schedule.len() - 1] {
        balance -= e.principal_portion;
        assert_eq!(e.remaining_balance, balance);
    }
}

#[test]
fn test_negative_amortization_stops_at_tenure() {
    let params = LoanParameters {
        principal: dec!(100000),
        tenure_months: 12,
        initial_annual_rate_pct: dec!(6),
        start_date: date(2024, 1, 1),
    };
    let mut session = LoanSession::new(params).unwrap();
    let emi = session.emi();
    session.upsert_rate_change(3, dec!(200)).unwrap();

    let schedule = session.schedule();
    assert_eq!(schedule.len(), 12);
    assert_eq!(session.emi(), emi);
    assert!(schedule.last().unwrap().remaining_balance > BALANCE_EPSILON);
    assert!(!session.summary().fully_amortized);
    assert_entry_invariants(schedule);
}

#[test]
fn test_runaway_rate_rise_is_rejected_and_session_kept() {
    let params = LoanParameters {
        principal: dec!(1000000),
        tenure_months: 360,
        initial_annual_rate_pct: dec!(8.5),
        start_date: date(2024, 1, 1),
    };
    let mut session = LoanSession::new(params).unwrap();
    let before = session.clone();

    let result = session.upsert_rate_change(2, dec!(200));
    assert!(matches!(result, Err(AmortizationError::InvalidInput { .. })));
    assert_eq!(session.schedule(), before.schedule());
    assert!(session.rate_changes().is_empty());
}

#[test]
fn test_rate_change_preserves_emi_and_resplits_later_entries() {
    let base = LoanSession::new(home_loan()).unwrap();
    let mut changed = base.clone();
    changed.upsert_rate_change(25, dec!(7.5)).unwrap();

    assert_eq!(changed.emi(), base.emi());
    assert_entry_invariants(changed.schedule());

    for (before, after) in base.schedule().iter().zip(changed.schedule()).take(24) {
        assert_eq!(before, after);
    }
    for (before, after) in base.schedule().iter().zip(changed.schedule()).skip(24) {
        assert_ne!(before.interest_portion, after.interest_portion);
        assert_ne!(before.principal_portion, after.principal_portion);
    }

    // Cheaper money at the same EMI finishes early with a short last payment
    let schedule = changed.schedule();
    assert!(schedule.len() < 240);
    let last = schedule.last().unwrap();
    assert!(last.emi_paid < changed.emi());
    assert_eq!(last.remaining_balance, Decimal::ZERO);
}

#[test]
fn test_add_then_remove_restores_schedule() {
    let base = LoanSession::new(home_loan()).unwrap();
    let mut session = base.clone();

    session.upsert_rate_change(60, dec!(10.25)).unwrap();
    assert_ne!(session.schedule(), base.schedule());

    assert_eq!(session.remove_rate_change(60).unwrap(), Some(dec!(10.25)));
    assert_eq!(session.schedule(), base.schedule());
    assert!(session.rate_changes().is_empty());
}

#[test]
fn test_changes_are_applied_in_installment_order() {
    let params = home_loan();
    let emi = compute_emi(params.principal, params.initial_annual_rate_pct, params.tenure_months)
        .unwrap();
    let forward = [
        RateChange { installment_number: 12, annual_rate_pct: dec!(9) },
        RateChange { installment_number: 48, annual_rate_pct: dec!(8) },
    ];
    let reversed = [forward[1], forward[0]];

    let a = generate_schedule(&params, emi, &forward).unwrap();
    let b = generate_schedule(&params, emi, &reversed).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[11].effective_annual_rate_pct, dec!(9));
    assert_eq!(a[47].effective_annual_rate_pct, dec!(8));
    assert_eq!(a[46].effective_annual_rate_pct, dec!(9));
}

// ===========================================================================
// Rate-change registry through the session
// ===========================================================================

#[test]
fn test_duplicate_upsert_replaces() {
    let mut session = LoanSession::new(home_loan()).unwrap();
    session.upsert_rate_change(36, dec!(9)).unwrap();
    let previous = session.upsert_rate_change(36, dec!(9.75)).unwrap();

    assert_eq!(previous, Some(dec!(9)));
    assert_eq!(
        session.rate_changes(),
        vec![RateChange { installment_number: 36, annual_rate_pct: dec!(9.75) }]
    );
    assert_eq!(session.schedule()[35].effective_annual_rate_pct, dec!(9.75));
}

#[test]
fn test_installment_bounds_follow_current_schedule() {
    let mut session = LoanSession::new(home_loan()).unwrap();
    let len = session.schedule().len() as u32;

    assert!(matches!(
        session.upsert_rate_change(len + 1, dec!(8)),
        Err(AmortizationError::InvalidInput { .. })
    ));
    assert!(matches!(
        session.upsert_rate_change(0, dec!(8)),
        Err(AmortizationError::InvalidInput { .. })
    ));
    assert!(session.upsert_rate_change(len, dec!(8)).is_ok());

    // A rate cut shortens the schedule, and with it the valid range
    session.upsert_rate_change(2, dec!(5)).unwrap();
    let shorter = session.schedule().len() as u32;
    assert!(shorter < len);
    assert!(session.upsert_rate_change(shorter + 1, dec!(8)).is_err());
}

// ===========================================================================
// Progress
// ===========================================================================

#[test]
fn test_progress_before_first_installment() {
    let session = LoanSession::new(home_loan()).unwrap();
    let summary = session.summary();
    let p = session.progress(Some(date(2024, 1, 4)));

    assert_eq!(p.installments_paid, 0);
    assert_eq!(p.installments_remaining, 240);
    assert_eq!(p.interest_paid, Decimal::ZERO);
    assert_eq!(p.principal_paid, Decimal::ZERO);
    assert_eq!(p.interest_remaining, summary.total_interest);
    assert_eq!(p.principal_remaining, summary.total_principal_repaid);
}

#[test]
fn test_progress_after_last_installment() {
    let session = LoanSession::new(home_loan()).unwrap();
    let p = session.progress(Some(date(2050, 1, 1)));

    assert_eq!(p.installments_paid, 240);
    assert_eq!(p.installments_remaining, 0);
    assert_eq!(p.last_paid_installment, Some(240));
    assert_eq!(p.interest_remaining, Decimal::ZERO);
    assert_eq!(p.principal_remaining, Decimal::ZERO);
}

#[test]
fn test_progress_mid_loan() {
    let session = LoanSession::new(home_loan()).unwrap();
    // 2024-01-05 .. 2025-12-05 inclusive
    let p = partition_by_date(session.schedule(), Some(date(2025, 12, 31)));
    assert_eq!(p.installments_paid, 24);
    assert_eq!(p.last_paid_installment, Some(24));
    assert!(p.interest_paid > p.principal_paid);
    let total = session.summary().total_interest;
    assert!((p.interest_paid + p.interest_remaining - total).abs() < dec!(0.0000001));
}

// ===========================================================================
// Summary
// ===========================================================================

#[test]
fn test_summary_totals() {
    let session = LoanSession::new(home_loan()).unwrap();
    let s = session.summary();

    assert_eq!(s.total_installments, 240);
    assert_eq!(s.duration.years, 20);
    assert_eq!(s.duration.months, 0);
    assert_eq!(s.total_amount, dec!(1000000) + s.total_interest);
    // 240 * EMI - principal, give or take the final-payment rounding
    let expected_interest = session.emi() * dec!(240) - dec!(1000000);
    assert!((s.total_interest - expected_interest).abs() < dec!(0.01));
    assert!(s.fully_amortized);
}
