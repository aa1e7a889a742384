use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::progress::is_paid;
use super::schedule::ScheduleEntry;

/// Default page size for tabular schedule views.
pub const DEFAULT_ROWS_PER_PAGE: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    pub paid: bool,
}

/// One page of a schedule, with each row flagged paid or unpaid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePage {
    pub page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub rows: Vec<ScheduleRow>,
}

pub fn total_pages(schedule_len: usize, rows_per_page: usize) -> usize {
    let rows_per_page = rows_per_page.max(1);
    schedule_len.div_ceil(rows_per_page).max(1)
}

/// Slice page `page` (1-based, clamped into range) out of `schedule`.
pub fn paginate(
    schedule: &[ScheduleEntry],
    page: usize,
    rows_per_page: usize,
    paid_through: Option<NaiveDate>,
) -> SchedulePage {
    let rows_per_page = rows_per_page.max(1);
    let total_pages = total_pages(schedule.len(), rows_per_page);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * rows_per_page;

    let rows = schedule
        .iter()
        .skip(start)
        .take(rows_per_page)
        .map(|entry| ScheduleRow {
            entry: entry.clone(),
            paid: is_paid(entry, paid_through),
        })
        .collect();

    SchedulePage {
        page,
        total_pages,
        rows_per_page,
        rows,
    }
}

/// Page holding `installment_number`, or `None` when it is outside the schedule.
pub fn page_containing(
    installment_number: u32,
    rows_per_page: usize,
    schedule_len: usize,
) -> Option<usize> {
    let n = installment_number as usize;
    if n < 1 || n > schedule_len {
        return None;
    }
    Some(n.div_ceil(rows_per_page.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn schedule(len: u32) -> Vec<ScheduleEntry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (1..=len)
            .map(|n| ScheduleEntry {
                installment_number: n,
                date: start + chrono::Months::new(n - 1),
                effective_annual_rate_pct: Decimal::ZERO,
                emi_paid: Decimal::ONE,
                interest_portion: Decimal::ZERO,
                principal_portion: Decimal::ONE,
                remaining_balance: Decimal::from(len - n),
                rate_changed_here: false,
            })
            .collect()
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let s = schedule(120);
        let page = paginate(&s, 3, 50, None);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.rows[0].entry.installment_number, 101);
    }

    #[test]
    fn test_paginate_clamps_page() {
        let s = schedule(10);
        assert_eq!(paginate(&s, 0, 50, None).page, 1);
        assert_eq!(paginate(&s, 9, 4, None).page, 3);
        assert_eq!(paginate(&[], 1, 50, None).total_pages, 1);
    }

    #[test]
    fn test_paid_flags_follow_date() {
        let s = schedule(5);
        let cutoff = NaiveDate::from_ymd_opt(2024, 2, 1);
        let page = paginate(&s, 1, 50, cutoff);
        let flags: Vec<bool> = page.rows.iter().map(|r| r.paid).collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_page_containing() {
        assert_eq!(page_containing(1, 50, 240), Some(1));
        assert_eq!(page_containing(50, 50, 240), Some(1));
        assert_eq!(page_containing(51, 50, 240), Some(2));
        assert_eq!(page_containing(240, 50, 240), Some(5));
        assert_eq!(page_containing(0, 50, 240), None);
        assert_eq!(page_containing(241, 50, 240), None);
    }
}
