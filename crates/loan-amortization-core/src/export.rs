//! CSV export of an amortization schedule.

use std::io::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

use crate::amortization::ScheduleEntry;
use crate::display::format_fixed2;
use crate::{AmortizationError, AmortizationResult};

/// Short date form used when no format is configured (`15/01/2024`).
pub const DEFAULT_EXPORT_DATE_FORMAT: &str = "%d/%m/%Y";

pub const CSV_HEADERS: [&str; 7] = [
    "Payment Number",
    "Date",
    "Interest Rate (%)",
    "EMI (₹)",
    "Interest (₹)",
    "Principal (₹)",
    "Balance (₹)",
];

/// Reject chrono format strings with unknown or malformed specifiers.
/// Formatting a date with one of those fails at write time.
pub fn validate_date_format(date_format: &str) -> AmortizationResult<()> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(AmortizationError::ExportError(format!(
            "invalid date format '{date_format}'"
        )));
    }
    Ok(())
}

/// Write `schedule` as CSV: one header row, then one row per installment
/// with amounts and rates to two decimals.
pub fn write_schedule_csv<W: Write>(
    schedule: &[ScheduleEntry],
    date_format: &str,
    writer: W,
) -> AmortizationResult<()> {
    validate_date_format(date_format)?;
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CSV_HEADERS)?;
    for entry in schedule {
        wtr.write_record([
            entry.installment_number.to_string(),
            entry.date.format(date_format).to_string(),
            format_fixed2(entry.effective_annual_rate_pct),
            format_fixed2(entry.emi_paid),
            format_fixed2(entry.interest_portion),
            format_fixed2(entry.principal_portion),
            format_fixed2(entry.remaining_balance),
        ])?;
    }
    wtr.flush()?;

    tracing::debug!(rows = schedule.len(), "schedule exported as CSV");
    Ok(())
}

/// CSV export into a `String`.
pub fn schedule_to_csv(schedule: &[ScheduleEntry], date_format: &str) -> AmortizationResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_schedule_csv(schedule, date_format, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AmortizationError::ExportError(e.to_string()))
}

/// Suggested download name, e.g. `loan_amortization_2024-01-15.csv`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("loan_amortization_{}.csv", today.format("%Y-%m-%d"))
}
