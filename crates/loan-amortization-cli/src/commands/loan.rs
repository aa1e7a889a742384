use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_amortization_core::amortization::params::parse_date;
use loan_amortization_core::amortization::view::{page_containing, paginate, ScheduleRow};
use loan_amortization_core::amortization::{
    build_amortization, AmortizationInput, LoanParameters, ProgressSummary, RateChange,
};
use loan_amortization_core::display::{format_inr, format_rate_pct};
use loan_amortization_core::emi::compute_emi;
use loan_amortization_core::export::{export_file_name, write_schedule_csv};
use loan_amortization_core::types::with_metadata;

use crate::config::CliConfig;
use crate::input;

/// Arguments for a bare EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Tenure in months
    #[arg(long)]
    pub tenure: u32,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Decimal,
}

/// Loan terms, rate changes and paid-through date, from flags or JSON
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Initial annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// First installment date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Rate change as INSTALLMENT:RATE, e.g. 25:9.25 (repeatable, applied in order)
    #[arg(long = "rate-change", value_parser = parse_rate_change)]
    pub rate_changes: Vec<RateChange>,

    /// Installments due on or before this date count as paid (YYYY-MM-DD)
    #[arg(long)]
    pub paid_through: Option<String>,
}

/// Arguments for the schedule view
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Jump to the page holding this installment
    #[arg(long)]
    pub find: Option<u32>,

    /// Rows per page (defaults to the configured value)
    #[arg(long)]
    pub rows_per_page: Option<usize>,

    /// Show every installment instead of a single page
    #[arg(long)]
    pub all: bool,
}

/// Arguments for payment progress
#[derive(Args)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Output file; `-` writes to stdout. Defaults to loan_amortization_<today>.csv
    #[arg(long)]
    pub out: Option<String>,
}

fn parse_rate_change(text: &str) -> Result<RateChange, String> {
    let (number, rate) = text
        .split_once(':')
        .ok_or_else(|| format!("expected INSTALLMENT:RATE, got '{text}'"))?;
    let installment_number: u32 = number
        .trim()
        .parse()
        .map_err(|_| format!("'{number}' is not a valid installment number"))?;
    let annual_rate_pct: Decimal = rate
        .trim()
        .parse()
        .map_err(|_| format!("'{rate}' is not a valid rate"))?;
    Ok(RateChange {
        installment_number,
        annual_rate_pct,
    })
}

fn load_input(args: LoanArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    load_input_with(args, input::stdin::read_stdin)
}

/// `--input` file, else piped JSON from `read_stdin`, else the loan flags.
/// Rate-change flags are appended and `--paid-through` replaces the JSON value.
fn load_input_with(
    args: LoanArgs,
    read_stdin: impl FnOnce() -> Result<Option<AmortizationInput>, Box<dyn std::error::Error>>,
) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    let mut loan_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = read_stdin()? {
        data
    } else {
        let start_date = args
            .start_date
            .as_deref()
            .ok_or("--start-date is required (or provide --input)")?;
        AmortizationInput {
            loan: LoanParameters {
                principal: args.principal
                    .ok_or("--principal is required (or provide --input)")?,
                tenure_months: args.tenure
                    .ok_or("--tenure is required (or provide --input)")?,
                initial_annual_rate_pct: args.rate
                    .ok_or("--rate is required (or provide --input)")?,
                start_date: parse_date("start_date", start_date)?,
            },
            rate_changes: Vec::new(),
            paid_through: None,
        }
    };

    loan_input.rate_changes.extend(args.rate_changes);
    if let Some(ref text) = args.paid_through {
        loan_input.paid_through = Some(parse_date("paid_through", text)?);
    }
    Ok(loan_input)
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let emi = compute_emi(args.principal, args.rate, args.tenure)?;
    let result = json!({
        "emi": emi.round_dp(2),
        "emi_display": format_inr(emi),
    });
    let output = with_metadata(
        "Annuity EMI — P·r·(1+r)^n / ((1+r)^n − 1), monthly compounding",
        &json!({
            "principal": args.principal.to_string(),
            "tenure_months": args.tenure,
            "annual_rate_pct": args.rate.to_string(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_schedule(
    args: ScheduleArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = load_input(args.loan)?;
    let output = build_amortization(&loan_input)?;
    let out = &output.result;

    let rows_per_page = if args.all {
        out.schedule.len().max(1)
    } else {
        args.rows_per_page.unwrap_or(config.rows_per_page)
    };
    let page_number = select_page(args.find, args.page, rows_per_page, out.schedule.len())?;
    let page = paginate(&out.schedule, page_number, rows_per_page, loan_input.paid_through);

    let summary = &out.summary;
    let rows: Vec<Value> = page
        .rows
        .iter()
        .map(|row| display_row(row, &config.date_format))
        .collect();
    let rate_changes: Vec<Value> = out
        .rate_changes
        .iter()
        .map(|c| {
            json!({
                "installment": c.installment_number,
                "rate": format!("{} p.a.", format_rate_pct(c.annual_rate_pct)),
            })
        })
        .collect();

    Ok(json!({
        "result": {
            "emi": format_inr(out.emi),
            "total_interest": format_inr(summary.total_interest),
            "total_amount": format_inr(summary.total_amount),
            "total_installments": summary.total_installments,
            "loan_duration": summary.duration.to_string(),
            "final_balance": format_inr(summary.final_balance),
            "page": format!("Page {} of {}", page.page, page.total_pages),
            "rate_changes": rate_changes,
            "schedule": rows,
        },
        "methodology": output.methodology,
        "warnings": output.warnings,
        "metadata": output.metadata,
    }))
}

/// Page to show: the one holding `find` when given, else `page`.
fn select_page(
    find: Option<u32>,
    page: usize,
    rows_per_page: usize,
    schedule_len: usize,
) -> Result<usize, String> {
    match find {
        Some(n) => page_containing(n, rows_per_page, schedule_len)
            .ok_or_else(|| format!("Payment number must be between 1 and {}", schedule_len)),
        None => Ok(page),
    }
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = load_input(args.loan)?;
    let output = build_amortization(&loan_input)?;
    let progress = &output.result.progress;

    Ok(json!({
        "result": display_progress(progress),
        "methodology": "Installments dated on or before the paid-through date count as paid",
        "warnings": output.warnings,
        "metadata": output.metadata,
    }))
}

pub fn run_export(args: ExportArgs, config: &CliConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = load_input(args.loan)?;
    let output = build_amortization(&loan_input)?;
    let schedule = &output.result.schedule;
    if schedule.is_empty() {
        return Err("No data to export".into());
    }

    let target = args
        .out
        .unwrap_or_else(|| export_file_name(chrono::Local::now().date_naive()));
    if target == "-" {
        write_schedule_csv(schedule, &config.date_format, std::io::stdout().lock())?;
        return Ok(Value::Null);
    }

    let path = PathBuf::from(&target);
    let file = std::fs::File::create(&path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    write_schedule_csv(schedule, &config.date_format, std::io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = schedule.len(), "schedule exported");

    Ok(json!({
        "result": {
            "path": path.display().to_string(),
            "rows": schedule.len(),
        },
        "warnings": output.warnings,
    }))
}

fn display_row(row: &ScheduleRow, date_format: &str) -> Value {
    let e = &row.entry;
    json!({
        "#": e.installment_number,
        "date": e.date.format(date_format).to_string(),
        "rate": format_rate_pct(e.effective_annual_rate_pct),
        "emi": format_inr(e.emi_paid),
        "interest": format_inr(e.interest_portion),
        "principal": format_inr(e.principal_portion),
        "balance": format_inr(e.remaining_balance),
        "rate_change": e.rate_changed_here,
        "paid": row.paid,
    })
}

fn display_progress(progress: &ProgressSummary) -> Value {
    json!({
        "paid_through": progress.paid_through.map(|d| d.to_string()),
        "emis_paid": progress.installments_paid,
        "emis_left": progress.installments_remaining,
        "interest_paid": format_inr(progress.interest_paid),
        "interest_left": format_inr(progress.interest_remaining),
        "principal_paid": format_inr(progress.principal_paid),
        "principal_left": format_inr(progress.principal_remaining),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_change() {
        let c = parse_rate_change("25:9.25").unwrap();
        assert_eq!(c.installment_number, 25);
        assert_eq!(c.annual_rate_pct, Decimal::new(925, 2));
        assert!(parse_rate_change("25").is_err());
        assert!(parse_rate_change("x:9").is_err());
        assert!(parse_rate_change("3:nine").is_err());
    }

    fn loan_args(input: Option<String>) -> LoanArgs {
        LoanArgs {
            input,
            principal: None,
            tenure: None,
            rate: None,
            start_date: None,
            rate_changes: vec![],
            paid_through: None,
        }
    }

    #[test]
    fn test_flags_build_input() {
        let args = LoanArgs {
            principal: Some(Decimal::new(500000, 0)),
            tenure: Some(60),
            rate: Some(Decimal::new(9, 0)),
            start_date: Some("2024-03-10".to_string()),
            rate_changes: vec![parse_rate_change("12:10").unwrap()],
            paid_through: Some("2024-12-31".to_string()),
            ..loan_args(None)
        };
        let loan_input = load_input_with(args, || Ok(None)).unwrap();
        assert_eq!(loan_input.loan.tenure_months, 60);
        assert_eq!(loan_input.rate_changes.len(), 1);
        assert_eq!(loan_input.paid_through.unwrap().to_string(), "2024-12-31");
    }

    #[test]
    fn test_flags_extend_and_override_json_input() {
        let path = std::env::temp_dir().join(format!("amort-load-input-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "principal": "1000000",
                "tenure_months": 240,
                "initial_annual_rate_pct": "8.5",
                "start_date": "2024-01-05",
                "rate_changes": [{ "installment_number": 25, "annual_rate_pct": "9.25" }],
                "paid_through": "2024-06-30"
            }"#,
        )
        .unwrap();

        let args = LoanArgs {
            rate_changes: vec![parse_rate_change("61:7.75").unwrap()],
            paid_through: Some("2025-01-31".to_string()),
            ..loan_args(Some(path.display().to_string()))
        };
        let loan_input = load_input_with(args, || Ok(None));
        std::fs::remove_file(&path).unwrap();
        let loan_input = loan_input.unwrap();

        let numbers: Vec<u32> = loan_input
            .rate_changes
            .iter()
            .map(|c| c.installment_number)
            .collect();
        assert_eq!(numbers, vec![25, 61]);
        assert_eq!(loan_input.paid_through.unwrap().to_string(), "2025-01-31");
        assert_eq!(loan_input.loan.start_date.to_string(), "2024-01-05");
    }

    #[test]
    fn test_bad_paid_through_flag_is_an_error() {
        let args = LoanArgs {
            principal: Some(Decimal::new(100000, 0)),
            tenure: Some(12),
            rate: Some(Decimal::new(10, 0)),
            start_date: Some("2024-01-01".to_string()),
            paid_through: Some("31/12/2024".to_string()),
            ..loan_args(None)
        };
        assert!(load_input_with(args, || Ok(None)).is_err());
    }

    #[test]
    fn test_select_page() {
        assert_eq!(select_page(None, 3, 50, 240).unwrap(), 3);
        assert_eq!(select_page(Some(51), 1, 50, 240).unwrap(), 2);
        assert_eq!(select_page(Some(240), 1, 50, 240).unwrap(), 5);
        assert!(select_page(Some(241), 1, 50, 240).is_err());
        assert!(select_page(Some(0), 1, 50, 240).is_err());
    }
}
