use napi::Result as NapiResult;
use napi_derive::napi;

use loan_amortization_core::amortization::{self, AmortizationInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// EMI
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct EmiBindingInput {
    principal: rust_decimal::Decimal,
    annual_rate_pct: rust_decimal::Decimal,
    tenure_months: u32,
}

#[napi]
pub fn compute_emi(input_json: String) -> NapiResult<String> {
    let input: EmiBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let emi = loan_amortization_core::emi::compute_emi(
        input.principal,
        input.annual_rate_pct,
        input.tenure_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "emi": emi })).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule, summary and progress
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::build_amortization(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct PageBindingInput {
    #[serde(flatten)]
    input: AmortizationInput,
    #[serde(default = "first_page")]
    page: usize,
    #[serde(default)]
    find_installment: Option<u32>,
    #[serde(default = "default_rows_per_page")]
    rows_per_page: usize,
}

fn first_page() -> usize {
    1
}

fn default_rows_per_page() -> usize {
    amortization::view::DEFAULT_ROWS_PER_PAGE
}

#[napi]
pub fn schedule_page(input_json: String) -> NapiResult<String> {
    let binding_input: PageBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let session = amortization::replay(&binding_input.input).map_err(to_napi_error)?;
    let schedule = session.schedule();

    let page = match binding_input.find_installment {
        Some(n) => amortization::view::page_containing(n, binding_input.rows_per_page, schedule.len())
            .ok_or_else(|| {
                to_napi_error(format!("Payment number must be between 1 and {}", schedule.len()))
            })?,
        None => binding_input.page,
    };
    let view = amortization::view::paginate(
        schedule,
        page,
        binding_input.rows_per_page,
        binding_input.input.paid_through,
    );
    serde_json::to_string(&view).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export and display
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ExportBindingInput {
    #[serde(flatten)]
    input: AmortizationInput,
    #[serde(default)]
    date_format: Option<String>,
}

#[napi]
pub fn export_schedule_csv(input_json: String) -> NapiResult<String> {
    let binding_input: ExportBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let session = amortization::replay(&binding_input.input).map_err(to_napi_error)?;
    if session.schedule().is_empty() {
        return Err(to_napi_error("No data to export"));
    }
    let date_format = binding_input
        .date_format
        .as_deref()
        .unwrap_or(loan_amortization_core::export::DEFAULT_EXPORT_DATE_FORMAT);
    loan_amortization_core::export::schedule_to_csv(session.schedule(), date_format)
        .map_err(to_napi_error)
}

#[napi]
pub fn export_file_name(today: String) -> NapiResult<String> {
    let date = amortization::params::parse_date("today", &today).map_err(to_napi_error)?;
    Ok(loan_amortization_core::export::export_file_name(date))
}

#[napi]
pub fn format_inr(amount: String) -> NapiResult<String> {
    let value: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(loan_amortization_core::display::format_inr(value))
}
