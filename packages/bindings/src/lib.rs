use napi::Result as NapiResult;
use napi_derive::napi;

use simulcredit_core::amortization::{self, AmortizationInput};
use simulcredit_core::SimulcreditError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_input(input_json: &str) -> NapiResult<AmortizationInput> {
    AmortizationInput::from_json(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Full envelope: summary, schedule, warnings and metadata.
#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output)
        .map_err(SimulcreditError::from)
        .map_err(to_napi_error)
}

/// Schedule rows only, as a JSON array.
#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let schedule =
        amortization::compute_schedule_with(&input.loan, &input.options).map_err(to_napi_error)?;
    serde_json::to_string(&schedule)
        .map_err(SimulcreditError::from)
        .map_err(to_napi_error)
}
