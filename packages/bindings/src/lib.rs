use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn plan_payoff(input_json: String) -> NapiResult<String> {
    let input: debt_payoff_core::payoff::DebtInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_payoff_core::payoff::plan_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn minimum_payment(input_json: String) -> NapiResult<String> {
    let input: debt_payoff_core::payoff::MinimumPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        debt_payoff_core::payoff::calculate_minimum_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
