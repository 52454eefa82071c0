use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use pool_analytics_core::mortgage_analytics::{cash_flows, conventions, prepayment_speed};
use pool_analytics_core::pool_risk::{concentration, factor_summary, factor_trend, health};
use pool_analytics_core::PoolSnapshot;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Pool snapshots as a bare array or wrapped in `{ "pools": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PanelInput {
    Rows(Vec<PoolSnapshot>),
    Wrapped { pools: Vec<PoolSnapshot> },
}

fn parse_panel(input_json: &str) -> NapiResult<Vec<PoolSnapshot>> {
    let panel: PanelInput = serde_json::from_str(input_json).map_err(to_napi_error)?;
    Ok(match panel {
        PanelInput::Rows(rows) | PanelInput::Wrapped { pools: rows } => rows,
    })
}

fn parse_rate(rate: &str) -> NapiResult<Decimal> {
    rate.trim().parse::<Decimal>().map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate conventions
// ---------------------------------------------------------------------------

/// Annual CPR (decimal string) to monthly SMM (decimal string).
#[napi]
pub fn cpr_to_smm(cpr: String) -> NapiResult<String> {
    let smm = conventions::convert_cpr_to_smm(parse_rate(&cpr)?).map_err(to_napi_error)?;
    Ok(smm.to_string())
}

/// Monthly SMM (decimal string) to annual CPR (decimal string).
#[napi]
pub fn smm_to_cpr(smm: String) -> NapiResult<String> {
    let cpr = conventions::convert_smm_to_cpr(parse_rate(&smm)?).map_err(to_napi_error)?;
    Ok(cpr.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage analytics
// ---------------------------------------------------------------------------

#[napi]
pub fn estimate_prepayment_speed(input_json: String) -> NapiResult<String> {
    let input: prepayment_speed::PrepaymentSpeedInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = prepayment_speed::estimate_prepayment_speed(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_cash_flows(input_json: String) -> NapiResult<String> {
    let input: cash_flows::CashFlowProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cash_flows::project_cash_flows(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pool risk
// ---------------------------------------------------------------------------

#[napi]
pub fn score_pool_health(input_json: String) -> NapiResult<String> {
    let snapshot: PoolSnapshot = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = health::score_pool_health(&snapshot).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_portfolio_health(input_json: String) -> NapiResult<String> {
    let rows = parse_panel(&input_json)?;
    let output = health::analyze_portfolio_health(&rows).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_concentration_risk(input_json: String) -> NapiResult<String> {
    let rows = parse_panel(&input_json)?;
    let output = concentration::calculate_concentration_risk(&rows).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_pool_factors(input_json: String) -> NapiResult<String> {
    let rows = parse_panel(&input_json)?;
    let output = factor_summary::summarize_pool_factors(&rows).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_factor_trend(input_json: String) -> NapiResult<String> {
    let rows = parse_panel(&input_json)?;
    let output = factor_trend::analyze_factor_trend(&rows).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
