//! Balance concentration across a pool portfolio.
//!
//! Weights are current balances over the portfolio total, using the latest
//! snapshot of each pool. HHI is on the 0-10000 scale.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::snapshots::latest_snapshots;
use crate::error::PoolAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Money, PoolSnapshot};
use crate::PoolAnalyticsResult;

const HIGH_CONCENTRATION_HHI: Decimal = dec!(2500);
const MEDIUM_CONCENTRATION_HHI: Decimal = dec!(1500);
/// Pools above this share of the portfolio count as large.
const LARGE_POOL_WEIGHT: Decimal = dec!(0.10);
const TOP_N: usize = 10;

/// Concentration level derived from the HHI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcentrationLevel {
    High,
    Medium,
    Low,
}

/// One pool's share of the portfolio balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolWeight {
    pub pool_id: String,
    pub current_balance: Money,
    pub balance_weight: Decimal,
}

/// Portfolio concentration analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationReport {
    pub hhi_score: Decimal,
    pub concentration_level: ConcentrationLevel,
    /// Combined weight of pools above 10% of the portfolio.
    pub large_pool_concentration: Decimal,
    pub number_of_large_pools: usize,
    /// Combined weight of the ten largest pools.
    pub top_10_concentration: Decimal,
    pub total_balance: Money,
    pub pool_count: usize,
    /// Sorted by weight, largest first.
    pub pool_weights: Vec<PoolWeight>,
}

/// High above 2500, Medium above 1500, Low otherwise.
pub fn classify_concentration(hhi: Decimal) -> ConcentrationLevel {
    if hhi > HIGH_CONCENTRATION_HHI {
        ConcentrationLevel::High
    } else if hhi > MEDIUM_CONCENTRATION_HHI {
        ConcentrationLevel::Medium
    } else {
        ConcentrationLevel::Low
    }
}

/// Measure balance concentration over the latest snapshot of each pool.
pub fn calculate_concentration_risk(
    snapshots: &[PoolSnapshot],
) -> PoolAnalyticsResult<ComputationOutput<ConcentrationReport>> {
    let start = Instant::now();
    let latest = latest_snapshots(snapshots);

    if let Some(bad) = latest.iter().find(|s| s.current_balance < Decimal::ZERO) {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "current_balance".into(),
            reason: format!("Pool {} has negative balance {}", bad.pool_id, bad.current_balance),
        });
    }

    let total_balance: Money = latest.iter().map(|s| s.current_balance).sum();
    if total_balance.is_zero() {
        return Err(PoolAnalyticsError::DegenerateInput {
            field: "current_balance".into(),
            reason: "Total portfolio balance is zero; weights are undefined".into(),
        });
    }

    let mut pool_weights: Vec<PoolWeight> = latest
        .iter()
        .map(|s| PoolWeight {
            pool_id: s.pool_id.clone(),
            current_balance: s.current_balance,
            balance_weight: s.current_balance / total_balance,
        })
        .collect();
    pool_weights.sort_by(|a, b| b.balance_weight.cmp(&a.balance_weight));

    let hhi_score: Decimal = pool_weights
        .iter()
        .map(|w| w.balance_weight * w.balance_weight * dec!(10000))
        .sum();

    let large: Vec<&PoolWeight> = pool_weights
        .iter()
        .filter(|w| w.balance_weight > LARGE_POOL_WEIGHT)
        .collect();
    let large_pool_concentration: Decimal = large.iter().map(|w| w.balance_weight).sum();
    let top_10_concentration: Decimal = pool_weights
        .iter()
        .take(TOP_N)
        .map(|w| w.balance_weight)
        .sum();

    let concentration_level = classify_concentration(hhi_score);
    debug!(
        "concentration: {} pools, HHI {} ({:?})",
        pool_weights.len(),
        hhi_score,
        concentration_level
    );

    let mut warnings = Vec::new();
    if concentration_level == ConcentrationLevel::High {
        warnings.push(format!(
            "Portfolio is highly concentrated (HHI {} > {})",
            hhi_score.round_dp(2),
            HIGH_CONCENTRATION_HHI
        ));
    }

    let report = ConcentrationReport {
        hhi_score,
        concentration_level,
        large_pool_concentration,
        number_of_large_pools: large.len(),
        top_10_concentration,
        total_balance,
        pool_count: pool_weights.len(),
        pool_weights,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Herfindahl-Hirschman Index on current balance weights",
        &serde_json::json!({
            "large_pool_weight": LARGE_POOL_WEIGHT.to_string(),
            "high_threshold": HIGH_CONCENTRATION_HHI.to_string(),
            "medium_threshold": MEDIUM_CONCENTRATION_HHI.to_string(),
        }),
        warnings,
        elapsed,
        report,
    ))
}
