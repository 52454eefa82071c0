//! Cross-sectional pool factor summary.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::snapshots::{latest_snapshots, validate_snapshot};
use crate::error::PoolAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Factor, Money, PoolSnapshot};
use crate::PoolAnalyticsResult;

const HEALTHY_FACTOR: Decimal = dec!(0.7);
const DECLINING_FACTOR: Decimal = dec!(0.3);

/// Pool counts by factor band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorDistribution {
    /// factor > 0.7
    pub healthy: usize,
    /// 0.3 <= factor <= 0.7
    pub moderate: usize,
    /// factor < 0.3
    pub declining: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolFactorSummary {
    pub total_pools: usize,
    pub avg_pool_factor: Factor,
    pub total_current_balance: Money,
    pub total_original_balance: Money,
    /// (1 - avg_pool_factor) x 100
    pub implied_paydown_pct: Decimal,
    pub distribution: FactorDistribution,
}

pub fn summarize_pool_factors(
    snapshots: &[PoolSnapshot],
) -> PoolAnalyticsResult<ComputationOutput<PoolFactorSummary>> {
    let start = Instant::now();
    let latest = latest_snapshots(snapshots);
    if latest.is_empty() {
        return Err(PoolAnalyticsError::InsufficientData(
            "Factor summary requires at least one pool snapshot".into(),
        ));
    }

    let mut distribution = FactorDistribution::default();
    let mut factor_sum = Decimal::ZERO;
    let mut total_current_balance = Decimal::ZERO;
    let mut total_original_balance = Decimal::ZERO;

    for snap in &latest {
        validate_snapshot(snap)?;
        factor_sum += snap.pool_factor;
        total_current_balance += snap.current_balance;
        total_original_balance += snap.original_balance;

        if snap.pool_factor > HEALTHY_FACTOR {
            distribution.healthy += 1;
        } else if snap.pool_factor >= DECLINING_FACTOR {
            distribution.moderate += 1;
        } else {
            distribution.declining += 1;
        }
    }

    let avg_pool_factor = factor_sum / Decimal::from(latest.len() as u64);
    let summary = PoolFactorSummary {
        total_pools: latest.len(),
        avg_pool_factor,
        total_current_balance,
        total_original_balance,
        implied_paydown_pct: (Decimal::ONE - avg_pool_factor) * dec!(100),
        distribution,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pool factor distribution over latest snapshots",
        &serde_json::json!({
            "healthy_above": HEALTHY_FACTOR.to_string(),
            "declining_below": DECLINING_FACTOR.to_string(),
        }),
        Vec::new(),
        elapsed,
        summary,
    ))
}
