//! Time-series trend of the portfolio's average pool factor.
//!
//! All dated snapshots are grouped by observation date and averaged, then
//! month-over-month percentage changes are taken across the dated means.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::PoolAnalyticsError;
use crate::math::{mean, sample_std_dev};
use crate::types::{with_metadata, ComputationOutput, Factor, PoolSnapshot};
use crate::PoolAnalyticsResult;

/// At least two dates are needed for one change.
pub const MIN_TREND_DATES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedFactor {
    pub date: NaiveDate,
    pub avg_pool_factor: Factor,
    pub pool_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorTrendDirection {
    Declining,
    Improving,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolFactorTrend {
    /// Sign of the most recent change (zero reads as improving).
    pub current_trend: FactorTrendDirection,
    /// Mean month-over-month change, in percent.
    pub avg_monthly_change: Decimal,
    /// Sample standard deviation of the changes, in percent.
    pub volatility: Decimal,
    /// Number of distinct observation dates.
    pub data_points: usize,
    pub monthly_changes: Vec<Decimal>,
    pub history: Vec<DatedFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactorTrendEstimate {
    Analyzed(PoolFactorTrend),
    InsufficientData { data_points: usize, required: usize },
}

impl FactorTrendEstimate {
    pub fn trend(&self) -> Option<&PoolFactorTrend> {
        match self {
            FactorTrendEstimate::Analyzed(t) => Some(t),
            FactorTrendEstimate::InsufficientData { .. } => None,
        }
    }
}

pub fn analyze_factor_trend(
    snapshots: &[PoolSnapshot],
) -> PoolAnalyticsResult<ComputationOutput<FactorTrendEstimate>> {
    let start = Instant::now();
    let methodology = "Month-over-month change in mean pool factor by observation date";

    let mut by_date: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for snap in snapshots {
        let date = snap.as_of_date.ok_or_else(|| PoolAnalyticsError::InvalidInput {
            field: "as_of_date".into(),
            reason: format!("Pool {} snapshot has no observation date", snap.pool_id),
        })?;
        let entry = by_date.entry(date).or_insert((Decimal::ZERO, 0));
        entry.0 += snap.pool_factor;
        entry.1 += 1;
    }

    let history: Vec<DatedFactor> = by_date
        .into_iter()
        .map(|(date, (sum, count))| DatedFactor {
            date,
            avg_pool_factor: sum / Decimal::from(count as u64),
            pool_count: count,
        })
        .collect();

    let assumptions = serde_json::json!({ "min_dates": MIN_TREND_DATES });

    if history.len() < MIN_TREND_DATES {
        debug!("factor trend: {} distinct date(s)", history.len());
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(
            methodology,
            &assumptions,
            vec![format!(
                "Trend requires at least {} observation dates, got {}",
                MIN_TREND_DATES,
                history.len()
            )],
            elapsed,
            FactorTrendEstimate::InsufficientData {
                data_points: history.len(),
                required: MIN_TREND_DATES,
            },
        ));
    }

    let mut warnings = Vec::new();
    let mut monthly_changes = Vec::with_capacity(history.len() - 1);
    for pair in history.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if prev.avg_pool_factor.is_zero() {
            warn!("factor trend: zero mean factor on {}", prev.date);
            warnings.push(format!(
                "Mean factor on {} is zero; change to {} reported as 0",
                prev.date, curr.date
            ));
            monthly_changes.push(Decimal::ZERO);
        } else {
            monthly_changes
                .push((curr.avg_pool_factor - prev.avg_pool_factor) / prev.avg_pool_factor * dec!(100));
        }
    }

    let last_change = monthly_changes.last().copied().unwrap_or(Decimal::ZERO);
    let current_trend = if last_change < Decimal::ZERO {
        FactorTrendDirection::Declining
    } else {
        FactorTrendDirection::Improving
    };

    let trend = PoolFactorTrend {
        current_trend,
        avg_monthly_change: mean(&monthly_changes),
        volatility: sample_std_dev(&monthly_changes),
        data_points: history.len(),
        monthly_changes,
        history,
    };
    debug!(
        "factor trend: {} dates, avg change {}%",
        trend.data_points, trend.avg_monthly_change
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &assumptions,
        warnings,
        elapsed,
        FactorTrendEstimate::Analyzed(trend),
    ))
}
