//! Realised prepayment speed from an observed pool-factor history.
//!
//! Each period's SMM is the fractional paydown of the pool factor, clamped
//! to [0, 1] so that upward factor noise (rounding, servicer corrections)
//! reads as zero prepayment rather than a negative rate. SMMs are annualised
//! to CPR and summarised against a benchmark CPR (PSA-style multiplier).

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::conventions::{smm_to_cpr, validate_unit_rate};
use crate::error::PoolAnalyticsError;
use crate::math::{clamp_unit, mean, sample_std_dev};
use crate::types::{with_metadata, ComputationOutput, Factor, Rate};
use crate::PoolAnalyticsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Benchmark CPR used for the PSA-style multiplier (6% annual).
pub const DEFAULT_BENCHMARK_CPR: Rate = dec!(0.06);

/// Number of trailing monthly CPRs reported in the history.
pub const DEFAULT_HISTORY_WINDOW: usize = 12;

/// A speed estimate needs at least one factor change.
pub const MIN_FACTOR_OBSERVATIONS: usize = 2;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One observed pool factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorObservation {
    pub date: NaiveDate,
    pub pool_factor: Factor,
}

/// Estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedEstimatorConfig {
    /// Benchmark annual CPR (e.g., 0.06 = 6%).
    pub benchmark_cpr: Rate,
    /// How many trailing monthly CPRs to return.
    pub history_window: usize,
}

impl Default for SpeedEstimatorConfig {
    fn default() -> Self {
        Self {
            benchmark_cpr: DEFAULT_BENCHMARK_CPR,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// Prepayment speed estimation input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentSpeedInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
    /// Chronologically ordered factor observations.
    pub factors: Vec<FactorObservation>,
    #[serde(default)]
    pub config: SpeedEstimatorConfig,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Direction of the latest period's prepayment speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrepaymentTrend {
    Accelerating,
    Decelerating,
}

/// Realised prepayment metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentSpeedMetrics {
    /// SMM of the most recent period.
    pub current_smm: Rate,
    /// CPR of the most recent period.
    pub current_cpr: Rate,
    /// Mean CPR over all periods.
    pub average_cpr: Rate,
    /// Sample standard deviation of period CPRs.
    pub cpr_volatility: Decimal,
    /// average_cpr / benchmark_cpr (0 when the benchmark is 0).
    pub psa_multiplier: Decimal,
    pub prepayment_trend: PrepaymentTrend,
    /// Trailing monthly CPRs, oldest first.
    pub monthly_prepayment_history: Vec<Rate>,
    /// Number of factor changes the metrics are computed from.
    pub periods_observed: usize,
}

/// Estimator result: either metrics or an explicit insufficient-history marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrepaymentSpeedEstimate {
    Estimated(PrepaymentSpeedMetrics),
    InsufficientData { observations: usize, required: usize },
}

impl PrepaymentSpeedEstimate {
    pub fn metrics(&self) -> Option<&PrepaymentSpeedMetrics> {
        match self {
            PrepaymentSpeedEstimate::Estimated(m) => Some(m),
            PrepaymentSpeedEstimate::InsufficientData { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate realised SMM/CPR from a pool-factor history.
pub fn estimate_prepayment_speed(
    input: &PrepaymentSpeedInput,
) -> PoolAnalyticsResult<ComputationOutput<PrepaymentSpeedEstimate>> {
    let start = Instant::now();
    let methodology = "Realised SMM/CPR from pool factor paydown";

    if input.factors.len() < MIN_FACTOR_OBSERVATIONS {
        debug!(
            "prepayment speed: {} factor observation(s), {} required",
            input.factors.len(),
            MIN_FACTOR_OBSERVATIONS
        );
        let estimate = PrepaymentSpeedEstimate::InsufficientData {
            observations: input.factors.len(),
            required: MIN_FACTOR_OBSERVATIONS,
        };
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(methodology, input, Vec::new(), elapsed, estimate));
    }

    validate_speed_input(input)?;

    let mut warnings: Vec<String> = Vec::new();
    let mut smm_values = Vec::with_capacity(input.factors.len() - 1);

    for pair in input.factors.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let change = (curr.pool_factor - prev.pool_factor) / prev.pool_factor;
        if change > Decimal::ZERO {
            warn!(
                "pool factor rose from {} to {} on {}; SMM floored at zero",
                prev.pool_factor, curr.pool_factor, curr.date
            );
            warnings.push(format!(
                "Pool factor rose from {} to {} on {}; treated as zero prepayment",
                prev.pool_factor, curr.pool_factor, curr.date
            ));
        }
        smm_values.push(clamp_unit(-change));
    }

    let cpr_values: Vec<Rate> = smm_values.iter().map(|smm| smm_to_cpr(*smm)).collect();

    let n = cpr_values.len();
    let current_smm = smm_values[n - 1];
    let current_cpr = cpr_values[n - 1];
    let average_cpr = mean(&cpr_values);
    let cpr_volatility = sample_std_dev(&cpr_values);

    let benchmark = input.config.benchmark_cpr;
    let psa_multiplier = if benchmark > Decimal::ZERO {
        average_cpr / benchmark
    } else {
        Decimal::ZERO
    };

    let prepayment_trend = if n > 1 && cpr_values[n - 1] > cpr_values[n - 2] {
        PrepaymentTrend::Accelerating
    } else {
        PrepaymentTrend::Decelerating
    };

    let window_start = n.saturating_sub(input.config.history_window);
    let monthly_prepayment_history = cpr_values[window_start..].to_vec();

    debug!(
        "prepayment speed: {} periods, average CPR {}, PSA multiple {}",
        n, average_cpr, psa_multiplier
    );

    let estimate = PrepaymentSpeedEstimate::Estimated(PrepaymentSpeedMetrics {
        current_smm,
        current_cpr,
        average_cpr,
        cpr_volatility,
        psa_multiplier,
        prepayment_trend,
        monthly_prepayment_history,
        periods_observed: n,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, estimate))
}

fn validate_speed_input(input: &PrepaymentSpeedInput) -> PoolAnalyticsResult<()> {
    validate_unit_rate("benchmark_cpr", input.config.benchmark_cpr)?;
    if input.config.history_window == 0 {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "history_window".into(),
            reason: "History window must be at least one month".into(),
        });
    }
    for obs in &input.factors {
        if obs.pool_factor <= Decimal::ZERO || obs.pool_factor > Decimal::ONE {
            return Err(PoolAnalyticsError::InvalidInput {
                field: "pool_factor".into(),
                reason: format!(
                    "Pool factor on {} must be in (0, 1], got {}",
                    obs.date, obs.pool_factor
                ),
            });
        }
    }
    for pair in input.factors.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(PoolAnalyticsError::DateError(format!(
                "Factor observations must be in strictly increasing date order: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage_analytics::conventions::cpr_to_smm;

    const RATE_TOL: Decimal = dec!(0.0000001);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn series(factors: &[Decimal]) -> PrepaymentSpeedInput {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        PrepaymentSpeedInput {
            pool_id: Some("POOL001".into()),
            factors: factors
                .iter()
                .enumerate()
                .map(|(i, f)| FactorObservation {
                    date: start
                        .checked_add_months(chrono::Months::new(i as u32))
                        .unwrap(),
                    pool_factor: *f,
                })
                .collect(),
            config: SpeedEstimatorConfig::default(),
        }
    }

    fn run(factors: &[Decimal]) -> PrepaymentSpeedMetrics {
        let out = estimate_prepayment_speed(&series(factors)).unwrap();
        match out.result {
            PrepaymentSpeedEstimate::Estimated(m) => m,
            other => panic!("Expected metrics, got {:?}", other),
        }
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let out = estimate_prepayment_speed(&series(&[dec!(0.98)])).unwrap();
        match out.result {
            PrepaymentSpeedEstimate::InsufficientData {
                observations,
                required,
            } => {
                assert_eq!(observations, 1);
                assert_eq!(required, 2);
            }
            other => panic!("Expected insufficient data, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let out = estimate_prepayment_speed(&series(&[])).unwrap();
        assert!(out.result.metrics().is_none());
    }

    #[test]
    fn test_decreasing_factors_positive_cpr() {
        let m = run(&[dec!(1.0), dec!(0.95), dec!(0.90)]);
        assert_eq!(m.periods_observed, 2);
        for cpr in &m.monthly_prepayment_history {
            assert!(*cpr > Decimal::ZERO, "CPR should be positive, got {}", cpr);
        }
        assert!(m.current_cpr > Decimal::ZERO);
        assert!(m.average_cpr > Decimal::ZERO);
    }

    #[test]
    fn test_smm_is_fractional_paydown() {
        // 1.0 -> 0.95 is a 5% paydown; 0.95 -> 0.90 is 0.05/0.95.
        let m = run(&[dec!(1.0), dec!(0.95), dec!(0.90)]);
        assert_close(m.current_smm, dec!(0.05) / dec!(0.95), RATE_TOL, "current SMM");
        assert_close(
            m.monthly_prepayment_history[0],
            smm_to_cpr(dec!(0.05)),
            RATE_TOL,
            "first period CPR",
        );
    }

    #[test]
    fn test_constant_speed_recovers_cpr() {
        // A factor path paying down at the SMM of 6% CPR reads back as 6% CPR.
        let smm = cpr_to_smm(dec!(0.06));
        let mut factors = vec![Decimal::ONE];
        for _ in 0..12 {
            let last = *factors.last().unwrap();
            factors.push(last * (Decimal::ONE - smm));
        }
        let m = run(&factors);
        assert_close(m.average_cpr, dec!(0.06), dec!(0.000001), "average CPR");
        assert_close(m.psa_multiplier, Decimal::ONE, dec!(0.00001), "PSA multiple");
        assert!(m.cpr_volatility < dec!(0.000001));
    }

    #[test]
    fn test_upward_noise_clamped_with_warning() {
        let out = estimate_prepayment_speed(&series(&[dec!(0.90), dec!(0.91), dec!(0.89)])).unwrap();
        assert_eq!(out.warnings.len(), 1);
        let m = out.result.metrics().unwrap();
        assert_eq!(m.monthly_prepayment_history[0], Decimal::ZERO);
        assert!(m.monthly_prepayment_history[1] > Decimal::ZERO);
    }

    #[test]
    fn test_trend_accelerating() {
        let m = run(&[dec!(1.0), dec!(0.99), dec!(0.97)]);
        assert_eq!(m.prepayment_trend, PrepaymentTrend::Accelerating);
    }

    #[test]
    fn test_trend_decelerating() {
        let m = run(&[dec!(1.0), dec!(0.97), dec!(0.96)]);
        assert_eq!(m.prepayment_trend, PrepaymentTrend::Decelerating);
    }

    #[test]
    fn test_single_period_defaults_to_decelerating() {
        let m = run(&[dec!(1.0), dec!(0.97)]);
        assert_eq!(m.prepayment_trend, PrepaymentTrend::Decelerating);
        assert_eq!(m.cpr_volatility, Decimal::ZERO);
    }

    #[test]
    fn test_history_limited_to_window() {
        let factors: Vec<Decimal> = (0..20)
            .map(|i| Decimal::ONE - Decimal::from(i) * dec!(0.01))
            .collect();
        let m = run(&factors);
        assert_eq!(m.periods_observed, 19);
        assert_eq!(m.monthly_prepayment_history.len(), 12);
        // The last history entry is the current CPR.
        assert_eq!(*m.monthly_prepayment_history.last().unwrap(), m.current_cpr);
    }

    #[test]
    fn test_zero_benchmark_gives_zero_multiplier() {
        let mut input = series(&[dec!(1.0), dec!(0.98)]);
        input.config.benchmark_cpr = Decimal::ZERO;
        let out = estimate_prepayment_speed(&input).unwrap();
        assert_eq!(out.result.metrics().unwrap().psa_multiplier, Decimal::ZERO);
    }

    #[test]
    fn test_factor_out_of_range_rejected() {
        let result = estimate_prepayment_speed(&series(&[dec!(1.0), dec!(1.2)]));
        assert!(matches!(
            result,
            Err(PoolAnalyticsError::InvalidInput { .. })
        ));
        let result = estimate_prepayment_speed(&series(&[dec!(1.0), dec!(0)]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unordered_dates_rejected() {
        let mut input = series(&[dec!(1.0), dec!(0.98), dec!(0.97)]);
        input.factors.swap(0, 1);
        let result = estimate_prepayment_speed(&input);
        assert!(matches!(result, Err(PoolAnalyticsError::DateError(_))));
    }

    #[test]
    fn test_metadata_populated() {
        let out = estimate_prepayment_speed(&series(&[dec!(1.0), dec!(0.99)])).unwrap();
        assert!(out.methodology.contains("SMM"));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
