//! Composite pool health score (0-100).
//!
//! Four independently capped components:
//! 1. **Factor** -- pool_factor x 40 (0-40).
//! 2. **Balance stability** -- current / original balance x 100, capped at 30.
//! 3. **Coupon** -- WAC relative to a 5% reference coupon, scaled to 20.
//! 4. **Remaining term** -- 10 for a 10-20 year WAM, 7 for 5-10 or 20-25
//!    years, 3 otherwise.
//!
//! Portfolio roll-ups use each pool's most recent snapshot only.

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::snapshots::{latest_snapshots, validate_snapshot};
use crate::error::PoolAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Factor, Money, PoolSnapshot};
use crate::PoolAnalyticsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const FACTOR_WEIGHT: Decimal = dec!(40);
const BALANCE_CAP: Decimal = dec!(30);
const COUPON_CAP: Decimal = dec!(20);
/// Reference coupon that earns the full coupon component.
const REFERENCE_COUPON: Decimal = dec!(0.05);
/// WAM assumed when a snapshot does not carry one.
pub const DEFAULT_WAM_MONTHS: u32 = 360;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Health category derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthCategory {
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(80) {
            HealthCategory::Excellent
        } else if score >= dec!(65) {
            HealthCategory::Good
        } else if score >= dec!(50) {
            HealthCategory::Fair
        } else if score >= dec!(35) {
            HealthCategory::Poor
        } else {
            HealthCategory::Critical
        }
    }
}

/// Per-component breakdown of a health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthComponents {
    pub factor_score: Decimal,
    pub balance_score: Decimal,
    pub coupon_score: Decimal,
    pub term_score: Decimal,
}

/// Score for a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolHealthScore {
    pub score: Decimal,
    pub category: HealthCategory,
    pub components: HealthComponents,
}

/// One pool's row in the portfolio health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolHealthRecord {
    pub pool_id: String,
    pub health_score: Decimal,
    pub health_category: HealthCategory,
    pub pool_factor: Factor,
    pub current_balance: Money,
}

/// Number of pools in each category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
    pub critical: usize,
}

impl HealthDistribution {
    fn record(&mut self, category: HealthCategory) {
        match category {
            HealthCategory::Excellent => self.excellent += 1,
            HealthCategory::Good => self.good += 1,
            HealthCategory::Fair => self.fair += 1,
            HealthCategory::Poor => self.poor += 1,
            HealthCategory::Critical => self.critical += 1,
        }
    }
}

/// Portfolio-level health aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHealthSummary {
    pub average_health_score: Decimal,
    pub health_distribution: HealthDistribution,
    pub total_balance: Money,
    pub avg_pool_factor: Factor,
    pub pool_count: usize,
}

/// Portfolio health analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHealthOutput {
    pub individual_pool_health: Vec<PoolHealthRecord>,
    pub portfolio_health: PortfolioHealthSummary,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Score one pool snapshot.
pub fn score_pool_health(snapshot: &PoolSnapshot) -> PoolAnalyticsResult<PoolHealthScore> {
    validate_snapshot(snapshot)?;

    let factor_score = snapshot.pool_factor * FACTOR_WEIGHT;

    let balance_score = if snapshot.original_balance > Decimal::ZERO {
        (snapshot.current_balance / snapshot.original_balance * dec!(100)).min(BALANCE_CAP)
    } else {
        Decimal::ZERO
    };

    let coupon_score = (snapshot.wac / REFERENCE_COUPON * COUPON_CAP).min(COUPON_CAP);

    let term_score = rate_remaining_term(snapshot.wam.unwrap_or(DEFAULT_WAM_MONTHS));

    let score = (factor_score + balance_score + coupon_score + term_score)
        .max(Decimal::ZERO)
        .min(dec!(100));

    Ok(PoolHealthScore {
        score,
        category: HealthCategory::from_score(score),
        components: HealthComponents {
            factor_score,
            balance_score,
            coupon_score,
            term_score,
        },
    })
}

/// Score every pool in a snapshot panel and roll the results up.
pub fn analyze_portfolio_health(
    snapshots: &[PoolSnapshot],
) -> PoolAnalyticsResult<ComputationOutput<PortfolioHealthOutput>> {
    let start = Instant::now();
    let latest = latest_snapshots(snapshots);
    if latest.is_empty() {
        return Err(PoolAnalyticsError::InsufficientData(
            "Portfolio health requires at least one pool snapshot".into(),
        ));
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(latest.len());
    let mut distribution = HealthDistribution::default();
    let mut score_sum = Decimal::ZERO;
    let mut total_balance = Decimal::ZERO;
    let mut factor_sum = Decimal::ZERO;

    for snap in &latest {
        let scored = score_pool_health(snap)?;
        if snap.original_balance.is_zero() {
            warnings.push(format!(
                "Pool {} has zero original balance; balance stability scored as 0",
                snap.pool_id
            ));
        }
        distribution.record(scored.category);
        score_sum += scored.score;
        total_balance += snap.current_balance;
        factor_sum += snap.pool_factor;
        records.push(PoolHealthRecord {
            pool_id: snap.pool_id.clone(),
            health_score: scored.score,
            health_category: scored.category,
            pool_factor: snap.pool_factor,
            current_balance: snap.current_balance,
        });
    }

    let n = Decimal::from(latest.len() as u64);
    let average_health_score = score_sum / n;
    debug!(
        "portfolio health: {} pools, average score {}",
        latest.len(),
        average_health_score
    );

    let output = PortfolioHealthOutput {
        individual_pool_health: records,
        portfolio_health: PortfolioHealthSummary {
            average_health_score,
            health_distribution: distribution,
            total_balance,
            avg_pool_factor: factor_sum / n,
            pool_count: latest.len(),
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Composite pool health score (factor, balance, coupon, term)",
        &serde_json::json!({ "pools_submitted": snapshots.len(), "pools_scored": latest.len() }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Rating helpers
// ---------------------------------------------------------------------------

fn rate_remaining_term(wam: u32) -> Decimal {
    match wam {
        120..=240 => dec!(10),
        60..=119 | 241..=300 => dec!(7),
        _ => dec!(3),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(pool_id: &str, factor: Decimal, wac: Decimal, wam: Option<u32>) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: pool_id.into(),
            as_of_date: None,
            pool_factor: factor,
            original_balance: dec!(1_000_000),
            current_balance: dec!(1_000_000) * factor,
            wac,
            wam,
        }
    }

    #[test]
    fn test_component_arithmetic() {
        // 0.9*40 = 36; ratio 0.9 -> 30 (capped); 0.035/0.05*20 = 14; WAM 180 -> 10
        let s = score_pool_health(&snapshot("P1", dec!(0.9), dec!(0.035), Some(180))).unwrap();
        assert_eq!(s.components.factor_score, dec!(36));
        assert_eq!(s.components.balance_score, dec!(30));
        assert_eq!(s.components.coupon_score, dec!(14));
        assert_eq!(s.components.term_score, dec!(10));
        assert_eq!(s.score, dec!(90));
        assert_eq!(s.category, HealthCategory::Excellent);
    }

    #[test]
    fn test_coupon_component_capped() {
        let s = score_pool_health(&snapshot("P1", dec!(0.5), dec!(0.08), Some(360))).unwrap();
        assert_eq!(s.components.coupon_score, dec!(20));
    }

    #[test]
    fn test_balance_component_below_cap() {
        // ratio 0.2 -> 20 points
        let s = score_pool_health(&snapshot("P1", dec!(0.2), dec!(0.04), Some(360))).unwrap();
        assert_eq!(s.components.balance_score, dec!(20));
    }

    #[test]
    fn test_all_zero_snapshot_scores_term_only() {
        let mut snap = snapshot("P1", Decimal::ZERO, Decimal::ZERO, None);
        snap.current_balance = Decimal::ZERO;
        let s = score_pool_health(&snap).unwrap();
        // WAM defaults to 360 -> 3 points
        assert_eq!(s.score, dec!(3));
        assert_eq!(s.category, HealthCategory::Critical);
    }

    #[test]
    fn test_zero_original_balance_scores_zero_stability() {
        let mut snap = snapshot("P1", dec!(0.5), dec!(0.04), Some(200));
        snap.original_balance = Decimal::ZERO;
        let s = score_pool_health(&snap).unwrap();
        assert_eq!(s.components.balance_score, Decimal::ZERO);
    }

    #[test]
    fn test_score_within_bounds() {
        for factor in [dec!(0), dec!(0.25), dec!(0.5), dec!(0.75), dec!(1)] {
            for wac in [dec!(0), dec!(0.02), dec!(0.05), dec!(0.12)] {
                for wam in [0u32, 59, 60, 119, 120, 240, 241, 300, 301, 480] {
                    let s = score_pool_health(&snapshot("P", factor, wac, Some(wam))).unwrap();
                    assert!(s.score >= Decimal::ZERO && s.score <= dec!(100));
                }
            }
        }
    }

    #[test]
    fn test_term_bands() {
        assert_eq!(rate_remaining_term(120), dec!(10));
        assert_eq!(rate_remaining_term(240), dec!(10));
        assert_eq!(rate_remaining_term(60), dec!(7));
        assert_eq!(rate_remaining_term(119), dec!(7));
        assert_eq!(rate_remaining_term(241), dec!(7));
        assert_eq!(rate_remaining_term(300), dec!(7));
        assert_eq!(rate_remaining_term(59), dec!(3));
        assert_eq!(rate_remaining_term(301), dec!(3));
        assert_eq!(rate_remaining_term(360), dec!(3));
    }

    #[test]
    fn test_category_thresholds() {
        assert_eq!(HealthCategory::from_score(dec!(80)), HealthCategory::Excellent);
        assert_eq!(HealthCategory::from_score(dec!(79.99)), HealthCategory::Good);
        assert_eq!(HealthCategory::from_score(dec!(65)), HealthCategory::Good);
        assert_eq!(HealthCategory::from_score(dec!(50)), HealthCategory::Fair);
        assert_eq!(HealthCategory::from_score(dec!(35)), HealthCategory::Poor);
        assert_eq!(HealthCategory::from_score(dec!(34.99)), HealthCategory::Critical);
    }

    #[test]
    fn test_invalid_factor_rejected() {
        assert!(score_pool_health(&snapshot("P1", dec!(1.1), dec!(0.04), None)).is_err());
    }

    #[test]
    fn test_portfolio_uses_latest_snapshot() {
        let mut old = snapshot("P1", dec!(0.95), dec!(0.04), Some(180));
        old.as_of_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let mut new = snapshot("P1", dec!(0.20), dec!(0.04), Some(180));
        new.as_of_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let other = snapshot("P2", dec!(0.90), dec!(0.05), Some(180));

        let out = analyze_portfolio_health(&[new, old, other]).unwrap().result;
        assert_eq!(out.individual_pool_health.len(), 2);
        assert_eq!(out.individual_pool_health[0].pool_factor, dec!(0.20));
        assert_eq!(out.portfolio_health.pool_count, 2);
        assert_eq!(out.portfolio_health.total_balance, dec!(1_100_000));
        assert_eq!(out.portfolio_health.avg_pool_factor, dec!(0.55));
    }

    #[test]
    fn test_portfolio_distribution_and_average() {
        let pools = vec![
            snapshot("P1", dec!(0.9), dec!(0.035), Some(180)), // 90 Excellent
            snapshot("P2", dec!(0.9), dec!(0.035), Some(360)), // 83 Excellent
            snapshot("P3", dec!(0.1), dec!(0.0), Some(360)),   // 4 + 10 + 0 + 3 = 17 Critical
        ];
        let out = analyze_portfolio_health(&pools).unwrap().result;
        let dist = &out.portfolio_health.health_distribution;
        assert_eq!(dist.excellent, 2);
        assert_eq!(dist.critical, 1);
        assert_eq!(dist.good + dist.fair + dist.poor, 0);
        let diff = out.portfolio_health.average_health_score - dec!(190) / dec!(3);
        assert!(diff.abs() < dec!(0.0000001));
    }

    #[test]
    fn test_empty_portfolio_is_insufficient() {
        assert!(matches!(
            analyze_portfolio_health(&[]),
            Err(PoolAnalyticsError::InsufficientData(_))
        ));
    }
}
