//! Prepayment-rate conventions: annual CPR and single monthly mortality (SMM).
//!
//! `cpr_to_smm` / `smm_to_cpr` are the raw conversions used inside the
//! engine; they saturate at the [0, 1] boundaries. The `convert_*` variants
//! are the validated entry points for callers.

use rust_decimal::Decimal;

use crate::error::PoolAnalyticsError;
use crate::math::{iterative_pow, nth_root};
use crate::types::Rate;
use crate::PoolAnalyticsResult;

/// Months per year used by both conventions.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Convert annual CPR to single monthly mortality (SMM).
/// SMM = 1 - (1 - CPR)^(1/12)
pub fn cpr_to_smm(cpr: Rate) -> Rate {
    if cpr <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if cpr >= Decimal::ONE {
        return Decimal::ONE;
    }
    Decimal::ONE - nth_root(Decimal::ONE - cpr, MONTHS_PER_YEAR)
}

/// Convert SMM back to annualised CPR.
/// CPR = 1 - (1 - SMM)^12
pub fn smm_to_cpr(smm: Rate) -> Rate {
    if smm <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if smm >= Decimal::ONE {
        return Decimal::ONE;
    }
    Decimal::ONE - iterative_pow(Decimal::ONE - smm, MONTHS_PER_YEAR)
}

/// Validated CPR -> SMM conversion. Rejects CPR outside [0, 1].
pub fn convert_cpr_to_smm(cpr: Rate) -> PoolAnalyticsResult<Rate> {
    validate_unit_rate("cpr", cpr)?;
    Ok(cpr_to_smm(cpr))
}

/// Validated SMM -> CPR conversion. Rejects SMM outside [0, 1].
pub fn convert_smm_to_cpr(smm: Rate) -> PoolAnalyticsResult<Rate> {
    validate_unit_rate("smm", smm)?;
    Ok(smm_to_cpr(smm))
}

pub(crate) fn validate_unit_rate(field: &str, value: Rate) -> PoolAnalyticsResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PoolAnalyticsError::InvalidInput {
            field: field.into(),
            reason: format!("{} must be between 0 and 1, got {}", field, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ROUND_TRIP_TOL: Decimal = dec!(0.000000001);

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

    fn unit_grid() -> Vec<Decimal> {
        (1..100).map(|i| Decimal::from(i) / dec!(100)).collect()
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(cpr_to_smm(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(cpr_to_smm(Decimal::ONE), Decimal::ONE);
        assert_eq!(smm_to_cpr(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(smm_to_cpr(Decimal::ONE), Decimal::ONE);
    }

    #[test]
    fn test_six_percent_cpr() {
        // 1 - 0.94^(1/12) = 0.0051430...
        assert_close(
            cpr_to_smm(dec!(0.06)),
            dec!(0.0051430),
            dec!(0.0000001),
            "SMM for 6% CPR",
        );
    }

    #[test]
    fn test_round_trip_cpr_smm_cpr() {
        for cpr in unit_grid() {
            assert_close(
                smm_to_cpr(cpr_to_smm(cpr)),
                cpr,
                ROUND_TRIP_TOL,
                &format!("round trip for CPR={}", cpr),
            );
        }
    }

    #[test]
    fn test_round_trip_smm_cpr_smm() {
        for smm in unit_grid() {
            assert_close(
                cpr_to_smm(smm_to_cpr(smm)),
                smm,
                ROUND_TRIP_TOL,
                &format!("round trip for SMM={}", smm),
            );
        }
    }

    #[test]
    fn test_monotonic_increasing() {
        let grid = unit_grid();
        for pair in grid.windows(2) {
            assert!(cpr_to_smm(pair[1]) > cpr_to_smm(pair[0]));
            assert!(smm_to_cpr(pair[1]) > smm_to_cpr(pair[0]));
        }
    }

    #[test]
    fn test_smm_below_cpr_for_interior_values() {
        for cpr in unit_grid() {
            assert!(cpr_to_smm(cpr) < cpr);
        }
    }

    #[test]
    fn test_checked_conversion_rejects_out_of_range() {
        assert!(matches!(
            convert_cpr_to_smm(dec!(1.2)),
            Err(PoolAnalyticsError::InvalidInput { .. })
        ));
        assert!(matches!(
            convert_smm_to_cpr(dec!(-0.01)),
            Err(PoolAnalyticsError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_checked_conversion_matches_raw() {
        assert_eq!(convert_cpr_to_smm(dec!(0.08)).unwrap(), cpr_to_smm(dec!(0.08)));
        assert_eq!(convert_smm_to_cpr(dec!(0.01)).unwrap(), smm_to_cpr(dec!(0.01)));
    }
}
