//! Weighted average life and Macaulay duration of a projected schedule.
//!
//! Both measures weight each period by its total payment (scheduled payment
//! plus prepayment), so they describe the timing of the investor's cash
//! receipts. An empty or all-zero schedule yields 0 rather than an error:
//! that is the expected state of a fully paid-off pool.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::cash_flows::CashFlowPeriod;
use crate::math::iterative_pow_recip;
use crate::types::{Rate, Years};

/// WAL in years: Σ(month × total_payment) / Σ(total_payment) / 12.
pub fn weighted_average_life(periods: &[CashFlowPeriod]) -> Years {
    let mut weighted_months = Decimal::ZERO;
    let mut total_payments = Decimal::ZERO;
    for p in periods {
        weighted_months += Decimal::from(p.month) * p.total_payment;
        total_payments += p.total_payment;
    }

    if total_payments.is_zero() {
        return Decimal::ZERO;
    }
    weighted_months / total_payments / dec!(12)
}

/// Macaulay duration in years, discounting each total payment at the
/// periodic rate: PV = total_payment / (1 + monthly_rate)^month.
pub fn macaulay_duration(periods: &[CashFlowPeriod], monthly_rate: Rate) -> Years {
    let one_plus_r = Decimal::ONE + monthly_rate;
    if one_plus_r <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut weighted_pv = Decimal::ZERO;
    let mut total_pv = Decimal::ZERO;
    for p in periods {
        let pv = p.total_payment * iterative_pow_recip(one_plus_r, p.month);
        weighted_pv += Decimal::from(p.month) * pv;
        total_pv += pv;
    }

    if total_pv.is_zero() {
        return Decimal::ZERO;
    }
    weighted_pv / total_pv / dec!(12)
}
