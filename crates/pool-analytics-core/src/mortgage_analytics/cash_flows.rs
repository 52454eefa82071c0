//! Month-by-month cash-flow projection for a mortgage pool under a constant
//! CPR assumption.
//!
//! Each month the pool pays a level (annuity) payment split into interest and
//! scheduled principal; the SMM equivalent of the projected CPR is then
//! applied to the balance remaining after scheduled principal. The schedule
//! stops as soon as the balance is retired.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::conventions::{cpr_to_smm, validate_unit_rate};
use super::yield_metrics::{macaulay_duration, weighted_average_life};
use crate::error::PoolAnalyticsError;
use crate::math::iterative_pow_recip;
use crate::types::{with_metadata, ComputationOutput, Factor, Money, Rate, Years};
use crate::PoolAnalyticsResult;

/// CPR above which the projection carries a warning.
const HIGH_CPR_WARNING: Rate = dec!(0.50);
/// Longest projectable term (60 years).
pub const MAX_REMAINING_MONTHS: u32 = 720;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Term used to size the level payment each month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationMode {
    /// Re-amortise over the months still remaining (remaining_months - month + 1).
    /// Retires the balance at the final month.
    #[default]
    RemainingTerm,
    /// Size every payment against the original remaining_months, as if the
    /// payment schedule were fixed externally at projection start. Leaves a
    /// residual balance at the final month.
    OriginalTerm,
}

/// Cash-flow projection input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowProjectionInput {
    /// Outstanding pool balance at projection start.
    pub current_balance: Money,
    /// Current pool factor (informational).
    pub pool_factor: Factor,
    /// Weighted average coupon, annual decimal rate (e.g., 0.04 = 4%).
    pub wac: Rate,
    /// Months to maturity.
    pub remaining_months: u32,
    /// Projected annual CPR, held constant.
    pub projected_cpr: Rate,
    #[serde(default)]
    pub amortization_mode: AmortizationMode,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPeriod {
    /// 1-based month index.
    pub month: u32,
    pub scheduled_payment: Money,
    pub scheduled_interest: Money,
    pub scheduled_principal: Money,
    pub prepayment: Money,
    /// Scheduled payment plus prepayment.
    pub total_payment: Money,
    pub ending_balance: Money,
}

/// Schedule aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub total_payments: Money,
    pub total_interest: Money,
    /// Scheduled principal plus prepayments.
    pub total_principal: Money,
    /// Weighted average life in years.
    pub weighted_average_life: Years,
    /// Macaulay duration in years.
    pub duration: Years,
}

/// Projected schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub periods: Vec<CashFlowPeriod>,
    pub summary: CashFlowSummary,
    /// Monthly SMM applied in every period.
    pub projected_smm: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project monthly pool cash flows under a constant CPR.
pub fn project_cash_flows(
    input: &CashFlowProjectionInput,
) -> PoolAnalyticsResult<ComputationOutput<CashFlowSchedule>> {
    let start = Instant::now();
    validate_projection(input)?;

    let mut warnings: Vec<String> = Vec::new();
    let methodology = match input.amortization_mode {
        AmortizationMode::RemainingTerm => {
            "Level-pay amortisation over remaining term with constant CPR prepayment"
        }
        AmortizationMode::OriginalTerm => {
            "Level-pay amortisation over original term with constant CPR prepayment"
        }
    };

    if input.projected_cpr > HIGH_CPR_WARNING {
        warnings.push(format!(
            "CPR of {}% is unusually high",
            input.projected_cpr * dec!(100)
        ));
    }

    let monthly_rate = input.wac / dec!(12);
    let projected_smm = cpr_to_smm(input.projected_cpr);

    if input.current_balance.is_zero() {
        warnings.push("Current balance is zero; no cash flows projected".into());
        let schedule = CashFlowSchedule {
            periods: Vec::new(),
            summary: CashFlowSummary::default(),
            projected_smm,
        };
        let elapsed = start.elapsed().as_micros() as u64;
        return Ok(with_metadata(methodology, input, warnings, elapsed, schedule));
    }

    let mut balance = input.current_balance;
    let mut periods = Vec::with_capacity(input.remaining_months as usize);
    let mut total_payments = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for month in 1..=input.remaining_months {
        if balance <= Decimal::ZERO {
            break;
        }

        let term = match input.amortization_mode {
            AmortizationMode::RemainingTerm => input.remaining_months - month + 1,
            AmortizationMode::OriginalTerm => input.remaining_months,
        };

        let scheduled_interest = balance * monthly_rate;
        let payment = level_payment(balance, monthly_rate, term);
        let scheduled_principal = (payment - scheduled_interest)
            .max(Decimal::ZERO)
            .min(balance);
        let scheduled_payment = scheduled_interest + scheduled_principal;

        let prepayment = (balance - scheduled_principal) * projected_smm;
        let total_payment = scheduled_payment + prepayment;
        let ending_balance = (balance - scheduled_principal - prepayment).max(Decimal::ZERO);

        total_payments += total_payment;
        total_interest += scheduled_interest;
        total_principal += scheduled_principal + prepayment;

        periods.push(CashFlowPeriod {
            month,
            scheduled_payment,
            scheduled_interest,
            scheduled_principal,
            prepayment,
            total_payment,
            ending_balance,
        });

        balance = ending_balance;
    }

    if balance > Decimal::ZERO && input.amortization_mode == AmortizationMode::OriginalTerm {
        warn!(
            "original-term amortisation left {} outstanding after {} months",
            balance, input.remaining_months
        );
        warnings.push(format!(
            "Balance of {} remains after month {} under original-term amortisation",
            balance.round_dp(2),
            input.remaining_months
        ));
    }

    let weighted_average_life = weighted_average_life(&periods);
    let duration = macaulay_duration(&periods, monthly_rate);

    debug!(
        "projected {} periods: WAL {} years, duration {} years",
        periods.len(),
        weighted_average_life,
        duration
    );

    let schedule = CashFlowSchedule {
        periods,
        summary: CashFlowSummary {
            total_payments,
            total_interest,
            total_principal,
            weighted_average_life,
            duration,
        },
        projected_smm,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, schedule))
}

/// Level annuity payment retiring `balance` over `term` months.
/// payment = B·r / (1 - (1+r)^-n); zero coupon pays B / n.
fn level_payment(balance: Money, monthly_rate: Rate, term: u32) -> Money {
    if term == 0 {
        return balance * (Decimal::ONE + monthly_rate);
    }
    if monthly_rate <= Decimal::ZERO {
        return balance / Decimal::from(term);
    }

    let denom = Decimal::ONE - iterative_pow_recip(Decimal::ONE + monthly_rate, term);
    if denom > Decimal::ZERO {
        balance * monthly_rate / denom
    } else {
        balance
    }
}

fn validate_projection(input: &CashFlowProjectionInput) -> PoolAnalyticsResult<()> {
    if input.current_balance < Decimal::ZERO {
        return Err(PoolAnalyticsError::DegenerateInput {
            field: "current_balance".into(),
            reason: "Cannot project a negative starting balance".into(),
        });
    }
    if input.remaining_months == 0 {
        return Err(PoolAnalyticsError::DegenerateInput {
            field: "remaining_months".into(),
            reason: "Remaining months must be greater than zero".into(),
        });
    }
    if input.remaining_months > MAX_REMAINING_MONTHS {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "remaining_months".into(),
            reason: format!(
                "Remaining months must not exceed {}, got {}",
                MAX_REMAINING_MONTHS, input.remaining_months
            ),
        });
    }
    if input.wac < Decimal::ZERO {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "wac".into(),
            reason: "WAC cannot be negative".into(),
        });
    }
    validate_unit_rate("projected_cpr", input.projected_cpr)?;
    validate_unit_rate("pool_factor", input.pool_factor)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
