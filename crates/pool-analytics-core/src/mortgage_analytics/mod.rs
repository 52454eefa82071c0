//! Pool-level prepayment and cash-flow analytics.

pub mod cash_flows;
pub mod conventions;
pub mod prepayment_speed;
pub mod yield_metrics;

pub use cash_flows::{
    project_cash_flows, AmortizationMode, CashFlowPeriod, CashFlowProjectionInput,
    CashFlowSchedule, CashFlowSummary,
};
pub use conventions::{convert_cpr_to_smm, convert_smm_to_cpr, cpr_to_smm, smm_to_cpr};
pub use prepayment_speed::{
    estimate_prepayment_speed, FactorObservation, PrepaymentSpeedEstimate, PrepaymentSpeedInput,
    PrepaymentSpeedMetrics, PrepaymentTrend, SpeedEstimatorConfig,
};
pub use yield_metrics::{macaulay_duration, weighted_average_life};
