pub mod cash_flows;
pub mod conventions;
pub mod pool_risk;
pub mod prepayment;
