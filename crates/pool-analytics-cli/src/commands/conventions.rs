use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use pool_analytics_core::mortgage_analytics::conventions;

/// Arguments for CPR to SMM conversion
#[derive(Args)]
pub struct CprToSmmArgs {
    /// Annual CPR as a decimal (e.g. 0.06 for 6%)
    #[arg(long)]
    pub cpr: Decimal,
}

/// Arguments for SMM to CPR conversion
#[derive(Args)]
pub struct SmmToCprArgs {
    /// Monthly SMM as a decimal (e.g. 0.005143)
    #[arg(long)]
    pub smm: Decimal,
}

#[derive(Serialize)]
struct SmmOutput {
    smm: Decimal,
    from_cpr: Decimal,
}

#[derive(Serialize)]
struct CprOutput {
    cpr: Decimal,
    from_smm: Decimal,
}

pub fn run_cpr_to_smm(args: CprToSmmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let smm = conventions::convert_cpr_to_smm(args.cpr)?;
    Ok(serde_json::to_value(SmmOutput {
        smm,
        from_cpr: args.cpr,
    })?)
}

pub fn run_smm_to_cpr(args: SmmToCprArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cpr = conventions::convert_smm_to_cpr(args.smm)?;
    Ok(serde_json::to_value(CprOutput {
        cpr,
        from_smm: args.smm,
    })?)
}
