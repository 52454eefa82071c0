use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use pool_analytics_core::mortgage_analytics::cash_flows::{
    self, AmortizationMode, CashFlowProjectionInput,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AmortizationArg {
    /// Re-amortise over the months still remaining
    RemainingTerm,
    /// Size every payment against the starting term
    OriginalTerm,
}

impl From<AmortizationArg> for AmortizationMode {
    fn from(arg: AmortizationArg) -> Self {
        match arg {
            AmortizationArg::RemainingTerm => AmortizationMode::RemainingTerm,
            AmortizationArg::OriginalTerm => AmortizationMode::OriginalTerm,
        }
    }
}

/// Arguments for cash-flow projection
#[derive(Args)]
pub struct CashFlowArgs {
    /// Path to JSON/YAML file with a projection input
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding pool balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Weighted average coupon as a decimal (e.g. 0.045)
    #[arg(long)]
    pub wac: Option<Decimal>,

    /// Remaining months to maturity
    #[arg(long)]
    pub remaining_months: Option<u32>,

    /// Projected annual CPR as a decimal
    #[arg(long, default_value = "0.06")]
    pub cpr: Decimal,

    /// Current pool factor
    #[arg(long, default_value = "1")]
    pub pool_factor: Decimal,

    /// Level-payment sizing
    #[arg(long, value_enum)]
    pub amortization: Option<AmortizationArg>,
}

pub fn run_cash_flows(args: CashFlowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut projection: CashFlowProjectionInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let (Some(balance), Some(wac), Some(remaining_months)) =
        (args.balance, args.wac, args.remaining_months)
    {
        CashFlowProjectionInput {
            current_balance: balance,
            pool_factor: args.pool_factor,
            wac,
            remaining_months,
            projected_cpr: args.cpr,
            amortization_mode: AmortizationMode::default(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--input <file>, stdin, or --balance/--wac/--remaining-months required for cash flows"
                .into(),
        );
    };

    if let Some(mode) = args.amortization {
        projection.amortization_mode = mode.into();
    }

    let result = cash_flows::project_cash_flows(&projection)?;
    Ok(serde_json::to_value(result)?)
}
