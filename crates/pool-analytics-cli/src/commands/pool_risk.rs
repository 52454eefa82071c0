use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use pool_analytics_core::pool_risk::{concentration, factor_summary, factor_trend, health};
use pool_analytics_core::PoolSnapshot;

use crate::input;

/// Arguments shared by the portfolio commands
#[derive(Args)]
pub struct PoolPanelArgs {
    /// Path to JSON/YAML file with pool snapshots
    #[arg(long)]
    pub input: Option<String>,
}

/// A bare array of snapshots or an object with a `pools` array.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolPanel {
    Rows(Vec<PoolSnapshot>),
    Wrapped { pools: Vec<PoolSnapshot> },
}

impl PoolPanel {
    fn into_rows(self) -> Vec<PoolSnapshot> {
        match self {
            PoolPanel::Rows(rows) | PoolPanel::Wrapped { pools: rows } => rows,
        }
    }
}

fn read_panel(args: &PoolPanelArgs, command: &str) -> Result<Vec<PoolSnapshot>, Box<dyn std::error::Error>> {
    let panel: PoolPanel = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(format!("--input <file> or stdin required for {}", command).into());
    };
    Ok(panel.into_rows())
}

pub fn run_pool_health(args: PoolPanelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = read_panel(&args, "pool health")?;
    let result = health::analyze_portfolio_health(&rows)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_concentration(args: PoolPanelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = read_panel(&args, "concentration risk")?;
    let result = concentration::calculate_concentration_risk(&rows)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_factor_summary(args: PoolPanelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = read_panel(&args, "factor summary")?;
    let result = factor_summary::summarize_pool_factors(&rows)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_factor_trend(args: PoolPanelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = read_panel(&args, "factor trend")?;
    let result = factor_trend::analyze_factor_trend(&rows)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_accepts_both_shapes() {
        let row = serde_json::json!({
            "pool_id": "P1",
            "pool_factor": "0.8",
            "original_balance": "1000000",
            "current_balance": "800000",
            "wac": "0.04"
        });
        let bare: PoolPanel = serde_json::from_value(serde_json::json!([row.clone()])).unwrap();
        let wrapped: PoolPanel = serde_json::from_value(serde_json::json!({ "pools": [row] })).unwrap();
        assert_eq!(bare.into_rows().len(), 1);
        assert_eq!(wrapped.into_rows()[0].pool_id, "P1");
    }
}
