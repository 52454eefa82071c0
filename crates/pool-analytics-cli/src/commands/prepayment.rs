use chrono::{Months, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use pool_analytics_core::mortgage_analytics::prepayment_speed::{
    self, FactorObservation, PrepaymentSpeedInput, SpeedEstimatorConfig,
};

use crate::input;

/// Arguments for realised prepayment speed estimation
#[derive(Args)]
pub struct PrepaymentSpeedArgs {
    /// Path to JSON/YAML file with a pool factor history
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated monthly pool factors, oldest first (e.g. "1.0,0.98,0.96")
    #[arg(long, value_delimiter = ',')]
    pub factors: Option<Vec<Decimal>>,

    /// Date of the first factor in --factors (YYYY-MM-DD); later factors are monthly
    #[arg(long, default_value = "2024-01-01")]
    pub start_date: NaiveDate,

    /// Pool identifier carried into the assumptions
    #[arg(long)]
    pub pool_id: Option<String>,

    /// Path to JSON/YAML estimator configuration
    #[arg(long)]
    pub config: Option<String>,

    /// Benchmark CPR for the PSA-style multiplier (overrides config)
    #[arg(long)]
    pub benchmark_cpr: Option<Decimal>,

    /// Number of trailing monthly CPRs to report (overrides config)
    #[arg(long)]
    pub history_window: Option<usize>,
}

pub fn run_prepayment_speed(args: PrepaymentSpeedArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut speed_input: PrepaymentSpeedInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(ref factors) = args.factors {
        PrepaymentSpeedInput {
            pool_id: None,
            factors: monthly_series(args.start_date, factors)?,
            config: SpeedEstimatorConfig::default(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file>, --factors or stdin required for prepayment speed".into());
    };

    if let Some(ref path) = args.config {
        speed_input.config = input::file::read_input(path)?;
    }
    if let Some(benchmark) = args.benchmark_cpr {
        speed_input.config.benchmark_cpr = benchmark;
    }
    if let Some(window) = args.history_window {
        speed_input.config.history_window = window;
    }
    if args.pool_id.is_some() {
        speed_input.pool_id = args.pool_id;
    }

    let result = prepayment_speed::estimate_prepayment_speed(&speed_input)?;
    Ok(serde_json::to_value(result)?)
}

fn monthly_series(
    start: NaiveDate,
    factors: &[Decimal],
) -> Result<Vec<FactorObservation>, Box<dyn std::error::Error>> {
    factors
        .iter()
        .enumerate()
        .map(|(i, factor)| -> Result<FactorObservation, Box<dyn std::error::Error>> {
            let date = start
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| format!("Date overflow adding {} months to {}", i, start))?;
            Ok(FactorObservation {
                date,
                pool_factor: *factor,
            })
        })
        .collect()
}
