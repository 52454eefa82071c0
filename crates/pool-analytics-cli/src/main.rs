mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::cash_flows::CashFlowArgs;
use commands::conventions::{CprToSmmArgs, SmmToCprArgs};
use commands::pool_risk::PoolPanelArgs;
use commands::prepayment::PrepaymentSpeedArgs;

/// Mortgage pool prepayment and cash-flow analytics
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Mortgage pool prepayment and cash-flow analytics",
    long_about = "A CLI for mortgage pool analytics with decimal precision. Converts \
                  CPR/SMM, estimates realised prepayment speeds from factor histories, \
                  projects pool cash flows, and scores portfolio health and concentration."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an annual CPR to a monthly SMM
    CprToSmm(CprToSmmArgs),
    /// Convert a monthly SMM to an annual CPR
    SmmToCpr(SmmToCprArgs),
    /// Estimate realised prepayment speed from a pool factor history
    PrepaymentSpeed(PrepaymentSpeedArgs),
    /// Project monthly pool cash flows under a constant CPR
    CashFlows(CashFlowArgs),
    /// Score pool and portfolio health
    PoolHealth(PoolPanelArgs),
    /// Balance concentration (HHI) across pools
    Concentration(PoolPanelArgs),
    /// Pool factor distribution summary
    FactorSummary(PoolPanelArgs),
    /// Month-over-month pool factor trend
    FactorTrend(PoolPanelArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::CprToSmm(args) => commands::conventions::run_cpr_to_smm(args),
        Commands::SmmToCpr(args) => commands::conventions::run_smm_to_cpr(args),
        Commands::PrepaymentSpeed(args) => commands::prepayment::run_prepayment_speed(args),
        Commands::CashFlows(args) => commands::cash_flows::run_cash_flows(args),
        Commands::PoolHealth(args) => commands::pool_risk::run_pool_health(args),
        Commands::Concentration(args) => commands::pool_risk::run_concentration(args),
        Commands::FactorSummary(args) => commands::pool_risk::run_factor_summary(args),
        Commands::FactorTrend(args) => commands::pool_risk::run_factor_trend(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
