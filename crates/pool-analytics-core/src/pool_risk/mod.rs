//! Portfolio-level health, concentration and factor analytics over pool
//! snapshots.

pub mod concentration;
pub mod factor_summary;
pub mod factor_trend;
pub mod health;
pub mod snapshots;

pub use concentration::{
    calculate_concentration_risk, classify_concentration, ConcentrationLevel, ConcentrationReport,
    PoolWeight,
};
pub use factor_summary::{summarize_pool_factors, FactorDistribution, PoolFactorSummary};
pub use factor_trend::{
    analyze_factor_trend, DatedFactor, FactorTrendDirection, FactorTrendEstimate, PoolFactorTrend,
};
pub use health::{
    analyze_portfolio_health, score_pool_health, HealthCategory, HealthComponents,
    HealthDistribution, PoolHealthRecord, PoolHealthScore, PortfolioHealthOutput,
    PortfolioHealthSummary,
};
pub use snapshots::latest_snapshots;
