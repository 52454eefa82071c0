pub mod error;
pub mod math;
pub mod types;

#[cfg(feature = "mortgage_analytics")]
pub mod mortgage_analytics;

#[cfg(feature = "pool_risk")]
pub mod pool_risk;

pub use error::PoolAnalyticsError;
pub use types::*;

/// Standard result type for all pool analytics operations
pub type PoolAnalyticsResult<T> = Result<T, PoolAnalyticsError>;
