//! Snapshot panel helpers shared by the portfolio analytics.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::PoolAnalyticsError;
use crate::types::PoolSnapshot;
use crate::PoolAnalyticsResult;

/// Keep the most recent snapshot of each pool.
///
/// A row supersedes the one already held for its pool unless both are dated
/// and the held one is strictly later; undated rows and equal dates resolve to
/// the later input position. Pools are returned in order of first appearance.
pub fn latest_snapshots(snapshots: &[PoolSnapshot]) -> Vec<PoolSnapshot> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &PoolSnapshot> = HashMap::new();

    for snap in snapshots {
        let id = snap.pool_id.as_str();
        let stale = match latest.get(id) {
            None => {
                order.push(id);
                false
            }
            Some(held) => matches!(
                (snap.as_of_date, held.as_of_date),
                (Some(candidate), Some(current)) if candidate < current
            ),
        };
        if !stale {
            latest.insert(id, snap);
        }
    }

    order
        .into_iter()
        .filter_map(|id| latest.get(id).map(|s| (*s).clone()))
        .collect()
}

/// Reject snapshots whose attributes are outside their domain.
pub(crate) fn validate_snapshot(snap: &PoolSnapshot) -> PoolAnalyticsResult<()> {
    if snap.pool_factor < Decimal::ZERO || snap.pool_factor > Decimal::ONE {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "pool_factor".into(),
            reason: format!(
                "Pool {} factor must be between 0 and 1, got {}",
                snap.pool_id, snap.pool_factor
            ),
        });
    }
    if snap.current_balance < Decimal::ZERO || snap.original_balance < Decimal::ZERO {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "current_balance".into(),
            reason: format!("Pool {} balances cannot be negative", snap.pool_id),
        });
    }
    if snap.wac < Decimal::ZERO {
        return Err(PoolAnalyticsError::InvalidInput {
            field: "wac".into(),
            reason: format!("Pool {} WAC cannot be negative", snap.pool_id),
        });
    }
    Ok(())
}
