//! Cost categorization by absolute expense thresholds.

use super::{classify, COST_BINS};
use crate::error::AnalyticsResult;
use crate::rows::{CategorizedRow, CostAggregateRow, Tier};

/// Labels each row from its total cost alone, preserving input order.
pub fn categorize_costs(
    rows: Vec<CostAggregateRow>,
) -> AnalyticsResult<Vec<CategorizedRow<CostAggregateRow, Tier>>> {
    rows.into_iter()
        .map(|row| {
            let category = classify(&COST_BINS, "total_cost", row.total_cost)?;
            Ok(CategorizedRow { row, category })
        })
        .collect()
}
