//! Income stats series for the progress chart.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::api::income::stats_request;
use crate::gateway::{ApiClient, CancelToken};
use crate::models::income::{GroupBy, IncomeStats, StatPoint};

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Load the series. `year` only applies to monthly grouping. Failure yields
/// an empty series.
pub async fn load_stats(
    client: &ApiClient,
    group_by: GroupBy,
    year: Option<i32>,
    cancel: &CancelToken,
) -> Vec<StatPoint> {
    let year = match group_by {
        GroupBy::Month => year,
        GroupBy::Year => None,
    };
    match client
        .fetch_with_cancel::<IncomeStats>(&stats_request(group_by, year), cancel)
        .await
    {
        Ok(stats) => stats.data,
        Err(e) => {
            warn!(group_by = group_by.as_str(), "income stats unavailable: {}", e);
            Vec::new()
        }
    }
}

/// Axis label for a period: `2026-03` becomes `Mar`, years pass through.
/// Unparseable monthly periods are shown as-is.
pub fn period_label(period: &str, group_by: GroupBy) -> String {
    if group_by == GroupBy::Year {
        return period.to_string();
    }
    period
        .split_once('-')
        .and_then(|(_, month)| month.parse::<usize>().ok())
        .and_then(|m| m.checked_sub(1))
        .and_then(|idx| MONTHS_SHORT.get(idx))
        .map(|s| s.to_string())
        .unwrap_or_else(|| period.to_string())
}

/// Short amount for chart ticks: `1.2M`, `15K`, or the plain value.
pub fn format_compact(value: Decimal) -> String {
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::from(1_000);

    if value >= million {
        let mut scaled = (value / million).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        scaled.rescale(1);
        format!("{}M", scaled)
    } else if value >= thousand {
        let scaled = (value / thousand).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("{}K", scaled.normalize())
    } else {
        value.normalize().to_string()
    }
}
