use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `GET /api/income/summary/`. The server encodes the total as a decimal
/// string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeSummary {
    pub total_income: Decimal,
}

/// Bucket size for income stats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Month,
    Year,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Month => "month",
            GroupBy::Year => "year",
        }
    }
}

/// One bucket of the stats series. `period` is `YYYY-MM` for monthly
/// grouping and `YYYY` for yearly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatPoint {
    pub period: String,
    pub total: Decimal,
}

/// `GET /api/income/stats/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IncomeStats {
    #[serde(default)]
    pub data: Vec<StatPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_string_encoded_totals() {
        let summary: IncomeSummary =
            serde_json::from_str(r#"{"total_income": "125000.50"}"#).unwrap();
        assert_eq!(summary.total_income, Decimal::from_str("125000.50").unwrap());

        let stats: IncomeStats = serde_json::from_str(
            r#"{"data": [{"period": "2026-01", "total": "15000.00"}, {"period": "2026-02", "total": "0"}]}"#,
        )
        .unwrap();
        assert_eq!(stats.data.len(), 2);
        assert_eq!(stats.data[0].total, Decimal::from(15000));
    }
}
