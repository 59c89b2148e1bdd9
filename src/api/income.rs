use crate::errors::GatewayError;
use crate::gateway::{ApiClient, GatewayRequest};
use crate::models::income::{GroupBy, IncomeStats, IncomeSummary};

pub const SUMMARY_PATH: &str = "/api/income/summary/";
pub const STATS_PATH: &str = "/api/income/stats/";

pub fn stats_request(group_by: GroupBy, year: Option<i32>) -> GatewayRequest {
    let mut path = format!("{}?group_by={}", STATS_PATH, group_by.as_str());
    if let Some(year) = year {
        path.push_str(&format!("&year={}", year));
    }
    GatewayRequest::get(path)
}

impl ApiClient {
    /// GET /api/income/summary/
    pub async fn income_summary(&self) -> Result<IncomeSummary, GatewayError> {
        self.fetch(&GatewayRequest::get(SUMMARY_PATH)).await
    }

    /// GET /api/income/stats/?group_by=..[&year=..]
    pub async fn income_stats(
        &self,
        group_by: GroupBy,
        year: Option<i32>,
    ) -> Result<IncomeStats, GatewayError> {
        self.fetch(&stats_request(group_by, year)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_query() {
        assert_eq!(
            stats_request(GroupBy::Month, Some(2026)).path,
            "/api/income/stats/?group_by=month&year=2026"
        );
        assert_eq!(
            stats_request(GroupBy::Year, None).path,
            "/api/income/stats/?group_by=year"
        );
    }
}
