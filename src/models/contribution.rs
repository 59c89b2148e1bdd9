use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/contributions/`. `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewContribution {
    pub cooperative: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// What the server echoes back for a created contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributionReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    pub cooperative: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<ContributionStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionStatus {
    Pending,
    Verified,
}
