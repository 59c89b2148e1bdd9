use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::GatewayError;
use crate::gateway::{ApiClient, GatewayRequest};
use crate::models::contribution::{ContributionReceipt, NewContribution};

pub const CONTRIBUTIONS_PATH: &str = "/api/contributions/";

pub const NO_COOPERATIVE_MESSAGE: &str =
    "No cooperative found. Please contact your administrator.";

/// Problems caught before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum ContributionError {
    #[error("{}", NO_COOPERATIVE_MESSAGE)]
    NoCooperative,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiClient {
    /// POST /api/contributions/
    pub async fn submit_contribution(
        &self,
        body: &NewContribution,
    ) -> Result<ContributionReceipt, GatewayError> {
        let req = GatewayRequest::post(CONTRIBUTIONS_PATH).json(body)?;
        self.fetch(&req).await
    }

    /// Submit a rider contribution to their own cooperative.
    ///
    /// The cooperative defaults to the first one the rider can see; the date
    /// defaults to today.
    pub async fn contribute(
        &self,
        amount: Decimal,
        cooperative_id: Option<i64>,
        date: Option<NaiveDate>,
    ) -> Result<ContributionReceipt, ContributionError> {
        if amount <= Decimal::ZERO {
            return Err(ContributionError::InvalidAmount);
        }

        let cooperative = match cooperative_id {
            Some(id) => id,
            None => self
                .list_cooperatives()
                .await?
                .first()
                .map(|c| c.id)
                .ok_or(ContributionError::NoCooperative)?,
        };

        let body = NewContribution {
            cooperative,
            date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            amount,
        };
        tracing::info!(cooperative, amount = %body.amount, date = %body.date, "submitting contribution");
        Ok(self.submit_contribution(&body).await?)
    }
}
