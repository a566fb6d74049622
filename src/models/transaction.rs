use super::split::{Payer, SplitDetail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Expense,
    Settlement,
}

/// Rule used to divide a shared expense among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DistributionMethod {
    Equal,
    Exact,
    Percentage,
    Shares,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Option<Uuid>,
    pub amount_original: f64,
    pub currency_original: String,
    pub exchange_rate_to_base: Option<f64>,
    /// Converted amount in the trip's base currency. Populated at creation
    /// time for foreign-currency transactions; balances are wrong if it is
    /// missing for one.
    pub amount_in_base: Option<f64>,
    pub distribution_method: DistributionMethod,
    pub payers: Vec<Payer>,
    pub split_breakdown: Vec<SplitDetail>,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Amount used for aggregation: the base-currency conversion when one
    /// exists, the original amount otherwise.
    pub fn base_amount(&self) -> f64 {
        self.amount_in_base.unwrap_or(self.amount_original)
    }
}
