use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One payer's contribution to a transaction. Multiple payers are allowed;
/// each contributes independently to the paid side of the balance equation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payer {
    pub user_id: Uuid,
    pub amount_paid: f64,
}

/// One participant's row in a transaction's split breakdown. Recomputed
/// wholesale whenever amount, method or participant selection changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitDetail {
    pub user_id: Uuid,
    pub owed_share: f64,
    pub percentage: Option<f64>,
    pub shares: Option<f64>,
    /// Excluded participants keep a row with `is_involved: false`; they do
    /// not count toward the split total.
    pub is_involved: bool,
}

/// A participant's side of a single transaction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionRole {
    Lent(f64),
    Borrowed(f64),
    Even,
}

/// One transfer in a settlement plan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettlementSuggestion {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: f64,
}
