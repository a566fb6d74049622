use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    /// Derived from the full transaction set on every change, never
    /// incrementally mutated. Positive means the participant is owed money.
    pub net_balance: f64,
}

/// Where a participant stands once all transactions are aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Creditor,
    Debtor,
    Settled,
}
