use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "OWNER",
            Role::Member => "MEMBER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripMember {
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    /// Currency every balance is aggregated in.
    pub base_currency: String,
    pub owner_id: Uuid,
    /// When set, only the author of a transaction may edit or delete it.
    pub strict_editing: bool,
    pub join_link: String,
    pub members: Vec<TripMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
