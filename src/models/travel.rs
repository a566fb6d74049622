use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransportMode {
    Flight,
    Bus,
    Train,
    Car,
    Ferry,
}

/// Whether a leg crosses a border. Selects the connection buffer used by
/// the conflict detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegScope {
    #[default]
    Domestic,
    International,
}

/// A transport leg as entered by the user. Dates are `YYYY-MM-DD`, times
/// `HH:MM`; both are free-form strings and may fail to parse, in which case
/// the conflict detector skips the record rather than aborting the scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transport {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub mode: TransportMode,
    pub origin: String,
    pub destination: String,
    /// Structured city identifier for the arrival side, when known.
    pub arrival_city: Option<String>,
    pub scope: LegScope,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
}

/// A lodging reservation. Check-in/check-out times are normalized to the
/// standard hotel policy by the conflict detector, not taken from data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Accommodation {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    /// Structured city identifier, when known.
    pub city: Option<String>,
    pub check_in_date: String,
    pub check_out_date: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    TightConnection,
    CheckoutAfterFlight,
    CheckinBeforeFlight,
    LocationMismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One advisory finding from the conflict detector. Ephemeral: recomputed
/// on demand and never persisted.
#[derive(Clone, Debug, Serialize)]
pub struct ConflictResult {
    pub kind: ConflictKind,
    pub severity: Severity,
    /// The record that was being added or edited.
    pub subject_id: Uuid,
    /// The existing record it conflicts with.
    pub other_id: Uuid,
    pub message: String,
    pub suggested_fix: Option<String>,
    /// Connection gap in minutes, for tight-connection findings.
    pub gap_minutes: Option<i64>,
}
