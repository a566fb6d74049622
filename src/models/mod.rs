pub mod audit;
pub mod participant;
pub mod split;
pub mod transaction;
pub mod travel;
pub mod trip;

pub use audit::{AuditAction, AuditLogEntry};
pub use participant::{Participant, Position};
pub use split::{Payer, SettlementSuggestion, SplitDetail, TransactionRole};
pub use transaction::{DistributionMethod, Transaction, TransactionKind};
pub use travel::{
    Accommodation, ConflictKind, ConflictResult, LegScope, Severity, Transport, TransportMode,
};
pub use trip::{Role, Trip, TripMember};
