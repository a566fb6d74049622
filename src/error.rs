use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum RoteiroError {
    /// Participant with given ID not found
    #[error("Participant {0} not found")]
    ParticipantNotFound(String),

    /// Trip with given ID not found
    #[error("Trip {0} not found")]
    TripNotFound(String),

    /// Participant is already a member of the trip
    #[error("Participant {0} is already a trip member")]
    AlreadyTripMember(String),

    /// Participant is not a member of the trip
    #[error("Participant {0} is not a trip member")]
    NotTripMember(String),

    /// Participant is not allowed to perform the operation
    #[error("Participant {0} is not authorized")]
    NotAuthorized(String),

    /// Join link is not valid or not found
    #[error("Invalid join link")]
    InvalidJoinLink,

    /// A split was requested over an empty participant set
    #[error("No participants selected for split")]
    EmptySplit,

    /// Split shares do not add up to the transaction total
    #[error("Split shares sum {actual} does not match total {expected}")]
    SplitMismatch { expected: f64, actual: f64 },

    /// Payer amounts do not add up to the transaction total
    #[error("Payer amounts sum {actual} does not match total {expected}")]
    PayerMismatch { expected: f64, actual: f64 },

    /// Transaction amount must be non-negative
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Transaction with given ID not found
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),

    /// Transaction has already been deleted
    #[error("Transaction {0} already deleted")]
    AlreadyDeleted(String),

    /// Cannot record a settlement from a participant to themselves
    #[error("Cannot record settlement to self")]
    SelfSettlement,

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}
