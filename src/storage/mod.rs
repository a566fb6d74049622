use uuid::Uuid;

use crate::error::RoteiroError;
use crate::models::*;

pub trait Storage {
    fn create_participant(&mut self, participant: Participant)
    -> Result<Participant, RoteiroError>;
    fn get_participant(&self, user_id: Uuid) -> Option<Participant>;

    fn list_trips(&self) -> Vec<Trip>;
    fn create_trip(&mut self, trip: Trip) -> Result<Trip, RoteiroError>;
    fn update_trip(&mut self, trip: Trip) -> Result<Trip, RoteiroError>;
    fn get_trip(&self, trip_id: Uuid) -> Option<Trip>;
    fn is_trip_member(&self, trip_id: Uuid, user_id: Uuid) -> bool;

    fn add_member(&mut self, member: TripMember) -> Result<(), RoteiroError>;
    fn update_member_role(
        &mut self,
        trip_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), RoteiroError>;
    fn remove_member(&mut self, trip_id: Uuid, user_id: Uuid) -> Result<(), RoteiroError>;
    fn get_member_role(&self, trip_id: Uuid, user_id: Uuid) -> Option<Role>;
    fn list_members(&self, trip_id: Uuid) -> Vec<TripMember>;

    fn create_transaction(&mut self, tx: Transaction) -> Result<Transaction, RoteiroError>;
    fn update_transaction(&mut self, tx: Transaction) -> Result<Transaction, RoteiroError>;
    fn get_transaction(&self, tx_id: Uuid) -> Option<Transaction>;
    fn list_transactions(&self, trip_id: Uuid) -> Vec<Transaction>;

    fn add_transport(&mut self, leg: Transport) -> Result<Transport, RoteiroError>;
    fn list_transports(&self, trip_id: Uuid) -> Vec<Transport>;

    fn add_accommodation(&mut self, stay: Accommodation) -> Result<Accommodation, RoteiroError>;
    fn list_accommodations(&self, trip_id: Uuid) -> Vec<Accommodation>;
}

pub mod in_memory;
