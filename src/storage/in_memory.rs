use std::collections::HashMap;

use uuid::Uuid;

use crate::error::RoteiroError;
use crate::models::*;
use crate::storage::Storage;

/// Map-backed storage for tests and previews. Membership lives inside the
/// trip record itself, so a trip and its member list never drift apart.
pub struct InMemoryStorage {
    participants: HashMap<Uuid, Participant>,
    trips: HashMap<Uuid, Trip>,
    transactions: HashMap<Uuid, Transaction>,
    transports: HashMap<Uuid, Transport>,
    accommodations: HashMap<Uuid, Accommodation>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            participants: HashMap::new(),
            trips: HashMap::new(),
            transactions: HashMap::new(),
            transports: HashMap::new(),
            accommodations: HashMap::new(),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn create_participant(
        &mut self,
        participant: Participant,
    ) -> Result<Participant, RoteiroError> {
        self.participants.insert(participant.id, participant.clone());
        Ok(participant)
    }

    fn get_participant(&self, user_id: Uuid) -> Option<Participant> {
        self.participants.get(&user_id).cloned()
    }

    fn list_trips(&self) -> Vec<Trip> {
        self.trips.values().cloned().collect()
    }

    fn create_trip(&mut self, trip: Trip) -> Result<Trip, RoteiroError> {
        self.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    fn update_trip(&mut self, trip: Trip) -> Result<Trip, RoteiroError> {
        if !self.trips.contains_key(&trip.id) {
            return Err(RoteiroError::TripNotFound(trip.id.to_string()));
        }
        self.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    fn get_trip(&self, trip_id: Uuid) -> Option<Trip> {
        self.trips.get(&trip_id).cloned()
    }

    fn is_trip_member(&self, trip_id: Uuid, user_id: Uuid) -> bool {
        self.get_member_role(trip_id, user_id).is_some()
    }

    fn add_member(&mut self, member: TripMember) -> Result<(), RoteiroError> {
        let trip = self
            .trips
            .get_mut(&member.trip_id)
            .ok_or_else(|| RoteiroError::TripNotFound(member.trip_id.to_string()))?;
        trip.members.push(member);
        Ok(())
    }

    fn update_member_role(
        &mut self,
        trip_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), RoteiroError> {
        let trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or_else(|| RoteiroError::TripNotFound(trip_id.to_string()))?;
        let member = trip
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or_else(|| RoteiroError::NotTripMember(user_id.to_string()))?;
        member.role = role;
        Ok(())
    }

    fn remove_member(&mut self, trip_id: Uuid, user_id: Uuid) -> Result<(), RoteiroError> {
        let trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or_else(|| RoteiroError::TripNotFound(trip_id.to_string()))?;
        let before = trip.members.len();
        trip.members.retain(|m| m.user_id != user_id);
        if trip.members.len() == before {
            return Err(RoteiroError::NotTripMember(user_id.to_string()));
        }
        Ok(())
    }

    fn get_member_role(&self, trip_id: Uuid, user_id: Uuid) -> Option<Role> {
        self.trips.get(&trip_id).and_then(|trip| {
            trip.members
                .iter()
                .find(|m| m.user_id == user_id)
                .map(|m| m.role.clone())
        })
    }

    fn list_members(&self, trip_id: Uuid) -> Vec<TripMember> {
        self.trips
            .get(&trip_id)
            .map(|trip| trip.members.clone())
            .unwrap_or_default()
    }

    fn create_transaction(&mut self, tx: Transaction) -> Result<Transaction, RoteiroError> {
        self.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    fn update_transaction(&mut self, tx: Transaction) -> Result<Transaction, RoteiroError> {
        if !self.transactions.contains_key(&tx.id) {
            return Err(RoteiroError::TransactionNotFound(tx.id.to_string()));
        }
        self.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    fn get_transaction(&self, tx_id: Uuid) -> Option<Transaction> {
        self.transactions.get(&tx_id).cloned()
    }

    fn list_transactions(&self, trip_id: Uuid) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .values()
            .filter(|tx| tx.trip_id == trip_id)
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.created_at);
        txs
    }

    fn add_transport(&mut self, leg: Transport) -> Result<Transport, RoteiroError> {
        self.transports.insert(leg.id, leg.clone());
        Ok(leg)
    }

    fn list_transports(&self, trip_id: Uuid) -> Vec<Transport> {
        self.transports
            .values()
            .filter(|t| t.trip_id == trip_id)
            .cloned()
            .collect()
    }

    fn add_accommodation(&mut self, stay: Accommodation) -> Result<Accommodation, RoteiroError> {
        self.accommodations.insert(stay.id, stay.clone());
        Ok(stay)
    }

    fn list_accommodations(&self, trip_id: Uuid) -> Vec<Accommodation> {
        self.accommodations
            .values()
            .filter(|a| a.trip_id == trip_id)
            .cloned()
            .collect()
    }
}
