use crate::conflict::{check_accommodation_conflicts, check_transport_conflicts};
use crate::error::RoteiroError;
use crate::finance;
use crate::logger::AuditLogger;
use crate::models::*;
use crate::storage::Storage;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde_json;
use std::collections::HashMap;
use uuid::Uuid;

/// Form payload for creating or editing an expense. The split breakdown is
/// never passed in: it is always recomputed wholesale from these fields so
/// the normalization invariants hold after any edit.
#[derive(Clone, Debug)]
pub struct ExpenseDraft {
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Option<Uuid>,
    pub amount_original: f64,
    pub currency_original: String,
    pub exchange_rate_to_base: Option<f64>,
    pub distribution_method: DistributionMethod,
    pub participants: Vec<Uuid>,
    pub custom_values: Option<HashMap<Uuid, f64>>,
    pub payers: Vec<Payer>,
}

pub struct TripService<'a> {
    pub storage: &'a mut dyn Storage,
    pub audit_logger: &'a mut dyn AuditLogger,
}

impl<'a> TripService<'a> {
    pub fn new(storage: &'a mut dyn Storage, audit_logger: &'a mut dyn AuditLogger) -> Self {
        info!("Initializing TripService");
        Self {
            storage,
            audit_logger,
        }
    }

    // PARTICIPANT MANAGEMENT

    pub fn create_participant(&mut self, name: String) -> Result<Participant, RoteiroError> {
        info!("Creating participant '{}'", name);
        let participant = Participant {
            id: Uuid::new_v4(),
            name,
            net_balance: 0.0,
        };

        let created = self.storage.create_participant(participant)?;
        debug!("Participant created with ID: {}", created.id);

        self.audit_logger.log(AuditLogEntry::new(
            created.id,
            AuditAction::CreateParticipant,
            &serde_json::json!({ "participant_id": created.id }),
            Utc::now(),
        ));

        Ok(created)
    }

    // TRIP MANAGEMENT

    pub fn create_trip(
        &mut self,
        owner: &Participant,
        name: String,
        base_currency: String,
        strict_editing: bool,
    ) -> Result<Trip, RoteiroError> {
        info!("Creating trip '{}' for owner ID: {}", name, owner.id);
        let now = Utc::now();
        let trip_id = Uuid::new_v4();
        let trip = Trip {
            id: trip_id,
            name,
            base_currency,
            owner_id: owner.id,
            strict_editing,
            join_link: Self::generate_join_link(),
            created_at: now,
            updated_at: now,
            members: vec![TripMember {
                trip_id,
                user_id: owner.id,
                role: Role::Owner,
                joined_at: now,
            }],
        };

        let created = self.storage.create_trip(trip)?;
        debug!("Trip created with ID: {}", created.id);

        self.audit_logger.log(AuditLogEntry::new(
            owner.id,
            AuditAction::CreateTrip,
            &serde_json::json!({ "trip_id": created.id }),
            now,
        ));

        Ok(created)
    }

    pub fn update_trip(
        &mut self,
        user: &Participant,
        trip: Trip,
        new_name: Option<String>,
        new_strict_editing: Option<bool>,
    ) -> Result<Trip, RoteiroError> {
        info!("Updating trip ID: {} by user ID: {}", trip.id, user.id);
        let role = self
            .storage
            .get_member_role(trip.id, user.id)
            .ok_or_else(|| RoteiroError::NotTripMember(user.id.to_string()))?;
        if role != Role::Owner {
            warn!(
                "User {} attempted to update trip {} without owner role",
                user.id, trip.id
            );
            return Err(RoteiroError::NotAuthorized(user.id.to_string()));
        }

        let mut updated_trip = trip;
        if let Some(name) = new_name {
            updated_trip.name = name;
        }
        if let Some(strict) = new_strict_editing {
            updated_trip.strict_editing = strict;
        }
        updated_trip.updated_at = Utc::now();

        let res = self.storage.update_trip(updated_trip)?;
        debug!("Trip updated: {:?}", res);

        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::UpdateTrip,
            &serde_json::json!({ "trip_id": res.id }),
            Utc::now(),
        ));

        Ok(res)
    }

    pub fn transfer_ownership(
        &mut self,
        current_owner: &Participant,
        trip: &Trip,
        new_owner_id: Uuid,
    ) -> Result<(), RoteiroError> {
        info!(
            "Transferring ownership of trip {} from user {} to user {}",
            trip.id, current_owner.id, new_owner_id
        );
        let role = self
            .storage
            .get_member_role(trip.id, current_owner.id)
            .ok_or_else(|| RoteiroError::NotTripMember(current_owner.id.to_string()))?;
        if role != Role::Owner {
            warn!(
                "User {} attempted to transfer ownership of trip {} without owner role",
                current_owner.id, trip.id
            );
            return Err(RoteiroError::NotAuthorized(current_owner.id.to_string()));
        }
        if !self.storage.is_trip_member(trip.id, new_owner_id) {
            warn!(
                "New owner {} is not a member of trip {}",
                new_owner_id, trip.id
            );
            return Err(RoteiroError::NotTripMember(new_owner_id.to_string()));
        }

        let mut updated_trip = trip.clone();
        updated_trip.owner_id = new_owner_id;
        updated_trip.updated_at = Utc::now();

        self.storage.update_trip(updated_trip)?;
        self.storage
            .update_member_role(trip.id, current_owner.id, Role::Member)?;
        self.storage
            .update_member_role(trip.id, new_owner_id, Role::Owner)?;

        self.audit_logger.log(AuditLogEntry::new(
            current_owner.id,
            AuditAction::TransferOwnership,
            &serde_json::json!({ "trip_id": trip.id, "new_owner_id": new_owner_id }),
            Utc::now(),
        ));

        debug!("Ownership transferred for trip {}", trip.id);
        Ok(())
    }

    pub fn join_trip_by_link(
        &mut self,
        user: &Participant,
        join_link: &str,
    ) -> Result<TripMember, RoteiroError> {
        info!(
            "User {} attempting to join trip via link: {}",
            user.id, join_link
        );
        let trip = self
            .storage
            .list_trips()
            .into_iter()
            .find(|t| t.join_link == join_link)
            .ok_or_else(|| {
                warn!("Invalid join link: {}", join_link);
                RoteiroError::InvalidJoinLink
            })?;

        if self.storage.is_trip_member(trip.id, user.id) {
            warn!("User {} already in trip {}", user.id, trip.id);
            return Err(RoteiroError::AlreadyTripMember(user.id.to_string()));
        }

        let now = Utc::now();
        let membership = TripMember {
            trip_id: trip.id,
            user_id: user.id,
            role: Role::Member,
            joined_at: now,
        };
        self.storage.add_member(membership.clone())?;

        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::JoinTrip,
            &serde_json::json!({ "trip_id": trip.id }),
            now,
        ));

        debug!("User {} joined trip {}", user.id, trip.id);
        Ok(membership)
    }

    pub fn remove_member(
        &mut self,
        trip: &Trip,
        user: &Participant,
        target_user_id: Uuid,
    ) -> Result<(), RoteiroError> {
        info!(
            "User {} attempting to remove user {} from trip {}",
            user.id, target_user_id, trip.id
        );
        let role = self
            .storage
            .get_member_role(trip.id, user.id)
            .ok_or_else(|| RoteiroError::NotTripMember(user.id.to_string()))?;
        if role != Role::Owner {
            warn!(
                "User {} attempted to remove a member of trip {} without owner role",
                user.id, trip.id
            );
            return Err(RoteiroError::NotAuthorized(user.id.to_string()));
        }
        if trip.owner_id == target_user_id {
            warn!(
                "Attempted to remove owner {} from trip {}",
                target_user_id, trip.id
            );
            return Err(RoteiroError::NotAuthorized(user.id.to_string()));
        }

        self.storage.remove_member(trip.id, target_user_id)?;
        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::RemoveMember,
            &serde_json::json!({ "trip_id": trip.id, "target_user_id": target_user_id }),
            Utc::now(),
        ));

        debug!("User {} removed from trip {}", target_user_id, trip.id);
        Ok(())
    }

    // EXPENSE MANAGEMENT

    /// Validates a draft against the trip and computes the stored pieces:
    /// base-currency conversion, wholesale breakdown recompute, split and
    /// payer sum checks.
    fn build_expense(
        &self,
        trip: &Trip,
        draft: &ExpenseDraft,
    ) -> Result<(Option<f64>, Vec<SplitDetail>), RoteiroError> {
        if draft.amount_original < 0.0 {
            warn!("Negative amount {} rejected", draft.amount_original);
            return Err(RoteiroError::InvalidAmount(draft.amount_original));
        }

        for payer in &draft.payers {
            if !self.storage.is_trip_member(trip.id, payer.user_id) {
                warn!("Payer {} not in trip {}", payer.user_id, trip.id);
                return Err(RoteiroError::NotTripMember(payer.user_id.to_string()));
            }
        }
        for user_id in &draft.participants {
            if !self.storage.is_trip_member(trip.id, *user_id) {
                warn!("User {} in split not in trip {}", user_id, trip.id);
                return Err(RoteiroError::NotTripMember(user_id.to_string()));
            }
        }

        let amount_in_base = draft
            .exchange_rate_to_base
            .map(|rate| finance::round2(draft.amount_original * rate));
        let total = amount_in_base.unwrap_or(draft.amount_original);

        let breakdown = finance::calculate_split_breakdown(
            total,
            &draft.participants,
            draft.distribution_method,
            draft.custom_values.as_ref(),
        )?;

        // EQUAL and SHARES are normalized by construction; the methods that
        // trust caller-entered values get checked before anything is saved.
        if matches!(
            draft.distribution_method,
            DistributionMethod::Exact | DistributionMethod::Percentage
        ) {
            if let Err(err) = finance::validate_split_totals(total, &breakdown) {
                warn!("Split validation failed for trip {}: {}", trip.id, err);
                return Err(err);
            }
        }

        if let Err(err) = finance::validate_payer_totals(total, &draft.payers) {
            warn!("Payer validation failed for trip {}: {}", trip.id, err);
            return Err(err);
        }

        Ok((amount_in_base, breakdown))
    }

    pub fn add_expense(
        &mut self,
        trip: &Trip,
        added_by: &Participant,
        draft: ExpenseDraft,
    ) -> Result<Transaction, RoteiroError> {
        info!(
            "Creating expense in trip {} by user {} for amount {} {}",
            trip.id, added_by.id, draft.amount_original, draft.currency_original
        );
        let (amount_in_base, breakdown) = self.build_expense(trip, &draft)?;

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            kind: TransactionKind::Expense,
            description: draft.description,
            date: draft.date,
            category_id: draft.category_id,
            amount_original: draft.amount_original,
            currency_original: draft.currency_original,
            exchange_rate_to_base: draft.exchange_rate_to_base,
            amount_in_base,
            distribution_method: draft.distribution_method,
            payers: draft.payers,
            split_breakdown: breakdown,
            added_by: added_by.id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.storage.create_transaction(tx)?;
        debug!("Expense created with ID: {}", created.id);

        self.audit_logger.log(AuditLogEntry::new(
            added_by.id,
            AuditAction::CreateTransaction,
            &serde_json::json!({
                "transaction_id": created.id,
                "trip_id": trip.id,
                "amount": created.amount_original,
            }),
            now,
        ));

        Ok(created)
    }

    pub fn update_expense(
        &mut self,
        trip: &Trip,
        transaction: &Transaction,
        user: &Participant,
        draft: ExpenseDraft,
    ) -> Result<Transaction, RoteiroError> {
        info!(
            "Updating expense {} in trip {} by user {}",
            transaction.id, trip.id, user.id
        );
        if !self.can_edit_transaction(trip, transaction, user.id) {
            warn!(
                "User {} not permitted to edit transaction {}",
                user.id, transaction.id
            );
            return Err(RoteiroError::NotAuthorized(user.id.to_string()));
        }

        let (amount_in_base, breakdown) = self.build_expense(trip, &draft)?;

        let now = Utc::now();
        let updated_tx = Transaction {
            description: draft.description,
            date: draft.date,
            category_id: draft.category_id,
            amount_original: draft.amount_original,
            currency_original: draft.currency_original,
            exchange_rate_to_base: draft.exchange_rate_to_base,
            amount_in_base,
            distribution_method: draft.distribution_method,
            payers: draft.payers,
            split_breakdown: breakdown,
            updated_at: now,
            ..transaction.clone()
        };
        let saved = self.storage.update_transaction(updated_tx)?;
        debug!("Expense updated: {}", saved.id);

        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::UpdateTransaction,
            &serde_json::json!({
                "transaction_id": saved.id,
                "trip_id": trip.id,
                "new_amount": saved.amount_original,
            }),
            now,
        ));

        Ok(saved)
    }

    pub fn delete_expense(
        &mut self,
        trip: &Trip,
        transaction: &Transaction,
        user: &Participant,
    ) -> Result<Transaction, RoteiroError> {
        info!(
            "Soft deleting transaction {} in trip {} by user {}",
            transaction.id, trip.id, user.id
        );
        if !self.can_edit_transaction(trip, transaction, user.id) {
            warn!(
                "User {} not permitted to delete transaction {}",
                user.id, transaction.id
            );
            return Err(RoteiroError::NotAuthorized(user.id.to_string()));
        }
        if transaction.deleted_at.is_some() {
            warn!("Transaction {} already deleted", transaction.id);
            return Err(RoteiroError::AlreadyDeleted(transaction.id.to_string()));
        }

        let now = Utc::now();
        let deleted_tx = Transaction {
            deleted_at: Some(now),
            updated_at: now,
            ..transaction.clone()
        };
        let saved = self.storage.update_transaction(deleted_tx)?;
        debug!("Transaction soft deleted: {}", saved.id);

        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::DeleteTransaction,
            &serde_json::json!({ "transaction_id": saved.id, "trip_id": trip.id }),
            now,
        ));

        Ok(saved)
    }

    /// Records a repayment as a settlement transaction: the payer fronts
    /// the amount, the receiver owes it, and the regular balance math does
    /// the rest.
    pub fn record_settlement(
        &mut self,
        trip: &Trip,
        from: &Participant,
        to_user_id: Uuid,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Transaction, RoteiroError> {
        info!(
            "Recording settlement of {} from {} to {} in trip {}",
            amount, from.id, to_user_id, trip.id
        );
        if from.id == to_user_id {
            return Err(RoteiroError::SelfSettlement);
        }
        if amount <= 0.0 {
            return Err(RoteiroError::InvalidAmount(amount));
        }
        if !self.storage.is_trip_member(trip.id, from.id) {
            return Err(RoteiroError::NotTripMember(from.id.to_string()));
        }
        if !self.storage.is_trip_member(trip.id, to_user_id) {
            return Err(RoteiroError::NotTripMember(to_user_id.to_string()));
        }

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            kind: TransactionKind::Settlement,
            description: "Settlement".to_string(),
            date,
            category_id: None,
            amount_original: amount,
            currency_original: trip.base_currency.clone(),
            exchange_rate_to_base: None,
            amount_in_base: None,
            distribution_method: DistributionMethod::Exact,
            payers: vec![Payer {
                user_id: from.id,
                amount_paid: amount,
            }],
            split_breakdown: vec![SplitDetail {
                user_id: to_user_id,
                owed_share: amount,
                percentage: None,
                shares: None,
                is_involved: true,
            }],
            added_by: from.id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.storage.create_transaction(tx)?;
        debug!("Settlement recorded with ID: {}", created.id);

        self.audit_logger.log(AuditLogEntry::new(
            from.id,
            AuditAction::RecordSettlement,
            &serde_json::json!({
                "transaction_id": created.id,
                "trip_id": trip.id,
                "to_user_id": to_user_id,
                "amount": amount,
            }),
            now,
        ));

        Ok(created)
    }

    // BALANCES

    /// Every member with their net balance recomputed from the trip's full
    /// transaction set.
    pub fn trip_balances(&self, trip: &Trip) -> Vec<Participant> {
        debug!("Calculating balances for trip {}", trip.id);
        let participants: Vec<Participant> = trip
            .members
            .iter()
            .filter_map(|m| {
                let found = self.storage.get_participant(m.user_id);
                if found.is_none() {
                    warn!(
                        "Member {} of trip {} has no participant record",
                        m.user_id, trip.id
                    );
                }
                found
            })
            .collect();
        let transactions = self.storage.list_transactions(trip.id);
        finance::calculate_net_balances(&transactions, &participants)
    }

    /// Minimal "who pays whom" transfers that settle the trip.
    pub fn settlement_plan(&self, trip: &Trip) -> Vec<SettlementSuggestion> {
        let balances: HashMap<Uuid, f64> = self
            .trip_balances(trip)
            .into_iter()
            .map(|p| (p.id, p.net_balance))
            .collect();
        finance::suggest_settlements(&balances)
    }

    // ITINERARY

    /// Stores the leg and returns it together with the advisory findings
    /// against the trip's other transports. Saving is never blocked; the
    /// caller decides how to surface warnings vs errors.
    pub fn add_transport(
        &mut self,
        trip: &Trip,
        user: &Participant,
        leg: Transport,
    ) -> Result<(Transport, Vec<ConflictResult>), RoteiroError> {
        info!("Adding transport to trip {} by user {}", trip.id, user.id);
        if !self.storage.is_trip_member(trip.id, user.id) {
            return Err(RoteiroError::NotTripMember(user.id.to_string()));
        }

        let existing = self.storage.list_transports(trip.id);
        let findings = check_transport_conflicts(&leg, &existing);
        if !findings.is_empty() {
            warn!(
                "Transport {} has {} conflict finding(s) in trip {}",
                leg.id,
                findings.len(),
                trip.id
            );
        }

        let created = self.storage.add_transport(leg)?;
        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::AddTransport,
            &serde_json::json!({ "transport_id": created.id, "trip_id": trip.id }),
            Utc::now(),
        ));

        Ok((created, findings))
    }

    /// Stores the reservation and returns it together with the advisory
    /// findings against the trip's flights.
    pub fn add_accommodation(
        &mut self,
        trip: &Trip,
        user: &Participant,
        stay: Accommodation,
    ) -> Result<(Accommodation, Vec<ConflictResult>), RoteiroError> {
        info!(
            "Adding accommodation to trip {} by user {}",
            trip.id, user.id
        );
        if !self.storage.is_trip_member(trip.id, user.id) {
            return Err(RoteiroError::NotTripMember(user.id.to_string()));
        }

        let flights: Vec<Transport> = self
            .storage
            .list_transports(trip.id)
            .into_iter()
            .filter(|t| t.mode == TransportMode::Flight)
            .collect();
        let findings = check_accommodation_conflicts(&stay, &flights);
        if !findings.is_empty() {
            warn!(
                "Accommodation {} has {} conflict finding(s) in trip {}",
                stay.id,
                findings.len(),
                trip.id
            );
        }

        let created = self.storage.add_accommodation(stay)?;
        self.audit_logger.log(AuditLogEntry::new(
            user.id,
            AuditAction::AddAccommodation,
            &serde_json::json!({ "accommodation_id": created.id, "trip_id": trip.id }),
            Utc::now(),
        ));

        Ok((created, findings))
    }

    // PERMISSION HELPERS

    pub fn can_edit_trip(&self, trip: &Trip, user_id: Uuid) -> bool {
        let can_edit = matches!(
            self.storage.get_member_role(trip.id, user_id),
            Some(Role::Owner)
        );
        debug!("User {} can_edit_trip {}: {}", user_id, trip.id, can_edit);
        can_edit
    }

    pub fn can_edit_transaction(
        &self,
        trip: &Trip,
        transaction: &Transaction,
        user_id: Uuid,
    ) -> bool {
        let role = self.storage.get_member_role(trip.id, user_id);
        let can_edit = if role.is_none() {
            false
        } else if trip.strict_editing {
            transaction.added_by == user_id
        } else {
            true
        };
        debug!(
            "User {} can_edit_transaction {}: {}",
            user_id, transaction.id, can_edit
        );
        can_edit
    }

    // UTILITIES

    fn generate_join_link() -> String {
        let link = Uuid::new_v4().to_string();
        debug!("Generated join link: {}", link);
        link
    }
}
