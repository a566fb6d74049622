use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{leg, stay};
use crate::finance::{position_of, transaction_role};
use crate::models::*;
use crate::{ExpenseDraft, InMemoryAuditLogger, InMemoryStorage, RoteiroError, TripService};

fn equal_draft(amount: f64, payers: Vec<Payer>, participants: Vec<Uuid>) -> ExpenseDraft {
    ExpenseDraft {
        description: "Jantar".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        category_id: None,
        amount_original: amount,
        currency_original: "BRL".to_string(),
        exchange_rate_to_base: None,
        distribution_method: DistributionMethod::Equal,
        participants,
        custom_values: None,
        payers,
    }
}

fn paid_by(user_id: Uuid, amount: f64) -> Vec<Payer> {
    vec![Payer {
        user_id,
        amount_paid: amount,
    }]
}

#[test]
fn test_add_expense_equal_split_and_balances() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let tx = service
        .add_expense(
            &trip,
            &ana,
            equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    assert_eq!(tx.kind, TransactionKind::Expense);
    assert_eq!(tx.split_breakdown.len(), 2);
    assert!(tx.split_breakdown.iter().all(|r| r.owed_share == 50.0));

    let balances = service.trip_balances(&trip);
    let ana_balance = balances.iter().find(|p| p.id == ana.id).unwrap();
    let bruno_balance = balances.iter().find(|p| p.id == bruno.id).unwrap();
    assert_eq!(ana_balance.net_balance, 50.0);
    assert_eq!(bruno_balance.net_balance, -50.0);
    assert_eq!(position_of(ana_balance.net_balance), Position::Creditor);
    assert_eq!(position_of(bruno_balance.net_balance), Position::Debtor);

    assert_eq!(transaction_role(&tx, ana.id), TransactionRole::Lent(50.0));
    assert_eq!(
        transaction_role(&tx, bruno.id),
        TransactionRole::Borrowed(50.0)
    );
}

#[test]
fn test_exact_split_mismatch_is_rejected_before_save() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let mut draft = equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]);
    draft.distribution_method = DistributionMethod::Exact;
    draft.custom_values = Some(HashMap::from([(bruno.id, 80.0)]));

    let result = service.add_expense(&trip, &ana, draft);
    assert!(matches!(result, Err(RoteiroError::SplitMismatch { .. })));
    assert!(service.storage.list_transactions(trip.id).is_empty());
}

#[test]
fn test_payer_sum_must_cover_the_total() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let draft = equal_draft(100.0, paid_by(ana.id, 50.0), vec![ana.id, bruno.id]);
    let result = service.add_expense(&trip, &ana, draft);
    assert!(matches!(result, Err(RoteiroError::PayerMismatch { .. })));
}

#[test]
fn test_joint_payers_each_credit_their_share() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let carla = service.create_participant("Carla".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Serra".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    service.join_trip_by_link(&carla, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let payers = vec![
        Payer {
            user_id: ana.id,
            amount_paid: 60.0,
        },
        Payer {
            user_id: bruno.id,
            amount_paid: 30.0,
        },
    ];
    service
        .add_expense(
            &trip,
            &ana,
            equal_draft(90.0, payers, vec![ana.id, bruno.id, carla.id]),
        )
        .unwrap();

    let balances = service.trip_balances(&trip);
    let by_id = |id| {
        balances
            .iter()
            .find(|p| p.id == id)
            .unwrap()
            .net_balance
    };
    assert_eq!(by_id(ana.id), 30.0);
    assert_eq!(by_id(bruno.id), 0.0);
    assert_eq!(by_id(carla.id), -30.0);
}

#[test]
fn test_update_expense_recomputes_breakdown_wholesale() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let tx = service
        .add_expense(
            &trip,
            &ana,
            equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    let updated = service
        .update_expense(
            &trip,
            &tx,
            &bruno,
            equal_draft(60.0, paid_by(ana.id, 60.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    assert_eq!(updated.id, tx.id);
    assert_eq!(updated.amount_original, 60.0);
    assert!(updated.split_breakdown.iter().all(|r| r.owed_share == 30.0));

    let balances = service.trip_balances(&trip);
    let ana_balance = balances.iter().find(|p| p.id == ana.id).unwrap();
    assert_eq!(ana_balance.net_balance, 30.0);
}

#[test]
fn test_strict_editing_limits_edits_to_the_author() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), true)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let tx = service
        .add_expense(
            &trip,
            &ana,
            equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    let result = service.update_expense(
        &trip,
        &tx,
        &bruno,
        equal_draft(60.0, paid_by(ana.id, 60.0), vec![ana.id, bruno.id]),
    );
    assert!(matches!(result, Err(RoteiroError::NotAuthorized(_))));
    assert!(!service.can_edit_transaction(&trip, &tx, bruno.id));
    assert!(service.can_edit_transaction(&trip, &tx, ana.id));
}

#[test]
fn test_soft_deleted_expense_leaves_balances() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    let tx = service
        .add_expense(
            &trip,
            &ana,
            equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    let deleted = service.delete_expense(&trip, &tx, &ana).unwrap();
    assert!(deleted.deleted_at.is_some());

    let balances = service.trip_balances(&trip);
    assert!(balances.iter().all(|p| p.net_balance == 0.0));

    let again = service.delete_expense(&trip, &deleted, &ana);
    assert!(matches!(again, Err(RoteiroError::AlreadyDeleted(_))));
}

#[test]
fn test_settlement_clears_the_debt() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    service
        .add_expense(
            &trip,
            &ana,
            equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, bruno.id]),
        )
        .unwrap();

    let plan = service.settlement_plan(&trip);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].from_user_id, bruno.id);
    assert_eq!(plan[0].to_user_id, ana.id);
    assert_eq!(plan[0].amount, 50.0);

    let settlement = service
        .record_settlement(
            &trip,
            &bruno,
            ana.id,
            50.0,
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        )
        .unwrap();
    assert_eq!(settlement.kind, TransactionKind::Settlement);

    let balances = service.trip_balances(&trip);
    assert!(
        balances
            .iter()
            .all(|p| position_of(p.net_balance) == Position::Settled)
    );
    assert!(service.settlement_plan(&trip).is_empty());

    let to_self = service.record_settlement(
        &trip,
        &bruno,
        bruno.id,
        10.0,
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
    );
    assert!(matches!(to_self, Err(RoteiroError::SelfSettlement)));
}

#[test]
fn test_foreign_currency_expense_is_aggregated_in_base() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let bruno = service.create_participant("Bruno".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Miami".to_string(), "BRL".to_string(), false)
        .unwrap();
    service.join_trip_by_link(&bruno, &trip.join_link).unwrap();
    let trip = service.storage.get_trip(trip.id).unwrap();

    // 100 USD at 5.0: payer amounts are entered in the base currency
    let mut draft = equal_draft(100.0, paid_by(ana.id, 500.0), vec![ana.id, bruno.id]);
    draft.currency_original = "USD".to_string();
    draft.exchange_rate_to_base = Some(5.0);

    let tx = service.add_expense(&trip, &ana, draft).unwrap();
    assert_eq!(tx.amount_in_base, Some(500.0));
    assert_eq!(tx.base_amount(), 500.0);
    assert!(tx.split_breakdown.iter().all(|r| r.owed_share == 250.0));

    let balances = service.trip_balances(&trip);
    let bruno_balance = balances.iter().find(|p| p.id == bruno.id).unwrap();
    assert_eq!(bruno_balance.net_balance, -250.0);
}

#[test]
fn test_split_participants_must_be_members() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let outsider = service.create_participant("Eve".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();

    let draft = equal_draft(100.0, paid_by(ana.id, 100.0), vec![ana.id, outsider.id]);
    let result = service.add_expense(&trip, &ana, draft);
    assert!(matches!(result, Err(RoteiroError::NotTripMember(_))));
}

#[test]
fn test_itinerary_records_return_advisory_findings() {
    let _ = env_logger::try_init();
    let mut storage = InMemoryStorage::new();
    let mut audit_logger = InMemoryAuditLogger::new();
    let mut service = TripService::new(&mut storage, &mut audit_logger);

    let ana = service.create_participant("Ana".to_string()).unwrap();
    let trip = service
        .create_trip(&ana, "Praia".to_string(), "BRL".to_string(), false)
        .unwrap();

    let mut first = leg("2024-03-01", "10:00", "2024-03-01", "14:00");
    first.trip_id = trip.id;
    let (_, findings) = service.add_transport(&trip, &ana, first).unwrap();
    assert!(findings.is_empty());

    // Overlapping leg is saved anyway; the findings are advisory
    let mut second = leg("2024-03-01", "13:00", "2024-03-01", "18:00");
    second.trip_id = trip.id;
    let (stored, findings) = service.add_transport(&trip, &ana, second).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, ConflictKind::Overlap);
    assert!(
        service
            .storage
            .list_transports(trip.id)
            .iter()
            .any(|t| t.id == stored.id)
    );

    let mut hotel = stay("Pousada Mar", "2024-03-05", "2024-03-10");
    hotel.trip_id = trip.id;
    let (_, findings) = service.add_accommodation(&trip, &ana, hotel).unwrap();
    assert!(
        findings
            .iter()
            .any(|f| f.kind == ConflictKind::CheckinBeforeFlight)
    );
}
