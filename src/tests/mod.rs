mod expense_tests;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::finance;
use crate::models::*;

pub fn participant(name: &str) -> Participant {
    Participant {
        id: Uuid::new_v4(),
        name: name.to_string(),
        net_balance: 0.0,
    }
}

/// An equal-split expense fronted by a single payer, for driving the pure
/// finance functions without a service.
pub fn equal_expense(payer_id: Uuid, amount: f64, among: &[Uuid]) -> Transaction {
    let breakdown =
        finance::calculate_split_breakdown(amount, among, DistributionMethod::Equal, None)
            .unwrap();
    let now = Utc::now();
    Transaction {
        id: Uuid::new_v4(),
        trip_id: Uuid::new_v4(),
        kind: TransactionKind::Expense,
        description: "Test expense".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        category_id: None,
        amount_original: amount,
        currency_original: "BRL".to_string(),
        exchange_rate_to_base: None,
        amount_in_base: None,
        distribution_method: DistributionMethod::Equal,
        payers: vec![Payer {
            user_id: payer_id,
            amount_paid: amount,
        }],
        split_breakdown: breakdown,
        added_by: payer_id,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// A domestic flight leg with the given wall-clock endpoints.
pub fn leg(
    departure_date: &str,
    departure_time: &str,
    arrival_date: &str,
    arrival_time: &str,
) -> Transport {
    Transport {
        id: Uuid::new_v4(),
        trip_id: Uuid::new_v4(),
        mode: TransportMode::Flight,
        origin: "GRU".to_string(),
        destination: "GIG".to_string(),
        arrival_city: None,
        scope: LegScope::Domestic,
        departure_date: departure_date.to_string(),
        departure_time: departure_time.to_string(),
        arrival_date: arrival_date.to_string(),
        arrival_time: arrival_time.to_string(),
    }
}

pub fn stay(name: &str, check_in_date: &str, check_out_date: &str) -> Accommodation {
    Accommodation {
        id: Uuid::new_v4(),
        trip_id: Uuid::new_v4(),
        name: name.to_string(),
        address: None,
        city: None,
        check_in_date: check_in_date.to_string(),
        check_out_date: check_out_date.to_string(),
    }
}
