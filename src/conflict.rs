//! Itinerary conflict detection.
//!
//! Pure rule evaluation over transport and accommodation records: no state
//! is kept between calls and findings are returned as data, never raised.
//! Records whose dates or times fail to parse are skipped for the affected
//! comparisons only, so one malformed record cannot hide conflicts among
//! the well-formed ones.

use crate::constants::{
    BUFFER_MINUTES_DOMESTIC, BUFFER_MINUTES_INTERNATIONAL, DATE_FORMAT, HOTEL_CHECK_IN,
    HOTEL_CHECK_OUT, TIME_FORMAT,
};
use crate::models::{
    Accommodation, ConflictKind, ConflictResult, LegScope, Severity, Transport,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use uuid::Uuid;

/// A transport leg's wall-clock occupation, parsed from its record.
struct LegInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

fn parse_date_time(date: &str, time: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let d = NaiveDate::parse_from_str(date, DATE_FORMAT)?;
    let t = NaiveTime::parse_from_str(time, TIME_FORMAT)?;
    Ok(d.and_time(t))
}

fn leg_interval(leg: &Transport) -> Result<LegInterval, chrono::ParseError> {
    Ok(LegInterval {
        start: parse_date_time(&leg.departure_date, &leg.departure_time)?,
        end: parse_date_time(&leg.arrival_date, &leg.arrival_time)?,
    })
}

/// Minimum connection time between two legs. The larger buffer applies as
/// soon as either leg crosses a border.
fn connection_buffer(a: &Transport, b: &Transport) -> i64 {
    if a.scope == LegScope::International || b.scope == LegScope::International {
        BUFFER_MINUTES_INTERNATIONAL
    } else {
        BUFFER_MINUTES_DOMESTIC
    }
}

fn tight_connection(
    arriving: &Transport,
    arrival: NaiveDateTime,
    departing: &Transport,
    departure: NaiveDateTime,
    subject_id: Uuid,
    other_id: Uuid,
) -> Option<ConflictResult> {
    let gap = (departure - arrival).num_minutes();
    let buffer = connection_buffer(arriving, departing);
    if gap >= 0 && gap < buffer {
        return Some(ConflictResult {
            kind: ConflictKind::TightConnection,
            severity: Severity::Warning,
            subject_id,
            other_id,
            message: format!(
                "Only {} min between arriving in {} and the next departure",
                gap, arriving.destination
            ),
            suggested_fix: Some(format!("Allow at least {} min for this connection", buffer)),
            gap_minutes: Some(gap),
        });
    }
    None
}

/// Compares a new or edited leg against every other leg of the trip and
/// returns all findings: wall-clock overlaps (one traveler cannot ride two
/// legs at once) and connections shorter than the safety buffer, checked
/// in both directions.
pub fn check_transport_conflicts(
    new_leg: &Transport,
    existing: &[Transport],
) -> Vec<ConflictResult> {
    let new_interval = match leg_interval(new_leg) {
        Ok(interval) => interval,
        Err(err) => {
            debug!("Skipping conflict scan, transport {} has unparseable times: {}", new_leg.id, err);
            return Vec::new();
        }
    };

    let mut findings = Vec::new();
    for other in existing.iter().filter(|t| t.id != new_leg.id) {
        let other_interval = match leg_interval(other) {
            Ok(interval) => interval,
            Err(err) => {
                debug!("Skipping transport {} with unparseable times: {}", other.id, err);
                continue;
            }
        };

        if new_interval.start < other_interval.end && new_interval.end > other_interval.start {
            findings.push(ConflictResult {
                kind: ConflictKind::Overlap,
                severity: Severity::Error,
                subject_id: new_leg.id,
                other_id: other.id,
                message: format!(
                    "Occupies the same time as the {} to {} leg",
                    other.origin, other.destination
                ),
                suggested_fix: Some("Adjust the times of one of the legs".to_string()),
                gap_minutes: None,
            });
        }

        if let Some(finding) = tight_connection(
            new_leg,
            new_interval.end,
            other,
            other_interval.start,
            new_leg.id,
            other.id,
        ) {
            findings.push(finding);
        }
        if let Some(finding) = tight_connection(
            other,
            other_interval.end,
            new_leg,
            new_interval.start,
            new_leg.id,
            other.id,
        ) {
            findings.push(finding);
        }
    }

    findings
}

/// Checks a lodging reservation against the trip's flights. Check-in and
/// check-out are normalized to standard hotel policy (14:00 / 11:00)
/// regardless of any time on the record.
pub fn check_accommodation_conflicts(
    accommodation: &Accommodation,
    flights: &[Transport],
) -> Vec<ConflictResult> {
    let check_in = parse_date_time(&accommodation.check_in_date, HOTEL_CHECK_IN);
    let check_out = parse_date_time(&accommodation.check_out_date, HOTEL_CHECK_OUT);
    let (check_in, check_out) = match (check_in, check_out) {
        (Ok(ci), Ok(co)) => (ci, co),
        _ => {
            debug!(
                "Skipping conflict scan, accommodation {} has unparseable dates",
                accommodation.id
            );
            return Vec::new();
        }
    };

    let mut findings = Vec::new();
    for flight in flights {
        let interval = match leg_interval(flight) {
            Ok(interval) => interval,
            Err(err) => {
                debug!("Skipping flight {} with unparseable times: {}", flight.id, err);
                continue;
            }
        };

        if interval.end > check_out {
            findings.push(ConflictResult {
                kind: ConflictKind::CheckoutAfterFlight,
                severity: Severity::Error,
                subject_id: accommodation.id,
                other_id: flight.id,
                message: format!(
                    "Flight lands {} but the room is gone at check-out ({})",
                    interval.end.format("%Y-%m-%d %H:%M"),
                    check_out.format("%Y-%m-%d %H:%M"),
                ),
                suggested_fix: Some("Extend the reservation or take an earlier flight".to_string()),
                gap_minutes: None,
            });
        }

        if interval.start < check_in {
            findings.push(ConflictResult {
                kind: ConflictKind::CheckinBeforeFlight,
                severity: Severity::Error,
                subject_id: accommodation.id,
                other_id: flight.id,
                message: format!(
                    "Flight departs {} before the room opens at check-in ({})",
                    interval.start.format("%Y-%m-%d %H:%M"),
                    check_in.format("%Y-%m-%d %H:%M"),
                ),
                suggested_fix: Some("Move the reservation earlier or the flight later".to_string()),
                gap_minutes: None,
            });
        }

        // Structured city identifiers only; matching on free-form address
        // strings produces too many false positives.
        if let (Some(hotel_city), Some(arrival_city)) =
            (accommodation.city.as_deref(), flight.arrival_city.as_deref())
        {
            if !hotel_city.trim().eq_ignore_ascii_case(arrival_city.trim()) {
                findings.push(ConflictResult {
                    kind: ConflictKind::LocationMismatch,
                    severity: Severity::Warning,
                    subject_id: accommodation.id,
                    other_id: flight.id,
                    message: format!(
                        "Flight arrives in {} but the reservation is in {}",
                        arrival_city, hotel_city
                    ),
                    suggested_fix: Some("Double-check the destination city".to_string()),
                    gap_minutes: None,
                });
            }
        }
    }

    findings
}
