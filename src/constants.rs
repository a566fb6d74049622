/// Tolerance when checking that split shares add up to a transaction total.
/// Each involved share is rounded to 2 decimals independently, so the
/// acceptable drift scales with the number of involved participants.
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Net balances inside this band around zero count as settled.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Minimum connection time between two domestic legs, in minutes.
pub const BUFFER_MINUTES_DOMESTIC: i64 = 60;

/// Minimum connection time when either leg is international, in minutes.
pub const BUFFER_MINUTES_INTERNATIONAL: i64 = 120;

/// Standard hotel check-in time, applied regardless of the record's own data.
pub const HOTEL_CHECK_IN: &str = "14:00";

/// Standard hotel check-out time.
pub const HOTEL_CHECK_OUT: &str = "11:00";

/// Wall-clock formats used by itinerary records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
