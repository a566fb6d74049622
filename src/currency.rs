//! Display formatting for currency amounts. The calculation core works in
//! raw numeric units; this is the only locale-aware boundary.

/// Formats `cents` as grouped integer digits plus a two-digit fraction.
fn grouped(cents: u64, thousands: char, decimal: char) -> String {
    let units = (cents / 100).to_string();
    let frac = cents % 100;
    let mut out = String::with_capacity(units.len() + units.len() / 3 + 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            out.push(thousands);
        }
        out.push(ch);
    }
    out.push(decimal);
    out.push_str(&format!("{:02}", frac));
    out
}

/// Locale-formatted currency string for the known trip currencies; any
/// other code falls back to en-US digit grouping prefixed with the code.
pub fn format_currency(value: f64, currency_code: &str) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();

    match currency_code.to_ascii_uppercase().as_str() {
        "BRL" => format!("{}R$ {}", sign, grouped(magnitude, '.', ',')),
        "USD" => format!("{}${}", sign, grouped(magnitude, ',', '.')),
        "EUR" => format!("{}{} €", sign, grouped(magnitude, '.', ',')),
        code => format!("{}{} {}", sign, code, grouped(magnitude, ',', '.')),
    }
}
