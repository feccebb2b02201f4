//! Relative date resolution.
//!
//! Date literals in filters are either absolute (`2024-01-15`,
//! `2024-01-15T10:30:00Z`) or relative to the current instant
//! (`now`, `now+7d`, `now-2w`). This module converts both forms into
//! comparable UTC instants. It is shared by the validator (literal
//! checking) and the evaluator (comparison).

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

/// Resolves a date literal into a UTC instant.
///
/// Accepted forms:
/// - `YYYY-MM-DD` (midnight UTC)
/// - ISO 8601 date-time with a zone designator
/// - `now`
/// - `now±N` or `now±N<unit>` with units `s` seconds, `m` minutes,
///   `h` hours, `d` days (the default), `w` weeks, `M` months, `y` years.
///   The unit is case-significant: `m` is minutes, `M` is months.
///
/// Returns `None` for anything else (`tomorrow`, `now+`, `now+d`, ...)
/// rather than an error: callers treat an unresolvable literal as a
/// condition that cannot be satisfied.
pub fn parse_relative_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if text == "now" {
        return Some(Utc::now());
    }

    if let Some(rest) = text.strip_prefix("now") {
        return apply_offset(Utc::now(), rest);
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0)?,
            Utc,
        ));
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Applies a `±N<unit>` suffix to a base instant.
fn apply_offset(base: DateTime<Utc>, suffix: &str) -> Option<DateTime<Utc>> {
    let mut chars = suffix.chars();
    let negative = match chars.next()? {
        '+' => false,
        '-' => true,
        _ => return None,
    };

    let rest: String = chars.collect();
    let digit_count = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_count == 0 {
        return None;
    }

    let amount: i64 = rest[..digit_count].parse().ok()?;
    let unit = &rest[digit_count..];

    let signed = if negative { -amount } else { amount };
    // The fallible constructors keep absurd amounts a None, not a panic.
    let duration = match unit {
        "s" => Duration::try_seconds(signed),
        "m" => Duration::try_minutes(signed),
        "h" => Duration::try_hours(signed),
        "" | "d" => Duration::try_days(signed),
        "w" => Duration::try_weeks(signed),
        "M" => return add_months(base, signed),
        "y" => return add_months(base, signed.checked_mul(12)?),
        _ => None,
    }?;
    base.checked_add_signed(duration)
}

fn add_months(base: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        base.checked_add_months(Months::new(magnitude))
    } else {
        base.checked_sub_months(Months::new(magnitude))
    }
}
