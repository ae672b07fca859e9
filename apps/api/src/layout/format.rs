//! Display formatting for assembled documents — nl-NL currency, dates, placeholders.

use chrono::NaiveDate;

/// Placeholder rendered for missing scalar values. Optional fields keep their
/// row instead of vanishing, so labels stay aligned across proposals.
pub const EM_DASH: &str = "—";

/// Formats an amount as nl-NL euro currency with two decimals: `€ 1.234,56`.
pub fn fmt_eur(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    // Group the integer digits in threes from the right, nl-NL style.
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("€ {sign}{int_grouped},{dec_part}")
}

/// Currency formatting for an optional amount. Missing values render the
/// placeholder — aggregates are never substituted with a computed fallback.
pub fn fmt_eur_opt(amount: Option<f64>) -> String {
    amount.map(fmt_eur).unwrap_or_else(|| EM_DASH.to_string())
}

/// Reformats an ISO `yyyy-mm-dd` date as `dd-mm-yyyy` for display.
/// Anything that is not a parseable ISO date passes through verbatim.
pub fn fmt_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d-%m-%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Display form of an optional date field.
pub fn fmt_date_opt(raw: Option<&str>) -> String {
    raw.map(fmt_date).unwrap_or_else(|| EM_DASH.to_string())
}

/// Display form of an optional string field.
pub fn dash(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => EM_DASH.to_string(),
    }
}

/// Display form of an optional integer field.
pub fn fmt_int(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| EM_DASH.to_string())
}

/// Compact display form of a number — whole values drop the decimals
/// (percentages, interview minutes).
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_eur_groups_thousands_with_dots() {
        assert_eq!(fmt_eur(1234.5), "€ 1.234,50");
        assert_eq!(fmt_eur(1_000_000.0), "€ 1.000.000,00");
    }

    #[test]
    fn test_fmt_eur_small_amounts_ungrouped() {
        assert_eq!(fmt_eur(0.0), "€ 0,00");
        assert_eq!(fmt_eur(7.25), "€ 7,25");
        assert_eq!(fmt_eur(999.99), "€ 999,99");
    }

    #[test]
    fn test_fmt_eur_negative() {
        assert_eq!(fmt_eur(-1250.75), "€ -1.250,75");
    }

    #[test]
    fn test_fmt_eur_opt_missing_is_placeholder() {
        assert_eq!(fmt_eur_opt(None), EM_DASH);
        assert_eq!(fmt_eur_opt(Some(12.0)), "€ 12,00");
    }

    #[test]
    fn test_fmt_date_iso_becomes_day_first() {
        assert_eq!(fmt_date("2026-03-01"), "01-03-2026");
    }

    #[test]
    fn test_fmt_date_non_iso_passes_through() {
        assert_eq!(fmt_date("begin maart"), "begin maart");
        assert_eq!(fmt_date(""), "");
    }

    #[test]
    fn test_dash_placeholder_for_missing_and_blank() {
        assert_eq!(dash(None), EM_DASH);
        assert_eq!(dash(Some("   ")), EM_DASH);
        assert_eq!(dash(Some("ACME B.V.")), "ACME B.V.");
    }

    #[test]
    fn test_fmt_int() {
        assert_eq!(fmt_int(Some(500)), "500");
        assert_eq!(fmt_int(None), EM_DASH);
    }

    #[test]
    fn test_fmt_num_whole_and_fractional() {
        assert_eq!(fmt_num(21.0), "21");
        assert_eq!(fmt_num(9.5), "9.5");
    }
}
