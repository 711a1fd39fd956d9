//! Census tract normalization to the fixed `DDDD.DD` form.

use tractkey_model::Tract;

use crate::codes::{is_missing_value, strip_float_suffix};
use crate::raw::RawTract;

const CENSUS_TRACT_PREFIX: &str = "census tract";

/// Normalizes a raw tract. `Absent` yields `None`; any present but empty or
/// unparseable value yields the missing-tract sentinel.
pub fn normalize_tract(raw: &RawTract<'_>) -> Option<Tract> {
    match *raw {
        RawTract::ImpliedDecimal(value) => Some(implied_decimal_tract(value)),
        RawTract::Decimal(value) => Some(decimal_tract(value)),
        RawTract::Embedded(value) => Some(embedded_tract(value)),
        RawTract::Absent => None,
    }
}

fn digits_to_hundredths(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn implied_decimal_tract(raw: &str) -> Tract {
    let value = strip_float_suffix(raw);
    if is_missing_value(value) {
        return Tract::missing();
    }
    digits_to_hundredths(value).map_or_else(Tract::missing, Tract::from_hundredths)
}

fn strip_census_prefix(value: &str) -> &str {
    match value.get(..CENSUS_TRACT_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(CENSUS_TRACT_PREFIX) => {
            value[CENSUS_TRACT_PREFIX.len()..].trim_start()
        }
        _ => value,
    }
}

/// `101.02`, `101.2`, `101`, `Census Tract 101.02` -> `0101.02`, `0101.20`,
/// `0101.00`, `0101.02`. Digits past the second decimal place are dropped.
fn decimal_tract(raw: &str) -> Tract {
    let value = strip_census_prefix(raw.trim());
    if is_missing_value(value) {
        return Tract::missing();
    }
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    let whole = if whole.is_empty() { "0" } else { whole };
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Tract::missing();
    }
    let cents: String = frac.chars().chain(std::iter::repeat('0')).take(2).collect();
    digits_to_hundredths(whole)
        .and_then(|whole| whole.checked_mul(100))
        .zip(cents.parse::<u64>().ok())
        .and_then(|(whole, cents)| whole.checked_add(cents))
        .map_or_else(Tract::missing, Tract::from_hundredths)
}

/// Keeps the last six characters of the combined code and inserts the
/// decimal point before the last two. Non-numeric tails are kept as-is
/// apart from the inserted point; a non-numeric tail shorter than three
/// characters has no whole part and is the missing-tract sentinel.
fn embedded_tract(raw: &str) -> Tract {
    let value = strip_float_suffix(raw);
    if is_missing_value(value) {
        return Tract::missing();
    }
    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    if let Some(hundredths) = digits_to_hundredths(&tail) {
        return Tract::from_hundredths(hundredths);
    }
    if tail.chars().count() < 3 {
        return Tract::missing();
    }
    let split = tail
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(idx, _)| idx);
    let (head, cents) = tail.split_at(split);
    Tract::verbatim(format!("{head}.{cents}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tract(raw: RawTract<'_>) -> String {
        normalize_tract(&raw).map(|t| t.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_implied_decimal() {
        assert_eq!(tract(RawTract::ImpliedDecimal("3400")), "0034.00");
        assert_eq!(tract(RawTract::ImpliedDecimal("1234")), "0012.34");
        assert_eq!(tract(RawTract::ImpliedDecimal("10102.0")), "0101.02");
        assert_eq!(tract(RawTract::ImpliedDecimal("")), "0000NAN");
        assert_eq!(tract(RawTract::ImpliedDecimal("nan")), "0000NAN");
        assert_eq!(tract(RawTract::ImpliedDecimal("12a")), "0000NAN");
    }

    #[test]
    fn test_decimal() {
        assert_eq!(tract(RawTract::Decimal("101.02")), "0101.02");
        assert_eq!(tract(RawTract::Decimal("Census Tract 101.02")), "0101.02");
        assert_eq!(tract(RawTract::Decimal("census tract 9")), "0009.00");
        assert_eq!(tract(RawTract::Decimal("0101.02")), "0101.02");
        assert_eq!(tract(RawTract::Decimal("101.2")), "0101.20");
        assert_eq!(tract(RawTract::Decimal("  ")), "0000NAN");
        assert_eq!(tract(RawTract::Decimal("NA")), "0000NAN");
        assert_eq!(tract(RawTract::Decimal("101.x")), "0000NAN");
    }

    #[test]
    fn test_embedded() {
        assert_eq!(tract(RawTract::Embedded("48113010102")), "0101.02");
        assert_eq!(tract(RawTract::Embedded("48113010102.0")), "0101.02");
        assert_eq!(tract(RawTract::Embedded("10102")), "0101.02");
        assert_eq!(tract(RawTract::Embedded("4811301010A")), "0101.0A");
        assert_eq!(tract(RawTract::Embedded("")), "0000NAN");
        assert_eq!(tract(RawTract::Embedded("nan")), "0000NAN");
        assert_eq!(tract(RawTract::Embedded("X")), "0000NAN");
        assert_eq!(tract(RawTract::Embedded("1X")), "0000NAN");
        assert_eq!(tract(RawTract::Embedded("1AB")), "1.AB");
    }

    #[test]
    fn test_absent_has_no_tract() {
        assert_eq!(normalize_tract(&RawTract::Absent), None);
    }
}
