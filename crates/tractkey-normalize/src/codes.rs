//! State and county code fragment normalization.

/// Removes surrounding whitespace and a trailing `.0` left by float storage.
///
/// Only the exact suffix is removed: `48.0` -> `48`, `4810.01` unchanged.
pub fn strip_float_suffix(raw: &str) -> &str {
    let value = raw.trim();
    value.strip_suffix(".0").unwrap_or(value)
}

/// True for empty values and the usual missing-value spellings.
pub fn is_missing_value(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("na")
        || value.eq_ignore_ascii_case("n/a")
        || value.eq_ignore_ascii_case("none")
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Two-digit state code (`6`, `06`, `6.0` -> `06`).
pub fn pad_state_code(raw: &str) -> Option<String> {
    let value = strip_float_suffix(raw);
    if !all_digits(value) || value.len() > 2 {
        return None;
    }
    Some(format!("{value:0>2}"))
}

/// Three-digit county fragment by length: one digit gets `00`, two digits
/// get `0`, three digits are kept. Anything else is not a county fragment.
pub fn pad_county_code(raw: &str) -> Option<String> {
    let value = strip_float_suffix(raw);
    if !all_digits(value) {
        return None;
    }
    match value.len() {
        1 => Some(format!("00{value}")),
        2 => Some(format!("0{value}")),
        3 => Some(value.to_string()),
        _ => None,
    }
}

/// Splits a combined state+county code from the right: the last three
/// characters are the county, the rest is the state (`48113` ->
/// `("48", "113")`, `6001` -> `("06", "001")`).
pub fn split_combined_county(raw: &str) -> Option<(String, String)> {
    let value = strip_float_suffix(raw);
    if !all_digits(value) || value.len() < 4 {
        return None;
    }
    let (state, county) = value.split_at(value.len() - 3);
    Some((pad_state_code(state)?, pad_county_code(county)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_padding() {
        assert_eq!(pad_state_code("6"), Some("06".into()));
        assert_eq!(pad_state_code("06"), Some("06".into()));
        assert_eq!(pad_state_code(" 48.0 "), Some("48".into()));
        assert_eq!(pad_state_code("TX"), None);
        assert_eq!(pad_state_code("480"), None);
        assert_eq!(pad_state_code(""), None);
    }

    #[test]
    fn test_county_padding() {
        for raw in ["5", "05", "005", "5.0", "05.0"] {
            assert_eq!(pad_county_code(raw), Some("005".into()), "{raw}");
        }
        assert_eq!(pad_county_code("113"), Some("113".into()));
        assert_eq!(pad_county_code("1130"), None);
        assert_eq!(pad_county_code("nan"), None);
    }

    #[test]
    fn test_combined_split() {
        assert_eq!(
            split_combined_county("48113"),
            Some(("48".into(), "113".into()))
        );
        assert_eq!(
            split_combined_county("48113.0"),
            Some(("48".into(), "113".into()))
        );
        assert_eq!(
            split_combined_county("6001"),
            Some(("06".into(), "001".into()))
        );
        assert_eq!(split_combined_county("113"), None);
        assert_eq!(split_combined_county("481130"), None);
    }

    #[test]
    fn test_float_suffix_only() {
        assert_eq!(strip_float_suffix("4810.01"), "4810.01");
        assert_eq!(strip_float_suffix("4810.0"), "4810");
        assert_eq!(strip_float_suffix(" 10.00 "), "10.00");
    }

    #[test]
    fn test_missing_values() {
        assert!(is_missing_value(""));
        assert!(is_missing_value(" NaN "));
        assert!(is_missing_value("NA"));
        assert!(!is_missing_value("0"));
    }
}
