use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

/// Case-insensitive field lookup; returns the first of `names` present
pub fn get_ci<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    for name in names {
        if let Some((_, v)) = obj.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            return Some(v);
        }
    }
    None
}

/// Non-empty, trimmed string field
pub fn get_str<'a>(value: &'a Value, names: &[&str]) -> Option<&'a str> {
    get_ci(value, names)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Lenient decimal: numbers and numeric strings parse, everything else is zero
pub fn parse_decimal(value: Option<&Value>) -> Decimal {
    let text = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .unwrap_or(Decimal::ZERO)
}

/// Lenient unsigned integer, `None` when the value is absent or unparsable
pub fn parse_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

/// Parse the timestamp forms the explorer emits: epoch seconds, epoch
/// milliseconds (13+ digits), RFC 3339, or a naive UTC datetime.
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_opt(secs, 0).single()
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        let raw: i64 = s.parse().ok()?;
        let secs = if s.len() >= 13 { raw / 1000 } else { raw };
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format an instant the way the tail export shows it
pub fn iso_utc(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format an address or hash for display (truncated)
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_ignores_key_case() {
        let v = json!({ "BlockHeight": 12, "from": "0xA" });
        assert_eq!(get_ci(&v, &["blockHeight"]), Some(&json!(12)));
        assert_eq!(get_str(&v, &["sender", "FROM"]), Some("0xA"));
        assert_eq!(get_ci(&v, &["to"]), None);
    }

    #[test]
    fn decimals_parse_leniently() {
        assert_eq!(parse_decimal(Some(&json!("1.5"))), Decimal::new(15, 1));
        assert_eq!(parse_decimal(Some(&json!(2))), Decimal::from(2));
        assert_eq!(parse_decimal(Some(&json!("garbage"))), Decimal::ZERO);
        assert_eq!(parse_decimal(None), Decimal::ZERO);
        assert_eq!(
            parse_decimal(Some(&json!("0.000000000000000001"))),
            Decimal::new(1, 18)
        );
    }

    #[test]
    fn heights_parse_from_numbers_and_strings() {
        assert_eq!(parse_u64(Some(&json!(42))), Some(42));
        assert_eq!(parse_u64(Some(&json!("+42"))), Some(42));
        assert_eq!(parse_u64(Some(&json!("x"))), None);
        assert_eq!(parse_u64(Some(&Value::Null)), None);
    }

    #[test]
    fn timestamps_accept_every_explorer_form() {
        let expected = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(Some(&json!(1682942400))), Some(expected));
        assert_eq!(parse_timestamp(Some(&json!("1682942400"))), Some(expected));
        assert_eq!(parse_timestamp(Some(&json!("1682942400000"))), Some(expected));
        assert_eq!(parse_timestamp(Some(&json!("2023-05-01T12:00:00Z"))), Some(expected));
        assert_eq!(parse_timestamp(Some(&json!("2023-05-01T12:00:00"))), Some(expected));
        assert_eq!(parse_timestamp(Some(&json!("yesterday"))), None);
    }

    #[test]
    fn iso_utc_uses_space_separator() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(iso_utc(&ts), "2023-05-01 12:00:00");
    }

    #[test]
    fn short_addresses_are_not_truncated() {
        assert_eq!(format_address("0xabc"), "0xabc");
        assert_eq!(
            format_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
    }

    #[test]
    fn non_ascii_addresses_are_cut_on_char_boundaries() {
        assert_eq!(format_address("адрес-кошелька-идена"), "адрес-...дена");
        assert_eq!(format_address("ünïcödé"), "ünïcödé");
    }
}
