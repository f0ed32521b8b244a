//! Lenient readers for loosely typed backend JSON

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Parse a timestamp the backend may send as RFC 3339 text or epoch millis
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| s.parse::<i64>().ok().and_then(millis_to_datetime)),
        Value::Number(n) => n.as_i64().and_then(millis_to_datetime),
        _ => None,
    }
}

/// Read a number the backend may send as JSON number or numeric string
///
/// NaN, infinities and unparseable text yield `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2026-10-19T12:00:00Z")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!("2026-10-19T14:00:00+02:00")),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_parse_number_defensive() {
        assert_eq!(parse_number(&json!(12.5)), Some(12.5));
        assert_eq!(parse_number(&json!("42.10")), Some(42.1));
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("abc")), None);
        assert_eq!(parse_number(&json!(null)), None);
    }
}
