use chrono::{DateTime, Utc};
use serde_json::Number;

use crate::config::AnsweredTimePolicy;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Interprets a JSON number as epoch milliseconds. Fractions are truncated;
/// values outside chrono's range yield `None`.
pub fn from_epoch_millis(ms: &Number) -> Option<DateTime<Utc>> {
    if let Some(v) = ms.as_i64() {
        return DateTime::from_timestamp_millis(v);
    }
    if ms.is_u64() {
        return None;
    }
    let v = ms.as_f64()?;
    if !v.is_finite() || v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(v.trunc() as i64)
}

/// Converts an `answeredTime`, applying the configured policy when the value
/// cannot be represented. `None` means the caller must reject the input.
pub fn resolve_answered_time(
    ms: &Number,
    policy: AnsweredTimePolicy,
    fallback: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (from_epoch_millis(ms), policy) {
        (Some(ts), _) => Some(ts),
        (None, AnsweredTimePolicy::Fallback) => Some(fallback),
        (None, AnsweredTimePolicy::Reject) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(raw: &str) -> Number {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn integer_millis_convert_exactly() {
        let ts = from_epoch_millis(&num("1700000000000")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn fractional_millis_are_truncated() {
        let ts = from_epoch_millis(&num("1700000000000.9")).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn out_of_range_values_do_not_convert() {
        assert!(from_epoch_millis(&num("18446744073709551615")).is_none());
        assert!(from_epoch_millis(&num("9223372036854775807")).is_none());
        assert!(from_epoch_millis(&num("1e300")).is_none());
    }

    #[test]
    fn policy_decides_unconvertible_values() {
        let fallback = DateTime::from_timestamp_millis(42).unwrap();
        let bad = num("1e300");
        assert_eq!(
            resolve_answered_time(&bad, AnsweredTimePolicy::Fallback, fallback),
            Some(fallback)
        );
        assert_eq!(
            resolve_answered_time(&bad, AnsweredTimePolicy::Reject, fallback),
            None
        );
        let good = num("1000");
        assert_eq!(
            resolve_answered_time(&good, AnsweredTimePolicy::Reject, fallback)
                .unwrap()
                .timestamp_millis(),
            1000
        );
    }
}
