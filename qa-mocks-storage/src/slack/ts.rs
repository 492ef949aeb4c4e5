//! Slack message timestamps
//!
//! A `ts` is a decimal string of seconds with exactly six fractional digits.
//! Messages store it as integer microseconds, which keeps ordering exact.

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Render microseconds as `"{secs}.{micros:06}"`
pub fn format_ts(micros: i64) -> String {
    format!(
        "{}.{:06}",
        micros.div_euclid(MICROS_PER_SECOND),
        micros.rem_euclid(MICROS_PER_SECOND)
    )
}

/// Parse a `ts` (or plain seconds) back into microseconds
///
/// Fractions shorter than six digits are right-padded, longer ones rejected.
pub fn parse_ts(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (secs, frac) = match raw.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (raw, ""),
    };

    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: i64 = secs.parse().ok()?;
    let micros: i64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<6}", frac).parse().ok()?
    };

    secs.checked_mul(MICROS_PER_SECOND)?.checked_add(micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_micros() {
        assert_eq!(format_ts(1_700_000_000_000_100), "1700000000.000100");
        assert_eq!(format_ts(5), "0.000005");
    }

    #[test]
    fn test_parse_accepts_slack_forms() {
        assert_eq!(parse_ts("1700000000.000100"), Some(1_700_000_000_000_100));
        assert_eq!(parse_ts("1700000000"), Some(1_700_000_000_000_000));
        assert_eq!(parse_ts("1700000000.5"), Some(1_700_000_000_500_000));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_ts(""), None);
        assert_eq!(parse_ts("abc"), None);
        assert_eq!(parse_ts("-1.0"), None);
        assert_eq!(parse_ts("1.1234567"), None);
        assert_eq!(parse_ts("1.12a"), None);
    }
}
