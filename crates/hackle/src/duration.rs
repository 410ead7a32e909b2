//! Duration strings.
//!
//! Attribute values like `timeout = "1h30m"` use the conventional
//! `<number><unit>` spelling with units `ns`, `us`/`µs`, `ms`, `s`, `m`,
//! and `h`; formatting produces the same canonical shapes (`5s`,
//! `1h30m0s`, `1.5ms`).

use std::time::Duration;

const UNITS: &[(&str, u64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a duration string.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let original = s;
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.starts_with('-') {
        return Err(format!("negative duration {original:?} is not supported"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(format!("invalid duration {original:?}"));
    }
    let mut rest = s;
    let mut nanos = 0u64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {original:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {original:?}"))?;
        rest = &rest[number_len..];
        let (unit, scale) = UNITS
            .iter()
            // Longest unit first so "ms" wins over "m".
            .filter(|(unit, _)| rest.starts_with(unit))
            .max_by_key(|(unit, _)| unit.len())
            .copied()
            .ok_or_else(|| format!("missing unit in duration {original:?}"))?;
        rest = &rest[unit.len()..];
        let add = number * scale as f64;
        if !add.is_finite() || add < 0.0 || add > u64::MAX as f64 {
            return Err(format!("invalid duration {original:?}"));
        }
        nanos = nanos
            .checked_add(add.round() as u64)
            .ok_or_else(|| format!("duration {original:?} out of range"))?;
    }
    Ok(Duration::from_nanos(nanos))
}

/// Format a duration canonically.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return with_fraction(nanos, 1_000, "µs");
    }
    if nanos < 1_000_000_000 {
        return with_fraction(nanos, 1_000_000, "ms");
    }
    let mut out = String::new();
    let total_seconds = nanos / 1_000_000_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    if hours > 0 {
        out.push_str(&format!("{hours}h{minutes}m"));
    } else if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    let second_nanos = nanos % 60_000_000_000;
    out.push_str(&with_fraction(second_nanos, 1_000_000_000, "s"));
    out
}

/// `1500 / 1000 → "1.5"` with trailing zeros trimmed.
fn with_fraction(value: u128, scale: u128, unit: &str) -> String {
    let whole = value / scale;
    let remainder = value % scale;
    if remainder == 0 {
        return format!("{whole}{unit}");
    }
    let digits = scale.ilog10() as usize;
    let mut fraction = format!("{remainder:0width$}", width = digits);
    while fraction.ends_with('0') {
        fraction.pop();
    }
    format!("{whole}.{fraction}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(24 * 3600));
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("100ns").unwrap(), Duration::from_nanos(100));
        assert_eq!(parse_duration("2us").unwrap(), Duration::from_micros(2));
        assert_eq!(parse_duration("2µs").unwrap(), Duration::from_micros(2));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(24 * 3600)), "24h0m0s");
        assert_eq!(format_duration(Duration::from_secs(90 * 60)), "1h30m0s");
        assert_eq!(format_duration(Duration::from_secs(30 * 60)), "30m0s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(300)), "300ms");
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.5µs");
        assert_eq!(format_duration(Duration::from_nanos(100)), "100ns");
    }

    #[test]
    fn test_round_trip() {
        for s in ["5s", "1h30m0s", "300ms", "1.5µs", "100ns"] {
            assert_eq!(format_duration(parse_duration(s).unwrap()), s);
        }
    }
}
