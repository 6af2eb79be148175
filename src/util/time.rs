use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIntervalError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for InvalidIntervalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid interval {:?}: {}", self.input, self.reason)
    }
}

impl std::error::Error for InvalidIntervalError {}

// Parse an interval like "30s", "1m", "1h30m", "250ms" or "1.5h".
// Each component is a decimal number followed by one of h, m, s, ms, us, ns.
pub fn parse_interval(s: &str) -> Result<Duration, InvalidIntervalError> {
    let err = |reason| InvalidIntervalError { input: s.to_string(), reason };
    let mut rest = s.trim();
    if rest.is_empty() { return Err(err("empty")); }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let num_end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        if num_end == 0 { return Err(err("expected a number")); }
        let value: f64 = rest[..num_end].parse().map_err(|_| err("malformed number"))?;
        rest = &rest[num_end..];

        let unit_end = rest.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(rest.len());
        let nanos_per_unit: f64 = match &rest[..unit_end] {
            "h" => 3_600e9,
            "m" => 60e9,
            "s" => 1e9,
            "ms" => 1e6,
            "us" | "µs" => 1e3,
            "ns" => 1.0,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };
        rest = &rest[unit_end..];
        total += Duration::from_nanos((value * nanos_per_unit).round() as u64);
    }

    if total.is_zero() { return Err(err("interval must be positive")); }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_units() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_interval("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn compound_and_fractional() {
        assert_eq!(parse_interval("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "   ", "10", "abc", "5x", "m", "0s", "1..5s"] {
            assert!(parse_interval(bad).is_err(), "{bad:?} should be rejected");
        }
        let e = parse_interval("10").unwrap_err();
        assert_eq!(e.reason, "missing unit");
        assert_eq!(e.to_string(), "invalid interval \"10\": missing unit");
    }
}
