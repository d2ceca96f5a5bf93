//! Run-time settings passed into the pipeline.
//!
//! The library never reads the environment; the binary resolves CLI flags,
//! env vars and `.env` into a [`DashboardConfig`].

use chrono::{FixedOffset, Offset, Utc};

/// Number of rows kept in each ranking unless overridden.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct DashboardConfig {
    /// Offset applied when converting feed epoch timestamps to calendar time.
    pub utc_offset: FixedOffset,
    /// Length cap for each top-N ranking.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utc_offset: utc(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parses a UTC offset such as `+05:30`, `-08:00`, `+09` or `UTC`.
///
/// Used as a `clap` value parser, hence the `String` error.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s == "Z" {
        return Ok(utc());
    }

    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(format!("offset '{s}' must start with '+' or '-'")),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours
        .parse()
        .map_err(|_| format!("invalid hours in offset '{s}'"))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| format!("invalid minutes in offset '{s}'"))?;
    if hours > 23 || !(0..60).contains(&minutes) {
        return Err(format!("offset '{s}' is out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("offset '{s}' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_utc_top_ten() {
        let config = DashboardConfig::default();
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_parse_utc_aliases() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+00:00").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_signed_offsets() {
        assert_eq!(
            parse_utc_offset("+05:30").unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
        assert_eq!(parse_utc_offset("-08:00").unwrap().local_minus_utc(), -8 * 3600);
        assert_eq!(parse_utc_offset("+09").unwrap().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_utc_offset("05:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
        assert!(parse_utc_offset("+ab").is_err());
    }
}
