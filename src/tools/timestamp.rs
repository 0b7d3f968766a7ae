//! Timestamp conversion, adjustment and differences
//!
//! Time zones are UTC or fixed offsets such as `+05:30`.

use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeDelta, TimeZone,
    Utc,
};

use super::ToolError;

/// Default strftime pattern for the readable format
pub const DEFAULT_READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    Unix,
    Iso,
    Readable,
}

impl FromStr for TimeFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unix" => Ok(TimeFormat::Unix),
            "iso" => Ok(TimeFormat::Iso),
            "readable" => Ok(TimeFormat::Readable),
            other => Err(ToolError::unsupported("time format", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl FromStr for TimeUnit {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" => Ok(TimeUnit::Days),
            "hours" => Ok(TimeUnit::Hours),
            "minutes" => Ok(TimeUnit::Minutes),
            "seconds" => Ok(TimeUnit::Seconds),
            other => Err(ToolError::unsupported("time unit", other)),
        }
    }
}

impl TimeUnit {
    fn delta(self, amount: i64) -> Option<TimeDelta> {
        match self {
            TimeUnit::Days => TimeDelta::try_days(amount),
            TimeUnit::Hours => TimeDelta::try_hours(amount),
            TimeUnit::Minutes => TimeDelta::try_minutes(amount),
            TimeUnit::Seconds => TimeDelta::try_seconds(amount),
        }
    }

    fn count(self, delta: TimeDelta) -> i64 {
        match self {
            TimeUnit::Days => delta.num_days(),
            TimeUnit::Hours => delta.num_hours(),
            TimeUnit::Minutes => delta.num_minutes(),
            TimeUnit::Seconds => delta.num_seconds(),
        }
    }
}

/// `UTC`, `Z` or a `±HH:MM` offset
pub fn parse_offset(zone: &str) -> Result<FixedOffset, ToolError> {
    let zone = zone.trim();
    if zone.is_empty() || zone.eq_ignore_ascii_case("utc") || zone == "Z" {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match zone.as_bytes().first() {
        Some(b'+') => (1, &zone[1..]),
        Some(b'-') => (-1, &zone[1..]),
        _ => return Err(ToolError::unsupported("time zone", zone)),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = match hours.parse::<u8>() {
        Ok(h) if h <= 23 => i32::from(h),
        _ => return Err(ToolError::unsupported("time zone", zone)),
    };
    let minutes: i32 = match minutes.parse::<u8>() {
        Ok(m) if m <= 59 => i32::from(m),
        _ => return Err(ToolError::unsupported("time zone", zone)),
    };

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| ToolError::unsupported("time zone", zone))
}

/// RFC 3339, or a naive date/time taken as UTC
pub fn parse_iso(input: &str) -> Result<DateTime<Utc>, ToolError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(ToolError::invalid("Invalid date input (use ISO format)."))
}

fn parse_input(
    input: &str,
    format: TimeFormat,
    readable: &str,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, ToolError> {
    match format {
        TimeFormat::Unix => {
            let secs: i64 = input
                .trim()
                .parse()
                .map_err(|_| ToolError::invalid("Invalid date input."))?;
            DateTime::from_timestamp(secs, 0).ok_or_else(|| ToolError::invalid("Invalid date input."))
        }
        TimeFormat::Iso => parse_iso(input),
        TimeFormat::Readable => {
            let naive = NaiveDateTime::parse_from_str(input.trim(), readable)
                .map_err(|e| ToolError::invalid(format!("Invalid date input: {}", e)))?;
            offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| ToolError::invalid("Invalid date input."))
        }
    }
}

fn iso_string(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    if offset.local_minus_utc() == 0 {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        dt.with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

/// Convert between unix seconds, ISO 8601 and a strftime pattern. Readable
/// input and output are interpreted in `zone`.
pub fn convert(
    input: &str,
    from: TimeFormat,
    to: TimeFormat,
    readable: Option<&str>,
    zone: Option<&str>,
) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::invalid("Please enter an input."));
    }
    let readable = readable.filter(|f| !f.is_empty()).unwrap_or(DEFAULT_READABLE_FORMAT);
    let offset = parse_offset(zone.unwrap_or("UTC"))?;
    let dt = parse_input(input, from, readable, offset)?;

    Ok(match to {
        TimeFormat::Unix => dt.timestamp().to_string(),
        TimeFormat::Iso => iso_string(dt, offset),
        TimeFormat::Readable => {
            use std::fmt::Write;
            let mut out = String::new();
            write!(out, "{}", dt.with_timezone(&offset).format(readable))
                .map_err(|_| ToolError::invalid("Invalid readable format"))?;
            out
        }
    })
}

/// Add or subtract a positive amount from an ISO timestamp
pub fn adjust(input: &str, amount: i64, unit: TimeUnit, subtract: bool) -> Result<String, ToolError> {
    if amount <= 0 {
        return Err(ToolError::invalid(
            "Please enter a valid input and adjustment value.",
        ));
    }
    let dt = parse_iso(input)?;
    let delta = unit
        .delta(amount)
        .ok_or_else(|| ToolError::invalid("Adjustment is out of range"))?;
    let adjusted = if subtract {
        dt.checked_sub_signed(delta)
    } else {
        dt.checked_add_signed(delta)
    }
    .ok_or_else(|| ToolError::invalid("Adjusted date is out of range"))?;

    Ok(adjusted.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Whole units from `start` to `end`, truncated toward zero
pub fn diff(start: &str, end: &str, unit: TimeUnit) -> Result<i64, ToolError> {
    let start = parse_iso(start)?;
    let end = parse_iso(end)?;
    Ok(unit.count(end - start))
}
