//! Serde adapter for Workjam timestamps.
//!
//! The API writes `yyyy-MM-ddTHH:mm:ss.SSS` followed by a zone suffix whose
//! shape varies between endpoints: `Z`, `+10`, `+1000`, `+10:00`, `GMT+10`,
//! `UTC+10:00`. Everything is normalised to UTC.

use crate::error::{workjam_error, ShiftResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const BASE_LEN: usize = "yyyy-MM-ddTHH:mm:ss".len();
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Parse a Workjam timestamp into a UTC instant
pub fn parse_timestamp(value: &str) -> ShiftResult<DateTime<Utc>> {
    let value = value.trim();
    let invalid = || workjam_error(&format!("Invalid timestamp: {:?}", value));

    if value.len() < BASE_LEN || !value.is_char_boundary(BASE_LEN) {
        return Err(invalid());
    }

    let (base, mut rest) = value.split_at(BASE_LEN);
    let mut naive =
        NaiveDateTime::parse_from_str(base, "%Y-%m-%dT%H:%M:%S").map_err(|_| invalid())?;

    if let Some(fraction) = rest.strip_prefix('.') {
        let digits = fraction.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 || digits > 9 {
            return Err(invalid());
        }
        let nanos: u32 = format!("{:0<9}", &fraction[..digits])
            .parse()
            .map_err(|_| invalid())?;
        naive = naive.with_nanosecond(nanos).ok_or_else(invalid)?;
        rest = &fraction[digits..];
    }

    let offset = parse_offset(rest).ok_or_else(invalid)?;
    let zoned = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(invalid)?;

    Ok(zoned.with_timezone(&Utc))
}

/// Format an instant the way payloads are stored, parseable by [`parse_timestamp`]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

fn parse_offset(suffix: &str) -> Option<FixedOffset> {
    if suffix == "Z" {
        return FixedOffset::east_opt(0);
    }

    let suffix = suffix
        .strip_prefix("GMT")
        .or_else(|| suffix.strip_prefix("UTC"))
        .map(|s| if s.is_empty() { "+00" } else { s })
        .unwrap_or(suffix);

    let (sign, body) = match suffix.as_bytes().first()? {
        b'+' => (1, &suffix[1..]),
        b'-' => (-1, &suffix[1..]),
        _ => return None,
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }

    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None if body.len() == 4 => body.split_at(2),
        None => (body, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
