use crate::error::{config_error, ShiftResult};
use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a date string in YYYY-MM-DD format
pub fn parse_date(date_str: &str) -> ShiftResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        config_error(&format!(
            "A date in the YYYY-MM-DD format is required, got {:?}",
            date_str
        ))
    })
}

/// First instant of a local calendar day
///
/// When midnight falls in a DST gap the day starts at the first valid
/// local time after it.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> ShiftResult<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);

    for hour in 0..3 {
        let candidate = midnight + chrono::Duration::hours(hour);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Ok(dt);
        }
    }

    Err(config_error(&format!(
        "Could not resolve start of day {} in {}",
        date, tz
    )))
}

/// The local calendar day containing `instant`, as `[midnight, next midnight)`
pub fn day_bounds(instant: DateTime<Utc>, tz: Tz) -> ShiftResult<(DateTime<Tz>, DateTime<Tz>)> {
    let date = instant.with_timezone(&tz).date_naive();
    let next = next_day(date)?;
    Ok((local_midnight(date, tz)?, local_midnight(next, tz)?))
}

/// Window from the start of `from` to the start of the day after `to`
pub fn date_window(
    from: NaiveDate,
    to: NaiveDate,
    tz: Tz,
) -> ShiftResult<(DateTime<Tz>, DateTime<Tz>)> {
    if to < from {
        return Err(config_error(&format!(
            "End date {} is before start date {}",
            to, from
        )));
    }
    Ok((local_midnight(from, tz)?, local_midnight(next_day(to)?, tz)?))
}

/// Default end of a sync window, one month after its start
pub fn default_window_end(from: NaiveDate) -> ShiftResult<NaiveDate> {
    from.checked_add_months(Months::new(1))
        .ok_or_else(|| config_error("Date out of range"))
}

pub fn next_day(date: NaiveDate) -> ShiftResult<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| config_error("Date out of range"))
}

/// Format a local time range, e.g. `09:00 - 17:30`
pub fn format_time_range(start: DateTime<Utc>, end: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "{} - {}",
        start.with_timezone(&tz).format("%H:%M"),
        end.with_timezone(&tz).format("%H:%M")
    )
}
