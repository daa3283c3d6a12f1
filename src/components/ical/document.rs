use super::render::VEvent;
use chrono::{DateTime, Utc};
use ical::generator::{Emitter, IcalCalendarBuilder, IcalEvent, Property};

pub const PRODID: &str = "-//shiftsync//workjam schedule//EN";

fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.replace("\r\n", "\n").chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn property(name: &str, value: String) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value),
    }
}

fn text(name: &str, value: &str) -> Property {
    property(name, escape_text(value))
}

fn vevent(event: &VEvent, stamp: &str) -> IcalEvent {
    let mut vevent = IcalEvent::new();
    vevent.properties.push(text("UID", &event.uid));
    vevent.properties.push(property("DTSTAMP", stamp.to_string()));
    vevent.properties.push(property("DTSTART", format_utc(event.start)));
    vevent.properties.push(property("DTEND", format_utc(event.end)));
    vevent.properties.push(text("SUMMARY", &event.summary));
    if let Some(description) = &event.description {
        vevent.properties.push(text("DESCRIPTION", description));
    }
    if let Some(location) = &event.location {
        vevent.properties.push(text("LOCATION", location));
    }
    vevent
}

/// Render a complete VCALENDAR with one VEVENT per event
pub fn write_calendar(events: &[VEvent], now: DateTime<Utc>) -> String {
    let stamp = format_utc(now);
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PRODID)
        .build();

    calendar
        .properties
        .push(property("LAST-MODIFIED", stamp.clone()));
    calendar
        .events
        .extend(events.iter().map(|event| vevent(event, &stamp)));

    calendar.generate()
}
