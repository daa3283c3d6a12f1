use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Google limits each extended property value to 1024 characters
pub const MAX_PROPERTY_VALUE_LEN: usize = 1024;

pub const SHIFT_PAYLOAD_KEY: &str = "shift:json";
pub const AVAILABILITY_PAYLOAD_KEY: &str = "availability:json";
pub const EVENT_TYPE_KEY: &str = "schedule-event-type";
/// Rendered `start/end` dates of a time-off event, which may cover several merged availabilities
pub const TIME_OFF_SPAN_KEY: &str = "time-off-span";

/// Google Calendar event resource, the fields we manage plus everything else untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "iCalUID", default, skip_serializing_if = "Option::is_none")]
    pub ical_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
    /// Reminders, colours and anything else a user may have added
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Either a timed instant or an all-day date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn timed(date_time: DateTime<FixedOffset>, time_zone: &str) -> Self {
        Self {
            date_time: Some(date_time),
            date: None,
            time_zone: Some(time_zone.to_string()),
        }
    }

    pub fn all_day(date: NaiveDate, time_zone: &str) -> Self {
        Self {
            date_time: None,
            date: Some(date),
            time_zone: Some(time_zone.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub private: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared: BTreeMap<String, String>,
}

fn chunk_key(key: &str, index: usize) -> String {
    if index == 0 {
        key.to_string()
    } else {
        format!("{}#{}", key, index)
    }
}

/// Split on char boundaries into pieces of at most `MAX_PROPERTY_VALUE_LEN` chars
fn chunks(value: &str) -> Vec<String> {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(MAX_PROPERTY_VALUE_LEN)
        .map(|c| c.iter().collect())
        .collect()
}

impl ExtendedProperties {
    /// Store a private value, split over `key`, `key#1`, `key#2`... when long
    pub fn insert_private(&mut self, key: &str, value: &str) {
        self.remove_private(key);
        for (index, chunk) in chunks(value).into_iter().enumerate() {
            self.private.insert(chunk_key(key, index), chunk);
        }
    }

    /// Reassemble a private value written by `insert_private`
    pub fn get_private(&self, key: &str) -> Option<String> {
        let mut value = self.private.get(key)?.clone();
        let mut index = 1;
        while let Some(chunk) = self.private.get(&chunk_key(key, index)) {
            value.push_str(chunk);
            index += 1;
        }
        Some(value)
    }

    pub fn remove_private(&mut self, key: &str) {
        let mut index = 0;
        while self.private.remove(&chunk_key(key, index)).is_some() {
            index += 1;
        }
    }
}

/// What the syncer compares to decide whether an event changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFingerprint {
    pub event_type: Option<String>,
    pub shift: Option<String>,
    pub availability: Option<String>,
    pub span: Option<String>,
}

impl GoogleEvent {
    pub fn private_property(&self, key: &str) -> Option<String> {
        self.extended_properties.as_ref()?.get_private(key)
    }

    pub fn fingerprint(&self) -> SyncFingerprint {
        SyncFingerprint {
            event_type: self.private_property(EVENT_TYPE_KEY),
            shift: self.private_property(SHIFT_PAYLOAD_KEY),
            availability: self.private_property(AVAILABILITY_PAYLOAD_KEY),
            span: self.private_property(TIME_OFF_SPAN_KEY),
        }
    }

    /// Copy of `self` with the content fields of `desired`, keeping identity and user metadata
    pub fn updated_with(&self, desired: &GoogleEvent) -> GoogleEvent {
        let mut updated = self.clone();
        updated.summary = desired.summary.clone();
        updated.description = desired.description.clone();
        updated.location = desired.location.clone();
        updated.start = desired.start.clone();
        updated.end = desired.end.clone();

        let shared = self
            .extended_properties
            .as_ref()
            .map(|p| p.shared.clone())
            .unwrap_or_default();
        let private = desired
            .extended_properties
            .as_ref()
            .map(|p| p.private.clone())
            .unwrap_or_default();
        updated.extended_properties = Some(ExtendedProperties { private, shared });
        updated
    }
}
