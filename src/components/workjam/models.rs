use super::timestamp;
use crate::error::{config_error, ShiftResult};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Kind of a schedule event as reported by Workjam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleEventType {
    Shift,
    AvailabilityTimeOff,
    NImporteQuoi,
    #[serde(other)]
    Unknown,
}

impl ScheduleEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleEventType::Shift => "SHIFT",
            ScheduleEventType::AvailabilityTimeOff => "AVAILABILITY_TIME_OFF",
            ScheduleEventType::NImporteQuoi => "N_IMPORTE_QUOI",
            ScheduleEventType::Unknown => "UNKNOWN",
        }
    }
}

/// Location reference attached to every schedule event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub external_id: String,
    pub time_zone_id: Tz,
    #[serde(default)]
    pub name: Option<String>,
}

/// A calendar-worthy occurrence in an employee's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: ScheduleEventType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(with = "timestamp")]
    pub start_date_time: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_date_time: DateTime<Utc>,
    pub location: Location,
}

impl ScheduleEvent {
    pub fn is_time_off(&self) -> bool {
        self.event_type == ScheduleEventType::AvailabilityTimeOff
    }

    /// Copy of this event ending at `end`
    pub fn with_end(&self, end: DateTime<Utc>) -> Self {
        Self {
            end_date_time: end,
            ..self.clone()
        }
    }
}

/// Role a shift is staffed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub external_code: Option<String>,
}

impl EmployeeProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub profile: EmployeeProfile,
    #[serde(default)]
    pub booking_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A SHIFT event with its assignment detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub event: ScheduleEvent,
    pub position: Position,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

/// An AVAILABILITY_TIME_OFF event with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub id: Option<String>,
    pub event: ScheduleEvent,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Employee record as returned by the company employee endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub external_code: Option<String>,
}

/// Coworkers on a shift, grouped by the position they fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoworkerGroup {
    pub position: Position,
    #[serde(default)]
    pub employees: Vec<EmployeeProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employers {
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    #[serde(default)]
    pub stores: Vec<Store>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub store_name: String,
    pub store_address: Address,
    pub external_id: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_line1: String,
    #[serde(default)]
    pub street_line2: Option<String>,
    #[serde(default)]
    pub street_line3: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub city: City,
    pub province: City,
    pub country: Country,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbr: Option<String>,
    #[serde(default)]
    pub time_zone_id: Option<Tz>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iso2: Option<String>,
}

impl Store {
    /// Single-line postal address used as the calendar event location
    pub fn render_address(&self) -> String {
        let address = &self.store_address;
        let mut out = format!("{}, {}", self.store_name, address.street_line1.trim());

        for line in [&address.street_line2, &address.street_line3]
            .into_iter()
            .flatten()
        {
            if !line.trim().is_empty() {
                out.push(' ');
                out.push_str(line.trim());
            }
        }

        let locality: Vec<&str> = [
            address.city.name.as_deref(),
            address.province.name.as_deref(),
            address.postal_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
        if !locality.is_empty() {
            out.push_str(", ");
            out.push_str(&locality.join(" "));
        }

        if let Some(country) = address.country.name.as_deref().filter(|s| !s.is_empty()) {
            out.push_str(", ");
            out.push_str(country);
        }

        out
    }
}

/// The company and primary store the schedule is synced for
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryStore {
    pub company_id: String,
    pub store: Store,
    pub time_zone: Tz,
}

impl Employers {
    /// Resolve the single company and its single primary store
    pub fn primary_store(&self) -> ShiftResult<PrimaryStore> {
        let company = match self.companies.as_slice() {
            [company] => company,
            [] => return Err(config_error("Employee is not employed by any company")),
            _ => {
                return Err(config_error(
                    "Employee is employed at more than 1 company - Not currently supported",
                ))
            }
        };

        let mut primaries = company.stores.iter().filter(|s| s.primary);
        let store = match (primaries.next(), primaries.next()) {
            (Some(store), None) => store,
            (None, _) => return Err(config_error("Employee has no primary store")),
            (Some(_), Some(_)) => {
                return Err(config_error(
                    "Employee has more than 1 primary store - Not currently supported",
                ))
            }
        };

        let time_zone = store
            .store_address
            .city
            .time_zone_id
            .ok_or_else(|| config_error("Primary store does not have a time zone id"))?;

        Ok(PrimaryStore {
            company_id: company.id.to_string(),
            store: store.clone(),
            time_zone,
        })
    }

    /// Find a store by external id across every company
    pub fn find_store(&self, external_id: &str) -> Option<&Store> {
        self.companies
            .iter()
            .flat_map(|c| c.stores.iter())
            .find(|s| s.external_id == external_id)
    }
}
