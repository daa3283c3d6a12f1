use crate::components::workjam::Shift;
use crate::utils::time::format_time_range;
use chrono::{DateTime, Utc};
use rust_i18n::t;

/// Turns a shift into a short calendar title
pub trait SummaryGenerator: Send + Sync {
    fn generate(&self, shift: &Shift) -> String;
}

/// Turns an enriched shift into a calendar description
pub trait DescriptionGenerator: Send + Sync {
    fn generate(&self, shift: &DescribableShift) -> String;
}

/// One person rostered at the store on the shift's day
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub name: String,
    pub position: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A shift with its summary and the day's roster at the same store
#[derive(Debug, Clone, PartialEq)]
pub struct DescribableShift {
    pub shift: Shift,
    pub summary: String,
    pub roster: Vec<RosterEntry>,
}

impl DescribableShift {
    /// Flatten the store's shifts into one entry per assignee, ordered by start
    pub fn create(shift: Shift, summary: String, store_roster: &[Shift]) -> Self {
        let mut roster: Vec<RosterEntry> = store_roster
            .iter()
            .flat_map(|s| {
                s.assignees.iter().map(move |a| RosterEntry {
                    name: a.profile.full_name(),
                    position: s.position.name.clone(),
                    start: s.event.start_date_time,
                    end: s.event.end_date_time,
                })
            })
            .collect();

        roster.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.end.cmp(&b.end))
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            shift,
            summary,
            roster,
        }
    }
}

/// Uses the position name, e.g. "Checkout Operator"
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSummaryGenerator;

impl SummaryGenerator for DefaultSummaryGenerator {
    fn generate(&self, shift: &Shift) -> String {
        let position = shift.position.name.trim();
        if !position.is_empty() {
            return position.to_string();
        }

        match shift.event.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => t!("shift_summary_fallback").to_string(),
        }
    }
}

/// Summary and time of the shift, followed by everyone rostered that day
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDescriptionGenerator;

impl DescriptionGenerator for DefaultDescriptionGenerator {
    fn generate(&self, describable: &DescribableShift) -> String {
        let event = &describable.shift.event;
        let tz = event.location.time_zone_id;

        let mut lines = vec![
            describable.summary.clone(),
            format_time_range(event.start_date_time, event.end_date_time, tz),
        ];

        if !describable.roster.is_empty() {
            lines.push(String::new());
            lines.push(t!("description_rostered_today").to_string());
            for entry in &describable.roster {
                lines.push(
                    t!(
                        "description_roster_line",
                        time = format_time_range(entry.start, entry.end, tz),
                        name = entry.name,
                        position = entry.position
                    )
                    .to_string(),
                );
            }
        }

        lines.join("\n")
    }
}
