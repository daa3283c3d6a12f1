use crate::components::transform::{EventRenderer, ShiftRender, TimeOffRender};
use crate::error::ShiftResult;
use chrono::{DateTime, Utc};

/// A single VEVENT
#[derive(Debug, Clone, PartialEq)]
pub struct VEvent {
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IcalRenderer;

impl EventRenderer for IcalRenderer {
    type Output = VEvent;

    fn render_shift(&self, shift: ShiftRender<'_>) -> ShiftResult<VEvent> {
        Ok(VEvent {
            uid: shift.uid,
            start: shift.start,
            end: shift.end,
            summary: shift.summary.to_string(),
            description: Some(shift.description),
            location: Some(shift.location),
        })
    }

    fn render_time_off(&self, time_off: TimeOffRender<'_>) -> ShiftResult<VEvent> {
        Ok(VEvent {
            uid: time_off.uid,
            start: time_off.start.with_timezone(&Utc),
            end: time_off.end.with_timezone(&Utc),
            summary: time_off.summary,
            description: None,
            location: None,
        })
    }
}
