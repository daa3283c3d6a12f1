use super::models::{
    EventDateTime, ExtendedProperties, GoogleEvent, AVAILABILITY_PAYLOAD_KEY, EVENT_TYPE_KEY,
    SHIFT_PAYLOAD_KEY, TIME_OFF_SPAN_KEY,
};
use crate::components::transform::{EventRenderer, ShiftRender, TimeOffRender};
use crate::components::workjam::ScheduleEventType;
use crate::error::ShiftResult;

/// Renders transformed events as Google Calendar events
///
/// The source payload is embedded in private extended properties so that
/// later runs can tell whether an event changed.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleRenderer;

impl EventRenderer for GoogleRenderer {
    type Output = GoogleEvent;

    fn render_shift(&self, shift: ShiftRender<'_>) -> ShiftResult<GoogleEvent> {
        let tz = shift.shift.event.location.time_zone_id;
        let mut properties = ExtendedProperties::default();
        properties.insert_private(EVENT_TYPE_KEY, ScheduleEventType::Shift.as_str());
        properties.insert_private(SHIFT_PAYLOAD_KEY, &serde_json::to_string(shift.shift)?);

        Ok(GoogleEvent {
            ical_uid: Some(shift.uid),
            summary: Some(shift.summary.to_string()),
            description: Some(shift.description),
            location: Some(shift.location),
            start: Some(EventDateTime::timed(
                shift.start.with_timezone(&tz).fixed_offset(),
                tz.name(),
            )),
            end: Some(EventDateTime::timed(
                shift.end.with_timezone(&tz).fixed_offset(),
                tz.name(),
            )),
            extended_properties: Some(properties),
            ..Default::default()
        })
    }

    fn render_time_off(&self, time_off: TimeOffRender<'_>) -> ShiftResult<GoogleEvent> {
        let tz = time_off.start.timezone();
        let (first, after_last) = (time_off.start.date_naive(), time_off.end.date_naive());
        let mut properties = ExtendedProperties::default();
        properties.insert_private(
            EVENT_TYPE_KEY,
            ScheduleEventType::AvailabilityTimeOff.as_str(),
        );
        properties.insert_private(
            AVAILABILITY_PAYLOAD_KEY,
            &serde_json::to_string(time_off.availability)?,
        );
        properties.insert_private(TIME_OFF_SPAN_KEY, &format!("{}/{}", first, after_last));

        Ok(GoogleEvent {
            ical_uid: Some(time_off.uid),
            summary: Some(time_off.summary),
            start: Some(EventDateTime::all_day(first, tz.name())),
            end: Some(EventDateTime::all_day(after_last, tz.name())),
            extended_properties: Some(properties),
            ..Default::default()
        })
    }
}
