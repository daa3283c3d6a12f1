use crate::components::workjam::ScheduleEvent;

/// Merge every time-off event into one span and order the result by start
///
/// All time-off events collapse into a single event covering the earliest
/// start to the latest end, whatever the gaps between them. The merged event
/// keeps the id of the earliest time-off event. Other events pass through
/// untouched.
pub fn consolidate(events: Vec<ScheduleEvent>) -> Vec<ScheduleEvent> {
    let (mut time_off, mut others): (Vec<_>, Vec<_>) =
        events.into_iter().partition(ScheduleEvent::is_time_off);

    time_off.sort_by_key(|e| e.start_date_time);

    let merged = time_off
        .into_iter()
        .fold(Vec::<ScheduleEvent>::new(), |mut acc, event| {
            match acc.last_mut() {
                Some(last) if last.is_time_off() => {
                    if event.end_date_time > last.end_date_time {
                        *last = last.with_end(event.end_date_time);
                    }
                }
                _ => acc.push(event),
            }
            acc
        });

    others.extend(merged);
    others.sort_by_key(|e| e.start_date_time);
    others
}
