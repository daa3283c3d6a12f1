use crate::mocks::{
    availability_for, event, shift_for, MockWorkjam, COMPANY, DOMAIN,
};
use chrono::NaiveDate;
use shiftsync::components::google_calendar::models::{
    AVAILABILITY_PAYLOAD_KEY, EVENT_TYPE_KEY, SHIFT_PAYLOAD_KEY,
};
use shiftsync::components::google_calendar::GoogleRenderer;
use shiftsync::components::ical::IcalRenderer;
use shiftsync::components::transform::EventTransformer;
use shiftsync::components::workjam::ScheduleEventType::{
    AvailabilityTimeOff, NImporteQuoi, Shift as ShiftType, Unknown,
};
use shiftsync::components::workjam::{Availability, Shift, WorkjamApi};
use std::sync::atomic::Ordering;
use std::sync::Arc;

// Melbourne is UTC+11 in March 2024
const MON_MIDNIGHT: &str = "2024-03-03T13:00:00Z";
const WED_MIDNIGHT: &str = "2024-03-05T13:00:00Z";
const THU_MIDNIGHT: &str = "2024-03-06T13:00:00Z";
const FRI_0900: &str = "2024-03-07T22:00:00Z";
const FRI_1700: &str = "2024-03-08T06:00:00Z";

fn week() -> (MockWorkjam, Shift, Availability) {
    let friday = shift_for(&event("s-fri", ShiftType, FRI_0900, FRI_1700), "Checkout", &["Ann Lee"]);
    let first_off = availability_for(&event("t-1", AvailabilityTimeOff, MON_MIDNIGHT, WED_MIDNIGHT));
    let second_off = availability_for(&event("t-2", AvailabilityTimeOff, WED_MIDNIGHT, THU_MIDNIGHT));

    let api = MockWorkjam::new()
        .with_shift(friday.clone())
        .with_time_off(second_off)
        .with_time_off(first_off.clone())
        .with_roster("loc-S1", vec![friday.clone()]);

    (api, friday, first_off)
}

fn transformer<R: shiftsync::components::transform::EventRenderer>(
    api: Arc<MockWorkjam>,
    renderer: R,
) -> EventTransformer<R> {
    EventTransformer::new(api, COMPANY, DOMAIN, renderer).with_max_concurrency(4)
}

#[tokio::test]
async fn test_consolidated_week_renders_in_order() {
    let (api, _, _) = week();
    let api = Arc::new(api);
    let events = api.events.clone();

    let rendered = transformer(api.clone(), IcalRenderer)
        .transform_all(events)
        .await
        .unwrap();

    let uids: Vec<&str> = rendered.iter().map(|e| e.uid.as_str()).collect();
    assert_eq!(uids, vec!["t-1@shiftsync.test", "s-fri@shiftsync.test"]);

    // time off covers Monday through the end of Thursday's local day
    assert_eq!(rendered[0].summary, "Time Off");
    assert_eq!(rendered[0].start.to_rfc3339(), "2024-03-03T13:00:00+00:00");
    assert_eq!(rendered[0].end.to_rfc3339(), "2024-03-07T13:00:00+00:00");

    assert_eq!(rendered[1].summary, "Checkout");
    assert_eq!(rendered[1].start.to_rfc3339(), "2024-03-07T22:00:00+00:00");
    assert_eq!(
        rendered[1].location.as_deref(),
        Some("Docklands, 1 Harbour Esplanade, Docklands VIC 3008, Australia")
    );

    // only the merged time off is fetched
    assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_output_is_sorted_by_start() {
    let mut api = MockWorkjam::new();
    let starts = [
        ("c", "2024-03-12T22:00:00Z", "2024-03-13T02:00:00Z"),
        ("a", "2024-03-10T22:00:00Z", "2024-03-11T02:00:00Z"),
        ("b", "2024-03-11T22:00:00Z", "2024-03-12T02:00:00Z"),
    ];
    for (id, start, end) in starts {
        api = api.with_shift(shift_for(&event(id, ShiftType, start, end), "Bakery", &[]));
    }
    let api = Arc::new(api);
    let events = api.events.clone();

    let rendered = transformer(api, IcalRenderer)
        .transform_all(events)
        .await
        .unwrap();

    let starts: Vec<_> = rendered.iter().map(|e| e.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(rendered.len(), 3);
}

#[tokio::test]
async fn test_unknown_event_types_are_dropped() {
    let (api, _, _) = week();
    let api = Arc::new(
        api.with_event(event("odd", NImporteQuoi, FRI_0900, FRI_1700))
            .with_event(event("new", Unknown, FRI_0900, FRI_1700)),
    );
    let events = api.events.clone();

    let rendered = transformer(api, GoogleRenderer)
        .transform_all(events)
        .await
        .unwrap();

    assert_eq!(rendered.len(), 2);
    assert!(rendered.iter().all(|e| {
        let uid = e.ical_uid.as_deref().unwrap_or_default();
        !uid.starts_with("odd@") && !uid.starts_with("new@")
    }));
}

#[tokio::test]
async fn test_forbidden_roster_still_renders_shift() {
    let friday = shift_for(&event("s-fri", ShiftType, FRI_0900, FRI_1700), "Checkout", &["Ann Lee"]);
    // no roster registered, the mock answers 403
    let api = Arc::new(MockWorkjam::new().with_shift(friday.clone()));
    let events = api.events.clone();

    let rendered = transformer(api, GoogleRenderer)
        .transform_all(events)
        .await
        .unwrap();

    assert_eq!(rendered.len(), 1);
    let event = &rendered[0];
    assert_eq!(event.ical_uid.as_deref(), Some("s-fri@shiftsync.test"));
    assert_eq!(event.summary.as_deref(), Some("Checkout"));
    assert_eq!(event.description.as_deref(), Some("Checkout\n09:00 - 17:00"));
    assert_eq!(
        event.start.as_ref().and_then(|s| s.date_time).map(|d| d.to_rfc3339()),
        Some("2024-03-08T09:00:00+11:00".to_string())
    );
    assert_eq!(
        event.end.as_ref().and_then(|s| s.date_time).map(|d| d.to_rfc3339()),
        Some("2024-03-08T17:00:00+11:00".to_string())
    );
}

#[tokio::test]
async fn test_roster_is_described() {
    let friday = shift_for(&event("s-fri", ShiftType, FRI_0900, FRI_1700), "Checkout", &["Ann Lee"]);
    let bakery = shift_for(
        &event("s-bake", ShiftType, "2024-03-07T20:00:00Z", "2024-03-08T02:00:00Z"),
        "Bakery",
        &["Bob Ray"],
    );
    let api = Arc::new(
        MockWorkjam::new()
            .with_shift(friday.clone())
            .with_roster("loc-S1", vec![friday, bakery]),
    );
    let events = api.events.clone();

    let rendered = transformer(api, IcalRenderer)
        .transform_all(events)
        .await
        .unwrap();

    assert_eq!(
        rendered[0].description.as_deref(),
        Some("Checkout\n09:00 - 17:00\n\nRostered today:\n07:00 - 13:00  Bob Ray (Bakery)\n09:00 - 17:00  Ann Lee (Checkout)")
    );
}

#[tokio::test]
async fn test_payloads_round_trip() {
    let (api, friday, first_off) = week();
    let api = Arc::new(api);
    let events = api.events.clone();

    let rendered = transformer(api, GoogleRenderer)
        .transform_all(events)
        .await
        .unwrap();

    let time_off = &rendered[0];
    assert_eq!(
        time_off.private_property(EVENT_TYPE_KEY).as_deref(),
        Some("AVAILABILITY_TIME_OFF")
    );
    let payload = time_off.private_property(AVAILABILITY_PAYLOAD_KEY).unwrap();
    assert_eq!(serde_json::from_str::<Availability>(&payload).unwrap(), first_off);
    assert_eq!(
        time_off.start.as_ref().and_then(|s| s.date),
        NaiveDate::from_ymd_opt(2024, 3, 4)
    );
    assert_eq!(
        time_off.end.as_ref().and_then(|s| s.date),
        NaiveDate::from_ymd_opt(2024, 3, 8)
    );

    let shift = &rendered[1];
    let payload = shift.private_property(SHIFT_PAYLOAD_KEY).unwrap();
    assert_eq!(serde_json::from_str::<Shift>(&payload).unwrap(), friday);
}

#[tokio::test]
async fn test_failed_detail_fetch_fails_batch() {
    let (api, _, _) = week();
    let api = Arc::new(api.with_event(event("ghost", ShiftType, FRI_0900, FRI_1700)));
    let events = api.events.clone();

    let result = transformer(api, IcalRenderer).transform_all(events).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_employers_fetched_once_per_run() {
    let mut api = MockWorkjam::new();
    for day in 11..16 {
        let start = format!("2024-03-{}T22:00:00Z", day);
        let end = format!("2024-03-{}T02:00:00Z", day + 1);
        let id = format!("s{}", day);
        api = api.with_shift(shift_for(&event(&id, ShiftType, &start, &end), "Bakery", &[]));
    }
    let api = Arc::new(api);
    let events = api.events.clone();

    let rendered = transformer(api.clone(), IcalRenderer)
        .transform_all(events)
        .await
        .unwrap();

    assert_eq!(rendered.len(), 5);
    assert_eq!(api.employer_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.user_id(), "1001");
}
