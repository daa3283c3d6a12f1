use crate::mocks::{
    availability_for, event, shift_for, utc, MockCalendar, MockWorkjam, COMPANY, DOMAIN,
};
use chrono::NaiveDate;
use shiftsync::components::google_calendar::{
    CalendarSyncer, ExtendedProperties, GoogleEvent, GoogleRenderer, SyncOperation, SyncWindow,
};
use shiftsync::components::transform::EventTransformer;
use shiftsync::components::workjam::ScheduleEventType::{AvailabilityTimeOff, Shift};
use shiftsync::error::Error;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn window() -> SyncWindow {
    SyncWindow {
        start: utc("2024-02-29T13:00:00Z"),
        end: utc("2024-03-31T13:00:00Z"),
    }
}

fn desired(uid: &str, payload: &str) -> GoogleEvent {
    let mut properties = ExtendedProperties::default();
    properties.insert_private("schedule-event-type", "SHIFT");
    properties.insert_private("shift:json", payload);
    GoogleEvent {
        ical_uid: Some(uid.to_string()),
        summary: Some(format!("summary of {}", payload)),
        extended_properties: Some(properties),
        ..Default::default()
    }
}

fn syncer(calendar: &Arc<MockCalendar>) -> CalendarSyncer {
    CalendarSyncer::new(calendar.clone(), "cal", DOMAIN)
}

#[tokio::test]
async fn test_insert_new_delete_orphan_skip_unchanged() {
    let z = desired("Z@shiftsync.test", "z");
    let calendar = Arc::new(MockCalendar::new().with_event("X@shiftsync.test", "gx"));
    {
        let mut stored = z.clone();
        stored.id = Some("gz".to_string());
        calendar.events.lock().unwrap().push(stored);
    }

    let report = syncer(&calendar)
        .sync(window(), vec![desired("Y@shiftsync.test", "y"), z])
        .await
        .unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.updated, 0);
    assert!(report.failures.is_empty());

    assert_eq!(calendar.inserts.load(Ordering::SeqCst), 1);
    assert_eq!(calendar.deletes.load(Ordering::SeqCst), 1);
    assert_eq!(calendar.updates.load(Ordering::SeqCst), 0);
    assert_eq!(calendar.uids(), vec!["Y@shiftsync.test", "Z@shiftsync.test"]);
}

#[tokio::test]
async fn test_changed_payload_updates_in_place() {
    let calendar = Arc::new(MockCalendar::new());
    let syncer = syncer(&calendar);
    syncer
        .sync(window(), vec![desired("A@shiftsync.test", "v1")])
        .await
        .unwrap();
    let id_before = calendar.events.lock().unwrap()[0].id.clone();

    let report = syncer
        .sync(window(), vec![desired("A@shiftsync.test", "v2")])
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.deleted, 0);

    let events = calendar.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id_before);
    assert_eq!(events[0].summary.as_deref(), Some("summary of v2"));
}

#[tokio::test]
async fn test_foreign_events_are_left_alone() {
    let calendar = Arc::new(
        MockCalendar::new()
            .with_event("dentist@google.com", "g1")
            .with_event("1@other.domain", "g2"),
    );
    calendar.events.lock().unwrap().push(GoogleEvent {
        id: Some("g3".to_string()),
        ..Default::default()
    });

    let report = syncer(&calendar).sync(window(), Vec::new()).await.unwrap();

    assert_eq!(report.mutations(), 0);
    assert_eq!(calendar.events.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_uids_are_cleaned_up() {
    let calendar = Arc::new(
        MockCalendar::new()
            .with_event("D@shiftsync.test", "g1")
            .with_event("D@shiftsync.test", "g2"),
    );

    let report = syncer(&calendar)
        .sync(window(), vec![desired("D@shiftsync.test", "d")])
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(calendar.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failures_are_collected_not_fatal() {
    let calendar = Arc::new(
        MockCalendar::new()
            .with_event("gone@shiftsync.test", "g1")
            .with_event("stuck@shiftsync.test", "g2")
            .failing_on("bad@shiftsync.test")
            .failing_on("stuck@shiftsync.test"),
    );

    let report = syncer(&calendar)
        .sync(
            window(),
            vec![
                desired("bad@shiftsync.test", "b"),
                desired("good@shiftsync.test", "g"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failures.len(), 2);

    let mut failed: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.uid.as_str(), f.operation))
        .collect();
    failed.sort_by_key(|(uid, _)| uid.to_string());
    assert_eq!(
        failed,
        vec![
            ("bad@shiftsync.test", SyncOperation::Insert),
            ("stuck@shiftsync.test", SyncOperation::Delete),
        ]
    );

    match report.into_result() {
        Err(Error::Sync { failed_uids }) => assert_eq!(failed_uids.len(), 2),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_second_run_makes_no_calls() {
    let friday = shift_for(
        &event("s1", Shift, "2024-03-07T22:00:00Z", "2024-03-08T06:00:00Z"),
        "Checkout",
        &["Ann Lee"],
    );
    let off = availability_for(&event(
        "t1",
        AvailabilityTimeOff,
        "2024-03-03T13:00:00Z",
        "2024-03-05T13:00:00Z",
    ));
    let api = Arc::new(
        MockWorkjam::new()
            .with_shift(friday.clone())
            .with_time_off(off)
            .with_roster("loc-S1", vec![friday]),
    );
    let transformer = EventTransformer::new(api.clone(), COMPANY, DOMAIN, GoogleRenderer);

    let calendar = Arc::new(MockCalendar::new().with_event("cancelled@shiftsync.test", "g0"));
    let syncer = syncer(&calendar);

    let first = transformer.transform_all(api.events.clone()).await.unwrap();
    let report = syncer.sync(window(), first).await.unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.deleted, 1);

    calendar.reset_counters();
    let second = transformer.transform_all(api.events.clone()).await.unwrap();
    let report = syncer.sync(window(), second).await.unwrap();

    assert_eq!(report.unchanged, 2);
    assert_eq!(report.mutations(), 0);
    assert_eq!(calendar.mutations(), 0);
}

fn stored(calendar: &MockCalendar, uid: &str) -> GoogleEvent {
    calendar
        .events
        .lock()
        .unwrap()
        .iter()
        .find(|e| e.ical_uid.as_deref() == Some(uid))
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn test_grown_time_off_is_updated() {
    let monday_to_wednesday = availability_for(&event(
        "t-1",
        AvailabilityTimeOff,
        "2024-03-03T13:00:00Z",
        "2024-03-05T13:00:00Z",
    ));
    let wednesday_to_thursday = availability_for(&event(
        "t-2",
        AvailabilityTimeOff,
        "2024-03-05T13:00:00Z",
        "2024-03-06T13:00:00Z",
    ));
    let calendar = Arc::new(MockCalendar::new());
    let syncer = syncer(&calendar);

    let before = Arc::new(MockWorkjam::new().with_time_off(monday_to_wednesday.clone()));
    let events = EventTransformer::new(before.clone(), COMPANY, DOMAIN, GoogleRenderer)
        .transform_all(before.events.clone())
        .await
        .unwrap();
    let report = syncer.sync(window(), events).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(
        stored(&calendar, "t-1@shiftsync.test").end.and_then(|e| e.date),
        NaiveDate::from_ymd_opt(2024, 3, 7)
    );

    let after = Arc::new(
        MockWorkjam::new()
            .with_time_off(monday_to_wednesday)
            .with_time_off(wednesday_to_thursday),
    );
    let events = EventTransformer::new(after.clone(), COMPANY, DOMAIN, GoogleRenderer)
        .transform_all(after.events.clone())
        .await
        .unwrap();
    calendar.reset_counters();
    let report = syncer.sync(window(), events).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.unchanged, 0);
    assert_eq!(calendar.mutations(), 1);
    assert_eq!(
        stored(&calendar, "t-1@shiftsync.test").end.and_then(|e| e.date),
        NaiveDate::from_ymd_opt(2024, 3, 8)
    );
}

#[tokio::test]
async fn test_moved_shift_is_updated() {
    let friday = shift_for(
        &event("s1", Shift, "2024-03-07T22:00:00Z", "2024-03-08T06:00:00Z"),
        "Checkout",
        &["Ann Lee"],
    );
    let later = shift_for(
        &event("s1", Shift, "2024-03-07T23:00:00Z", "2024-03-08T07:00:00Z"),
        "Checkout",
        &["Ann Lee"],
    );
    let calendar = Arc::new(MockCalendar::new());
    let syncer = syncer(&calendar);

    for (shift, inserted, updated) in [(friday, 1, 0), (later, 0, 1)] {
        let api = Arc::new(
            MockWorkjam::new()
                .with_shift(shift.clone())
                .with_roster("loc-S1", vec![shift]),
        );
        let events = EventTransformer::new(api.clone(), COMPANY, DOMAIN, GoogleRenderer)
            .transform_all(api.events.clone())
            .await
            .unwrap();
        let report = syncer.sync(window(), events).await.unwrap();
        assert_eq!((report.inserted, report.updated), (inserted, updated));
    }

    let start = stored(&calendar, "s1@shiftsync.test")
        .start
        .and_then(|s| s.date_time)
        .map(|d| d.to_rfc3339());
    assert_eq!(start.as_deref(), Some("2024-03-08T10:00:00+11:00"));
    assert_eq!(calendar.events.lock().unwrap().len(), 1);
}
