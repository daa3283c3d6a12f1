use super::client::CalendarApi;
use super::models::GoogleEvent;
use crate::error::{google_calendar_error, transform_error, Error, ShiftResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Range of the calendar owned by a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Insert => write!(f, "insert"),
            SyncOperation::Update => write!(f, "update"),
            SyncOperation::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub uid: String,
    pub operation: SyncOperation,
    pub error: String,
}

/// Outcome of one sync run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn mutations(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    pub fn failed_uids(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.uid.clone()).collect()
    }

    /// `Error::Sync` naming every failed UID, if any call failed
    pub fn into_result(self) -> ShiftResult<SyncReport> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(Error::Sync {
                failed_uids: self.failed_uids(),
            })
        }
    }

    fn record(&mut self, uid: &str, operation: SyncOperation, result: ShiftResult<()>) {
        match result {
            Ok(()) => {
                info!(uid, %operation, "Calendar event synced");
                match operation {
                    SyncOperation::Insert => self.inserted += 1,
                    SyncOperation::Update => self.updated += 1,
                    SyncOperation::Delete => self.deleted += 1,
                }
            }
            Err(e) => {
                warn!(uid, %operation, error = %e, "Calendar mutation failed");
                self.failures.push(SyncFailure {
                    uid: uid.to_string(),
                    operation,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Reconciles a calendar window with the desired set of events
pub struct CalendarSyncer {
    api: Arc<dyn CalendarApi>,
    calendar_id: String,
    domain: String,
}

impl CalendarSyncer {
    pub fn new(
        api: Arc<dyn CalendarApi>,
        calendar_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            api,
            calendar_id: calendar_id.into(),
            domain: domain.into(),
        }
    }

    fn owns(&self, uid: &str) -> bool {
        uid.strip_suffix(&self.domain)
            .is_some_and(|rest| rest.ends_with('@'))
    }

    /// Insert new events, update changed ones and delete the ones that disappeared
    ///
    /// Only events whose UID carries our domain are touched. Events whose
    /// payload is unchanged cost no API call, so a repeated run with the
    /// same input makes no mutations. Failed calls are collected in the
    /// report instead of stopping the run. Listing the window is the only
    /// fatal step.
    pub async fn sync(
        &self,
        window: SyncWindow,
        desired: Vec<GoogleEvent>,
    ) -> ShiftResult<SyncReport> {
        let listed = self
            .api
            .list_events(&self.calendar_id, window.start, window.end)
            .await?;

        let mut existing: HashMap<String, GoogleEvent> = HashMap::new();
        let mut orphans: Vec<GoogleEvent> = Vec::new();
        for event in listed {
            let Some(uid) = event.ical_uid.clone() else {
                continue;
            };
            if !self.owns(&uid) {
                continue;
            }
            if existing.contains_key(&uid) {
                // duplicate UID, keep the first and clean up the rest
                orphans.push(event);
            } else {
                existing.insert(uid, event);
            }
        }
        debug!(
            owned = existing.len(),
            duplicates = orphans.len(),
            desired = desired.len(),
            "Diffing calendar window"
        );

        let mut report = SyncReport::default();

        for event in desired {
            let Some(uid) = event.ical_uid.clone() else {
                report.record(
                    "",
                    SyncOperation::Insert,
                    Err(transform_error("Event has no iCalUID")),
                );
                continue;
            };

            match existing.remove(&uid) {
                None => {
                    let result = self
                        .api
                        .import_event(&self.calendar_id, &event)
                        .await
                        .map(|_| ());
                    report.record(&uid, SyncOperation::Insert, result);
                }
                Some(current) if current.fingerprint() == event.fingerprint() => {
                    report.unchanged += 1;
                }
                Some(current) => {
                    let result = self.update(&current, &event).await;
                    report.record(&uid, SyncOperation::Update, result);
                }
            }
        }

        orphans.extend(existing.into_values());
        for orphan in orphans {
            let uid = orphan.ical_uid.clone().unwrap_or_default();
            let result = self.delete(&orphan).await;
            report.record(&uid, SyncOperation::Delete, result);
        }

        info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            deleted = report.deleted,
            failed = report.failures.len(),
            "Calendar sync finished"
        );
        Ok(report)
    }

    async fn update(&self, current: &GoogleEvent, desired: &GoogleEvent) -> ShiftResult<()> {
        let event_id = current
            .id
            .as_deref()
            .ok_or_else(|| google_calendar_error("Listed event has no id"))?;
        self.api
            .update_event(&self.calendar_id, event_id, &current.updated_with(desired))
            .await?;
        Ok(())
    }

    async fn delete(&self, event: &GoogleEvent) -> ShiftResult<()> {
        let event_id = event
            .id
            .as_deref()
            .ok_or_else(|| google_calendar_error("Listed event has no id"))?;
        self.api.delete_event(&self.calendar_id, event_id).await
    }
}
