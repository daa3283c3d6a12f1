use super::consolidate::consolidate;
use super::enrich::ShiftEnricher;
use super::generators::{
    DefaultDescriptionGenerator, DefaultSummaryGenerator, DescriptionGenerator, SummaryGenerator,
};
use crate::components::workjam::{
    Availability, Employers, ScheduleEvent, ScheduleEventType, Shift, WorkjamApi,
};
use crate::error::ShiftResult;
use crate::utils::time::{local_midnight, next_day};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::{stream, StreamExt, TryStreamExt};
use rust_i18n::t;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Calendar UID of a schedule event
pub fn event_uid(event_id: &str, domain: &str) -> String {
    format!("{}@{}", event_id, domain)
}

/// Everything a destination needs to render a shift
#[derive(Debug, Clone)]
pub struct ShiftRender<'a> {
    pub uid: String,
    pub shift: &'a Shift,
    pub summary: &'a str,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A consolidated time-off span, already widened to whole local days
#[derive(Debug, Clone)]
pub struct TimeOffRender<'a> {
    pub uid: String,
    pub availability: &'a Availability,
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Destination format of transformed events
pub trait EventRenderer: Send + Sync {
    type Output: Send;

    fn render_shift(&self, shift: ShiftRender<'_>) -> ShiftResult<Self::Output>;

    fn render_time_off(&self, time_off: TimeOffRender<'_>) -> ShiftResult<Self::Output>;
}

/// Turns raw schedule events into destination events
pub struct EventTransformer<R> {
    api: Arc<dyn WorkjamApi>,
    company_id: String,
    employee_id: String,
    domain: String,
    max_concurrency: usize,
    summary: Arc<dyn SummaryGenerator>,
    description: Arc<dyn DescriptionGenerator>,
    employers: Option<Employers>,
    renderer: R,
}

impl<R: EventRenderer> EventTransformer<R> {
    pub fn new(
        api: Arc<dyn WorkjamApi>,
        company_id: impl Into<String>,
        domain: impl Into<String>,
        renderer: R,
    ) -> Self {
        let employee_id = api.user_id().to_string();
        Self {
            api,
            company_id: company_id.into(),
            employee_id,
            domain: domain.into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            summary: Arc::new(DefaultSummaryGenerator),
            description: Arc::new(DefaultDescriptionGenerator),
            employers: None,
            renderer,
        }
    }

    pub fn with_summary_generator(mut self, summary: Arc<dyn SummaryGenerator>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_description_generator(
        mut self,
        description: Arc<dyn DescriptionGenerator>,
    ) -> Self {
        self.description = description;
        self
    }

    /// Reuse employers fetched while resolving the primary store
    pub fn with_employers(mut self, employers: Employers) -> Self {
        self.employers = Some(employers);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Transform every event, ordered by start
    ///
    /// Any failed detail fetch or render fails the whole batch. Events of
    /// unrecognised types are dropped.
    pub async fn transform_all(&self, events: Vec<ScheduleEvent>) -> ShiftResult<Vec<R::Output>> {
        let received = events.len();
        let events = consolidate(events);
        debug!(received, consolidated = events.len(), "Consolidated schedule events");

        let mut enricher = ShiftEnricher::new(
            self.api.clone(),
            self.company_id.clone(),
            self.summary.clone(),
        );
        if let Some(employers) = &self.employers {
            enricher = enricher.with_employers(employers.clone());
        }

        let rendered: Vec<Option<(DateTime<Utc>, R::Output)>> = stream::iter(events)
            .map(|event| self.transform_one(&enricher, event))
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        let mut rendered: Vec<_> = rendered.into_iter().flatten().collect();
        rendered.sort_by_key(|(start, _)| *start);

        info!(received, transformed = rendered.len(), "Transformed schedule events");
        Ok(rendered.into_iter().map(|(_, output)| output).collect())
    }

    async fn transform_one(
        &self,
        enricher: &ShiftEnricher,
        event: ScheduleEvent,
    ) -> ShiftResult<Option<(DateTime<Utc>, R::Output)>> {
        let start = event.start_date_time;
        let output = match event.event_type {
            ScheduleEventType::Shift => self.transform_shift(enricher, &event).await?,
            ScheduleEventType::AvailabilityTimeOff => self.transform_time_off(&event).await?,
            ScheduleEventType::NImporteQuoi | ScheduleEventType::Unknown => {
                warn!(
                    event_id = %event.id,
                    event_type = event.event_type.as_str(),
                    "Dropping schedule event of unsupported type"
                );
                return Ok(None);
            }
        };
        Ok(Some((start, output)))
    }

    async fn transform_shift(
        &self,
        enricher: &ShiftEnricher,
        event: &ScheduleEvent,
    ) -> ShiftResult<R::Output> {
        let shift = self
            .api
            .shift(&self.company_id, &event.location.id, &event.id)
            .await?;
        let enriched = enricher.enrich(shift).await?;
        let describable = &enriched.describable;

        self.renderer.render_shift(ShiftRender {
            uid: event_uid(&event.id, &self.domain),
            shift: &describable.shift,
            summary: &describable.summary,
            description: self.description.generate(describable),
            location: enriched.store.render_address(),
            start: describable.shift.event.start_date_time,
            end: describable.shift.event.end_date_time,
        })
    }

    async fn transform_time_off(&self, event: &ScheduleEvent) -> ShiftResult<R::Output> {
        let availability = self
            .api
            .availability(&self.company_id, &self.employee_id, &event.id)
            .await?;

        let tz = event.location.time_zone_id;
        let first_day = event.start_date_time.with_timezone(&tz).date_naive();
        let last_day = event.end_date_time.with_timezone(&tz).date_naive();

        self.renderer.render_time_off(TimeOffRender {
            uid: event_uid(&event.id, &self.domain),
            availability: &availability,
            summary: t!("time_off_summary").to_string(),
            start: local_midnight(first_day, tz)?,
            end: local_midnight(next_day(last_day)?, tz)?,
        })
    }
}
