use super::generators::{DescribableShift, SummaryGenerator};
use crate::components::workjam::{Employers, Shift, Store, WorkjamApi};
use crate::error::{transform_error, ShiftResult};
use crate::utils::time::day_bounds;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// A shift ready to render, with the store it is worked at
#[derive(Debug, Clone)]
pub struct EnrichedShift {
    pub describable: DescribableShift,
    pub store: Store,
}

/// Adds store and same-day roster context to shifts
pub struct ShiftEnricher {
    api: Arc<dyn WorkjamApi>,
    company_id: String,
    summary: Arc<dyn SummaryGenerator>,
    employers: OnceCell<Employers>,
}

impl ShiftEnricher {
    pub fn new(
        api: Arc<dyn WorkjamApi>,
        company_id: impl Into<String>,
        summary: Arc<dyn SummaryGenerator>,
    ) -> Self {
        Self {
            api,
            company_id: company_id.into(),
            summary,
            employers: OnceCell::new(),
        }
    }

    /// Start from employers that were already fetched
    pub fn with_employers(self, employers: Employers) -> Self {
        Self {
            employers: OnceCell::new_with(Some(employers)),
            ..self
        }
    }

    pub async fn enrich(&self, shift: Shift) -> ShiftResult<EnrichedShift> {
        let (store, roster) = tokio::try_join!(self.store_for(&shift), self.roster_for(&shift))?;

        let summary = self.summary.generate(&shift);
        let describable = DescribableShift::create(shift, summary, &roster);

        Ok(EnrichedShift { describable, store })
    }

    async fn employers(&self) -> ShiftResult<&Employers> {
        self.employers
            .get_or_try_init(|| async {
                debug!(user_id = self.api.user_id(), "Fetching employers");
                self.api.employers(self.api.user_id()).await
            })
            .await
    }

    async fn store_for(&self, shift: &Shift) -> ShiftResult<Store> {
        let external_id = &shift.event.location.external_id;
        self.employers()
            .await?
            .find_store(external_id)
            .cloned()
            .ok_or_else(|| {
                transform_error(&format!(
                    "No store with external id {} for shift {}",
                    external_id, shift.id
                ))
            })
    }

    /// Shifts at the same location on the local day of the shift's start
    ///
    /// Any failure yields an empty roster, commonly a location the employee
    /// is not allowed to view.
    async fn roster_for(&self, shift: &Shift) -> ShiftResult<Vec<Shift>> {
        let location = &shift.event.location;
        let (start, end) = day_bounds(shift.event.start_date_time, location.time_zone_id)?;

        match self
            .api
            .shifts(
                &self.company_id,
                &location.id,
                start.fixed_offset(),
                end.fixed_offset(),
            )
            .await
        {
            Ok(roster) => Ok(roster),
            Err(e) => {
                warn!(
                    event_id = %shift.id,
                    location_id = %location.id,
                    error = %e,
                    "Roster unavailable, describing shift without coworkers"
                );
                Ok(Vec::new())
            }
        }
    }
}
