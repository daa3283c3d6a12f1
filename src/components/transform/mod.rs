//! Schedule event pipeline: consolidation, enrichment and rendering.

pub mod consolidate;
pub mod enrich;
pub mod generators;
pub mod pipeline;

pub use consolidate::consolidate;
pub use enrich::{EnrichedShift, ShiftEnricher};
pub use generators::{
    DefaultDescriptionGenerator, DefaultSummaryGenerator, DescribableShift, DescriptionGenerator,
    RosterEntry, SummaryGenerator,
};
pub use pipeline::{event_uid, EventRenderer, EventTransformer, ShiftRender, TimeOffRender};
