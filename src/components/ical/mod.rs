//! iCalendar feed destination.

mod document;
mod render;

pub use document::{escape_text, write_calendar, PRODID};
pub use render::{IcalRenderer, VEvent};
