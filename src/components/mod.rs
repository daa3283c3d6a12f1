// Export components
pub mod google_calendar;
pub mod ical;
pub mod transform;
pub mod workjam;
