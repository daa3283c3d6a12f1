//! Google Calendar destination: client, OAuth token handling, rendering and sync.

mod client;
pub mod models;
mod render;
pub mod sync;
pub mod token;

pub use client::{CalendarApi, GoogleCalendarClient};
pub use models::{EventDateTime, ExtendedProperties, GoogleEvent};
pub use render::GoogleRenderer;
pub use sync::{CalendarSyncer, SyncFailure, SyncOperation, SyncReport, SyncWindow};
pub use token::{ClientSecrets, OAuthToken, TokenManager};
