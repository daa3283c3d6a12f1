//! Workjam API: the source of schedule events.

pub mod auth;
mod client;
pub mod http;
pub mod models;
pub mod timestamp;

pub use client::{WorkjamApi, WorkjamClient};
pub use models::{
    Availability, CoworkerGroup, Employee, Employers, PrimaryStore, ScheduleEvent,
    ScheduleEventType, Shift, Store,
};
