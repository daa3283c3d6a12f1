use super::models::GoogleEvent;
use super::token::TokenManager;
use crate::error::{config_error, google_calendar_error, ShiftResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/";

/// Operations the syncer needs from a calendar
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Every event overlapping `[time_min, time_max)`, recurring events expanded
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> ShiftResult<Vec<GoogleEvent>>;

    /// Insert an event keeping its iCalUID
    async fn import_event(&self, calendar_id: &str, event: &GoogleEvent)
        -> ShiftResult<GoogleEvent>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &GoogleEvent,
    ) -> ShiftResult<GoogleEvent>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> ShiftResult<()>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Calendar v3 REST client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    tokens: TokenManager,
}

impl GoogleCalendarClient {
    pub fn new(tokens: TokenManager) -> ShiftResult<Self> {
        Self::with_base_url(tokens, GOOGLE_CALENDAR_API)
    }

    pub fn with_base_url(tokens: TokenManager, base_url: &str) -> ShiftResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| config_error(&format!("Invalid Google Calendar URL: {}", e)))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            tokens,
        })
    }

    fn events_url(&self, calendar_id: &str, rest: &[&str]) -> ShiftResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| config_error("Google Calendar URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"])
            .extend(rest);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> ShiftResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> ShiftResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder, action: &str) -> ShiftResult<GoogleEvent> {
        self.send(request, action)
            .await?
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event: {}", e)))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> ShiftResult<Vec<GoogleEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(calendar_id, &[])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("timeMin", &time_min.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .append_pair("timeMax", &time_max.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .append_pair("singleEvents", "true")
                    .append_pair("maxResults", "2500");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let request = self.request(Method::GET, url).await?;
            let page: EventsPage = self
                .send(request, "fetch events")
                .await?
                .json()
                .await
                .map_err(|e| {
                    google_calendar_error(&format!("Failed to parse events response: {}", e))
                })?;

            events.extend(page.items);
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(calendar_id, count = events.len(), "Listed calendar events");
        Ok(events)
    }

    async fn import_event(
        &self,
        calendar_id: &str,
        event: &GoogleEvent,
    ) -> ShiftResult<GoogleEvent> {
        let url = self.events_url(calendar_id, &["import"])?;
        let request = self.request(Method::POST, url).await?.json(event);
        self.send_json(request, "import event").await
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &GoogleEvent,
    ) -> ShiftResult<GoogleEvent> {
        let url = self.events_url(calendar_id, &[event_id])?;
        let request = self.request(Method::PUT, url).await?.json(event);
        self.send_json(request, "update event").await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> ShiftResult<()> {
        let url = self.events_url(calendar_id, &[event_id])?;
        let request = self.request(Method::DELETE, url).await?;
        self.send(request, "delete event").await?;
        Ok(())
    }
}
