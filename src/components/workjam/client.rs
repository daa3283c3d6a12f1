use super::auth::{normalize_token, parse_jwt_user_id};
use super::http::HttpClient;
use super::models::{Availability, CoworkerGroup, Employee, Employers, ScheduleEvent, Shift};
use crate::config::Config;
use crate::error::{config_error, Error, ShiftResult};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Read access to the Workjam API used by the sync pipeline
#[async_trait]
pub trait WorkjamApi: Send + Sync {
    /// Id of the authenticated user
    fn user_id(&self) -> &str;

    async fn employers(&self, employee: &str) -> ShiftResult<Employers>;

    /// Schedule events of an employee overlapping `[start, end)`
    async fn events(
        &self,
        company: &str,
        employee: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> ShiftResult<Vec<ScheduleEvent>>;

    async fn shift(&self, company: &str, location: &str, shift: &str) -> ShiftResult<Shift>;

    async fn availability(
        &self,
        company: &str,
        employee: &str,
        event: &str,
    ) -> ShiftResult<Availability>;

    /// Every shift at a location overlapping `[start, end)`
    async fn shifts(
        &self,
        company: &str,
        location: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> ShiftResult<Vec<Shift>>;

    /// Employees of a company, all of them when `ids` is empty
    async fn employees(&self, company: &str, ids: &[String]) -> ShiftResult<Vec<Employee>>;

    async fn employee(&self, company: &str, employee: &str) -> ShiftResult<Employee>;

    /// People working alongside a shift, grouped by position
    async fn coworkers(
        &self,
        company: &str,
        location: &str,
        shift: &str,
    ) -> ShiftResult<Vec<CoworkerGroup>>;
}

/// Workjam API client authenticated with a bearer token
#[derive(Clone)]
pub struct WorkjamClient {
    http: HttpClient,
    base_url: Url,
    token: String,
    user_id: String,
}

impl WorkjamClient {
    pub fn new(config: &Config, token: &str) -> ShiftResult<Self> {
        let token = normalize_token(token);
        let user_id = parse_jwt_user_id(&token)?;

        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .max_retries(config.max_retries)
            .base_backoff(config.retry_base_backoff())
            .build()?;

        let base_url = Url::parse(&config.workjam_base_url)
            .map_err(|e| config_error(&format!("Invalid Workjam base URL: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token,
            user_id,
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> ShiftResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| config_error("Workjam base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ShiftResult<T> {
        let url = self.url(segments, query)?;
        let request = self
            .http
            .request(Method::GET, url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(Error::WorkjamStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        debug!(%url, %status, "Workjam request succeeded");
        Ok(response.json().await?)
    }
}

fn range_query(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Vec<(&'static str, String)> {
    vec![
        ("startDateTime", start.to_rfc3339_opts(SecondsFormat::Secs, false)),
        ("endDateTime", end.to_rfc3339_opts(SecondsFormat::Secs, false)),
        ("includeOverlaps", "true".to_string()),
    ]
}

#[async_trait]
impl WorkjamApi for WorkjamClient {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn employers(&self, employee: &str) -> ShiftResult<Employers> {
        self.get(&["api", "v1", "users", employee, "employers"], &[])
            .await
    }

    async fn events(
        &self,
        company: &str,
        employee: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> ShiftResult<Vec<ScheduleEvent>> {
        self.get(
            &["api", "v4", "companies", company, "employees", employee, "events"],
            &range_query(start, end),
        )
        .await
    }

    async fn shift(&self, company: &str, location: &str, shift: &str) -> ShiftResult<Shift> {
        self.get(
            &["api", "v4", "companies", company, "locations", location, "shifts", shift],
            &[],
        )
        .await
    }

    async fn availability(
        &self,
        company: &str,
        employee: &str,
        event: &str,
    ) -> ShiftResult<Availability> {
        self.get(
            &["api", "v4", "companies", company, "employees", employee, "availabilities", event],
            &[],
        )
        .await
    }

    async fn shifts(
        &self,
        company: &str,
        location: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> ShiftResult<Vec<Shift>> {
        self.get(
            &["api", "v4", "companies", company, "locations", location, "shifts"],
            &range_query(start, end),
        )
        .await
    }

    async fn employees(&self, company: &str, ids: &[String]) -> ShiftResult<Vec<Employee>> {
        let query = if ids.is_empty() {
            Vec::new()
        } else {
            vec![("employeeIds", ids.join(","))]
        };
        self.get(&["api", "v4", "companies", company, "employees"], &query)
            .await
    }

    async fn employee(&self, company: &str, employee: &str) -> ShiftResult<Employee> {
        self.get(&["api", "v4", "companies", company, "employees", employee], &[])
            .await
    }

    async fn coworkers(
        &self,
        company: &str,
        location: &str,
        shift: &str,
    ) -> ShiftResult<Vec<CoworkerGroup>> {
        self.get(
            &[
                "api", "v4", "companies", company, "locations", location, "shifts", shift,
                "coworkers",
            ],
            &[],
        )
        .await
    }
}
