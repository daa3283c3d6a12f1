use crate::error::{workjam_error, ShiftResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, warn};

pub const ORIGIN_URL: &str = "https://app.workjam.com";
pub const REFERER_URL: &str = "https://app.workjam.com/";
pub const ACCEPTED_LANGUAGE: &str = "en";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.75 Safari/537.36";

/// HTTP client with a request timeout and bounded exponential-backoff retries
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request, retrying server errors and connection failures
    pub async fn send(&self, builder: RequestBuilder) -> ShiftResult<Response> {
        let attempts = self.max_retries + 1;

        for attempt in 1..=attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| workjam_error("Request body cannot be cloned for retries"))?
                .build()?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "Sending Workjam request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempt < attempts {
                        warn!(attempt, %method, %url, %status, "Server error, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if attempt < attempts && should_retry_error(&err) {
                        warn!(attempt, %method, %url, error = %err, "Request failed, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }

        Err(workjam_error("HTTP client exhausted retries without a response"))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_retries: usize,
    base_backoff: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 5,
            base_backoff: Duration::from_millis(200),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after the first attempt
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Build a client that presents itself like the Workjam web app
    pub fn build(self) -> ShiftResult<HttpClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPTED_LANGUAGE));
        headers.insert(ORIGIN, HeaderValue::from_static(ORIGIN_URL));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(HttpClient {
            client,
            max_retries: self.max_retries,
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
