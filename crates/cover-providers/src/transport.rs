use async_trait::async_trait;
use reqwest::redirect::{Attempt, Policy};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Failure below HTTP: no status code is available.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn create(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(Policy::custom(no_less_safe_redirect))
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError(error.to_string()))?;

        Ok(Self { client })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectDecision {
    Follow,
    Stop,
    TooManyRedirects,
}

/// Redirects are followed only to an equally or more secure scheme.
fn redirect_decision(previous: &[Url], next: &Url) -> RedirectDecision {
    if previous.len() > MAX_REDIRECTS {
        return RedirectDecision::TooManyRedirects;
    }

    let downgrade = previous
        .last()
        .map(|previous| previous.scheme() == "https" && next.scheme() != "https")
        .unwrap_or(false);

    if downgrade {
        RedirectDecision::Stop
    } else {
        RedirectDecision::Follow
    }
}

fn no_less_safe_redirect(attempt: Attempt) -> reqwest::redirect::Action {
    match redirect_decision(attempt.previous(), attempt.url()) {
        RedirectDecision::Follow => attempt.follow(),
        RedirectDecision::Stop => attempt.stop(),
        RedirectDecision::TooManyRedirects => attempt.error("too many redirects"),
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.get(request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| TransportError(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| TransportError(error.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}
