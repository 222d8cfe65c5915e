use crate::services::CoverSearchService;
use async_trait::async_trait;
use cover_providers::{CoverProvider, HttpRequest, HttpResponse, HttpTransport, TransportError};
use std::sync::{Arc, Mutex};

/// Answers every request with the same reply and remembers the last URL.
/// Requests whose URL contains the stall marker never get an answer.
pub(crate) struct FixedTransport {
    status: u16,
    body: &'static str,
    stall_marker: Option<&'static str>,
    last_url: Mutex<Option<String>>,
}

impl FixedTransport {
    pub(crate) fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            stall_marker: None,
            last_url: Mutex::new(None),
        })
    }

    pub(crate) fn stalling_on(status: u16, body: &'static str, marker: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            stall_marker: Some(marker),
            last_url: Mutex::new(None),
        })
    }

    pub(crate) fn last_url(&self) -> Option<String> {
        self.last_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FixedTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();
        *self.last_url.lock().unwrap() = Some(url.clone());

        if self.stall_marker.is_some_and(|marker| url.contains(marker)) {
            std::future::pending::<()>().await;
        }

        Ok(HttpResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

pub(crate) fn cover_search_service(transport: Arc<FixedTransport>) -> CoverSearchService {
    CoverSearchService::new(8, move || vec![CoverProvider::deezer(transport.clone())])
}
