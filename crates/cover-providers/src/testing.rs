use crate::{Credentials, HttpRequest, HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub(crate) struct MockTransport {
    outcome: Result<HttpResponse, TransportError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn reply(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(TransportError(message.to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Never answers; counts calls that were started and calls that were dropped.
#[derive(Default)]
pub(crate) struct HangingTransport {
    pub(crate) started: Arc<AtomicUsize>,
    pub(crate) dropped: Arc<AtomicUsize>,
}

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn get(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let _guard = DropCounter(Arc::clone(&self.dropped));
        std::future::pending().await
    }
}

/// Holds every call until [`GatedTransport::open`] lets it through, then
/// answers with a body built from the request.
pub(crate) struct GatedTransport {
    gate: Semaphore,
    respond: fn(&HttpRequest) -> String,
}

impl GatedTransport {
    pub(crate) fn closed(respond: fn(&HttpRequest) -> String) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            respond,
        })
    }

    /// Releases the next `calls` waiting calls, oldest first.
    pub(crate) fn open(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.gate
            .acquire()
            .await
            .map_err(|error| TransportError(error.to_string()))?
            .forget();

        Ok(HttpResponse {
            status: 200,
            body: (self.respond)(&request).into_bytes(),
        })
    }
}

pub(crate) struct MockCredentials {
    app_id: Option<String>,
    token: Mutex<Option<String>>,
    deauthenticated: AtomicUsize,
}

impl MockCredentials {
    pub(crate) fn with_token(token: &str) -> Arc<Self> {
        Arc::new(Self {
            app_id: Some("app".into()),
            token: Mutex::new(Some(token.to_string())),
            deauthenticated: AtomicUsize::new(0),
        })
    }

    pub(crate) fn anonymous() -> Arc<Self> {
        Arc::new(Self {
            app_id: None,
            token: Mutex::new(None),
            deauthenticated: AtomicUsize::new(0),
        })
    }

    pub(crate) fn deauthenticated(&self) -> usize {
        self.deauthenticated.load(Ordering::SeqCst)
    }
}

impl Credentials for MockCredentials {
    fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }

    fn access_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn deauthenticate(&self) {
        self.deauthenticated.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().unwrap() = None;
    }
}
