use crate::deezer::DeezerApi;
use crate::qobuz::QobuzApi;
use crate::spotify::SpotifyApi;
use crate::{
    CoverSearchResult, CoverSearchResults, Credentials, HttpRequest, HttpResponse, HttpTransport,
    ItemError, ProviderError, SearchId, TransportError,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use url::Url;

pub(crate) const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchMode {
    Album,
    Track,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchQuery {
    pub(crate) mode: SearchMode,
    pub(crate) text: String,
}

impl SearchQuery {
    /// Returns `None` when there is nothing to search for.
    pub(crate) fn new(artist: &str, album: &str, title: &str) -> Option<Self> {
        if artist.is_empty() && album.is_empty() && title.is_empty() {
            return None;
        }

        let (mode, extra) = if album.is_empty() && !title.is_empty() {
            (SearchMode::Track, title)
        } else {
            (SearchMode::Album, album)
        };

        let text = match (artist.is_empty(), extra.is_empty()) {
            (false, false) => format!("{} {}", artist, extra),
            (false, true) => artist.to_string(),
            (true, _) => extra.to_string(),
        };

        Some(Self { mode, text })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Deezer,
    Qobuz,
    Spotify,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Deezer => "Deezer",
            ProviderKind::Qobuz => "Qobuz",
            ProviderKind::Spotify => "Spotify",
        }
    }

    /// Relative trust in the provider's covers, higher is better.
    pub fn quality(&self) -> f32 {
        match self {
            ProviderKind::Deezer => 2.0,
            ProviderKind::Qobuz => 2.0,
            ProviderKind::Spotify => 2.5,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deezer" => Ok(ProviderKind::Deezer),
            "qobuz" => Ok(ProviderKind::Qobuz),
            "spotify" => Ok(ProviderKind::Spotify),
            other => Err(format!("Unknown cover provider: {}", other)),
        }
    }
}

/// Error payload decoded from a non-200 reply.
pub(crate) struct ApiError {
    pub(crate) message: String,
    pub(crate) code: i64,
    pub(crate) credential_expired: bool,
}

pub(crate) enum ProviderApi {
    Deezer(DeezerApi),
    Qobuz(QobuzApi),
    Spotify(SpotifyApi),
}

impl ProviderApi {
    fn kind(&self) -> ProviderKind {
        match self {
            ProviderApi::Deezer(_) => ProviderKind::Deezer,
            ProviderApi::Qobuz(_) => ProviderKind::Qobuz,
            ProviderApi::Spotify(_) => ProviderKind::Spotify,
        }
    }

    fn credentials(&self) -> Option<&Arc<dyn Credentials>> {
        match self {
            ProviderApi::Deezer(_) => None,
            ProviderApi::Qobuz(api) => Some(api.credentials()),
            ProviderApi::Spotify(api) => Some(api.credentials()),
        }
    }

    fn can_search(&self) -> bool {
        match self {
            ProviderApi::Spotify(api) => api.is_authenticated(),
            _ => true,
        }
    }

    fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        match self {
            ProviderApi::Deezer(api) => api.build_request(query),
            ProviderApi::Qobuz(api) => api.build_request(query),
            ProviderApi::Spotify(api) => api.build_request(query),
        }
    }

    fn decode_error(&self, body: &[u8]) -> Option<ApiError> {
        let json = serde_json::from_slice::<Value>(body).ok()?;
        let obj = json.as_object().filter(|obj| !obj.is_empty())?;

        match self {
            ProviderApi::Deezer(_) => DeezerApi::decode_error(obj),
            ProviderApi::Qobuz(_) => QobuzApi::decode_error(obj),
            ProviderApi::Spotify(_) => SpotifyApi::decode_error(obj),
        }
    }

    fn is_expired_status(&self, status: u16) -> bool {
        match self {
            ProviderApi::Deezer(_) => false,
            ProviderApi::Qobuz(_) | ProviderApi::Spotify(_) => status == 401,
        }
    }

    fn parse_results(
        &self,
        body: &[u8],
        mode: SearchMode,
    ) -> Result<CoverSearchResults, ProviderError> {
        let json = parse_json_object(body)?;

        match self {
            ProviderApi::Deezer(_) => DeezerApi::parse_results(&json),
            ProviderApi::Qobuz(_) => QobuzApi::parse_results(&json),
            ProviderApi::Spotify(_) => SpotifyApi::parse_results(&json, mode),
        }
    }
}

pub(crate) fn parse_json_object(body: &[u8]) -> Result<Map<String, Value>, ProviderError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(obj) if !obj.is_empty() => Ok(obj),
        other => Err(ProviderError::unexpected(
            "Json reply is not an object.",
            &other,
        )),
    }
}

pub(crate) fn log_item_error(provider: ProviderKind, error: &ItemError) {
    warn!(provider = provider.name(), %error, "Skipping cover search entry");
    debug!(provider = provider.name(), fragment = %error.fragment);
}

/// Insertion-ordered set of results keyed by image URL; the first entry wins.
#[derive(Debug, Default)]
pub(crate) struct ResultSet {
    seen: HashSet<Url>,
    results: CoverSearchResults,
}

impl ResultSet {
    pub(crate) fn insert(&mut self, result: CoverSearchResult) -> bool {
        if !self.seen.insert(result.image_url.clone()) {
            return false;
        }
        self.results.push(result);
        true
    }

    pub(crate) fn into_sorted(mut self) -> CoverSearchResults {
        self.results.sort_by_key(|result| result.rank);
        self.results
    }
}

/// Delivered exactly once for every accepted [`CoverProvider::start_search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFinished {
    pub id: SearchId,
    pub results: CoverSearchResults,
}

type CallId = u64;

struct PendingCall {
    task: JoinHandle<()>,
    id: SearchId,
    mode: SearchMode,
}

struct Reply {
    call_id: CallId,
    outcome: Result<HttpResponse, TransportError>,
}

/// A cover search provider and the calls it has in flight.
///
/// Completions are collected with [`CoverProvider::next_finished`] by the
/// owner; dropping the provider aborts every pending call without emitting
/// a completion for it.
pub struct CoverProvider {
    api: ProviderApi,
    transport: Arc<dyn HttpTransport>,
    pending: HashMap<CallId, PendingCall>,
    next_call_id: CallId,
    replies_tx: mpsc::UnboundedSender<Reply>,
    replies_rx: mpsc::UnboundedReceiver<Reply>,
}

impl CoverProvider {
    fn new(api: ProviderApi, transport: Arc<dyn HttpTransport>) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();

        Self {
            api,
            transport,
            pending: HashMap::new(),
            next_call_id: 0,
            replies_tx,
            replies_rx,
        }
    }

    pub fn deezer(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(ProviderApi::Deezer(DeezerApi::new()), transport)
    }

    pub fn qobuz(transport: Arc<dyn HttpTransport>, credentials: Arc<dyn Credentials>) -> Self {
        Self::new(ProviderApi::Qobuz(QobuzApi::new(credentials)), transport)
    }

    pub fn spotify(transport: Arc<dyn HttpTransport>, credentials: Arc<dyn Credentials>) -> Self {
        Self::new(ProviderApi::Spotify(SpotifyApi::new(credentials)), transport)
    }

    pub fn kind(&self) -> ProviderKind {
        self.api.kind()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Dispatches a search and returns whether it was started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_search(&mut self, artist: &str, album: &str, title: &str, id: SearchId) -> bool {
        if !self.api.can_search() {
            debug!(provider = self.name(), %id, "Not authenticated, search not started");
            return false;
        }

        let query = match SearchQuery::new(artist, album, title) {
            Some(query) => query,
            None => return false,
        };

        let request = self.api.build_request(&query);
        let call_id = self.next_call_id;
        self.next_call_id += 1;

        debug!(provider = self.name(), %id, url = %request.url, "Sending cover search request");

        let transport = Arc::clone(&self.transport);
        let replies_tx = self.replies_tx.clone();
        let task = tokio::spawn(async move {
            let outcome = transport.get(request).await;
            let _ = replies_tx.send(Reply { call_id, outcome });
        });

        self.pending.insert(
            call_id,
            PendingCall {
                task,
                id,
                mode: query.mode,
            },
        );

        true
    }

    /// Accepted for interface parity; in-flight calls are only cancelled when
    /// the provider is dropped.
    pub fn cancel_search(&mut self, id: SearchId) {
        debug!(provider = self.name(), %id, "Cancelling a single search is not supported");
    }

    /// Waits for the next pending call to complete. `None` if nothing is pending.
    pub async fn next_finished(&mut self) -> Option<SearchFinished> {
        while !self.pending.is_empty() {
            let reply = self.replies_rx.recv().await?;

            let call = match self.pending.remove(&reply.call_id) {
                Some(call) => call,
                None => continue,
            };

            let results = self.handle_reply(reply.outcome, call.mode);

            debug!(provider = self.name(), id = %call.id, results = results.len(), "Cover search finished");

            return Some(SearchFinished {
                id: call.id,
                results,
            });
        }

        None
    }

    pub(crate) fn handle_reply(
        &self,
        outcome: Result<HttpResponse, TransportError>,
        mode: SearchMode,
    ) -> CoverSearchResults {
        let results = self
            .reply_data(outcome)
            .and_then(|body| self.api.parse_results(&body, mode));

        match results {
            Ok(results) => results,
            Err(error) => {
                error!(provider = self.name(), %error, "Cover search failed");
                if let Some(fragment) = error.fragment() {
                    debug!(provider = self.name(), %fragment);
                }
                Vec::new()
            }
        }
    }

    fn reply_data(
        &self,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Vec<u8>, ProviderError> {
        let response = outcome?;

        if response.is_ok() {
            return Ok(response.body);
        }

        match self.api.decode_error(&response.body) {
            Some(api_error) => {
                if api_error.credential_expired {
                    self.deauthenticate();
                }
                Err(ProviderError::Api {
                    message: api_error.message,
                    code: api_error.code,
                })
            }
            None => {
                if self.api.is_expired_status(response.status) {
                    self.deauthenticate();
                }
                Err(ProviderError::HttpStatus(response.status))
            }
        }
    }

    fn deauthenticate(&self) {
        if let Some(credentials) = self.api.credentials() {
            warn!(provider = self.name(), "Credential rejected, deauthenticating");
            credentials.deauthenticate();
        }
    }
}

impl Drop for CoverProvider {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!(provider = self.name(), pending = self.pending.len(), "Aborting pending cover searches");
        }

        for (_, call) in self.pending.drain() {
            call.task.abort();
        }
    }
}
