use crate::config::{Config, ConfigError};
use crate::services::StaticCredentials;
use async_lock::Semaphore;
use cover_providers::{
    CoverProvider, CoverSearch, Credentials, HttpTransport, ProviderCovers, ProviderKind, ReqwestTransport,
    SearchRequest, TransportError,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub(crate) enum CoverSearchServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unable to create HTTP client: {0}")]
    Transport(#[from] TransportError),
}

type ProviderFactory = Box<dyn Fn() -> Vec<CoverProvider> + Send + Sync>;

/// Shared entry point for the HTTP handlers.
///
/// Every search runs on its own set of providers, so a slow provider only
/// holds up the request that is waiting for it. Transport and credentials
/// are shared between searches, so a revoked token stays revoked. Dropping
/// a search midway aborts its outstanding provider calls.
pub(crate) struct CoverSearchService {
    provider_names: Vec<&'static str>,
    create_providers: ProviderFactory,
    permits: Semaphore,
}

impl CoverSearchService {
    pub(crate) fn new<F>(max_concurrent_searches: usize, create_providers: F) -> Self
    where
        F: Fn() -> Vec<CoverProvider> + Send + Sync + 'static,
    {
        let provider_names = create_providers()
            .iter()
            .map(CoverProvider::name)
            .collect();

        Self {
            provider_names,
            create_providers: Box::new(create_providers),
            permits: Semaphore::new(max_concurrent_searches.max(1)),
        }
    }

    pub(crate) fn create(config: &Config) -> Result<Self, CoverSearchServiceError> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::create(config.request_timeout())?);
        let kinds = config.enabled_providers()?;

        let qobuz_credentials: Arc<dyn Credentials> = Arc::new(StaticCredentials::new(
            ProviderKind::Qobuz.name(),
            config.qobuz.app_id.clone(),
            config.qobuz.user_auth_token.clone(),
        ));
        let spotify_credentials: Arc<dyn Credentials> = Arc::new(StaticCredentials::new(
            ProviderKind::Spotify.name(),
            None,
            config.spotify_access_token.clone(),
        ));

        if kinds.contains(&ProviderKind::Spotify) && config.spotify_access_token.is_none() {
            warn!("SPOTIFY_ACCESS_TOKEN is not set, Spotify searches will be skipped");
        }

        let service = Self::new(config.max_concurrent_searches, move || {
            kinds
                .iter()
                .map(|kind| match kind {
                    ProviderKind::Deezer => CoverProvider::deezer(Arc::clone(&transport)),
                    ProviderKind::Qobuz => CoverProvider::qobuz(
                        Arc::clone(&transport),
                        Arc::clone(&qobuz_credentials),
                    ),
                    ProviderKind::Spotify => CoverProvider::spotify(
                        Arc::clone(&transport),
                        Arc::clone(&spotify_credentials),
                    ),
                })
                .collect()
        });
        info!(providers = ?service.provider_names, "Cover providers enabled");

        Ok(service)
    }

    pub(crate) fn provider_names(&self) -> &[&'static str] {
        &self.provider_names
    }

    pub(crate) async fn search(&self, request: &SearchRequest) -> Option<Vec<ProviderCovers>> {
        let _permit = self.permits.acquire().await;
        debug!(id = %request.id, "Starting cover search");

        CoverSearch::new((self.create_providers)())
            .search(request)
            .await
    }
}
