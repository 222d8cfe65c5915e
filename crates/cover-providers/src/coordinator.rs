use crate::{CoverProvider, CoverSearchResults, SearchRequest};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Covers found by one provider for one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCovers {
    pub provider: &'static str,
    pub quality: f32,
    pub results: CoverSearchResults,
}

/// Fans a search out to every enabled provider and gathers one batch per
/// provider that accepted it.
pub struct CoverSearch {
    providers: Vec<CoverProvider>,
}

impl CoverSearch {
    pub fn new(providers: Vec<CoverProvider>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(CoverProvider::name).collect()
    }

    /// Returns `None` when no provider started the search.
    pub async fn search(&mut self, request: &SearchRequest) -> Option<Vec<ProviderCovers>> {
        let started = self
            .providers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, provider)| {
                provider
                    .start_search(&request.artist, &request.album, &request.title, request.id)
                    .then_some(index)
            })
            .collect::<Vec<_>>();

        if started.is_empty() {
            info!(id = %request.id, "Cover search was not started by any provider");
            return None;
        }

        let mut batches = Vec::with_capacity(started.len());

        for index in started {
            let provider = &mut self.providers[index];
            let kind = provider.kind();

            match Self::wait_for(provider, request).await {
                Some(results) => batches.push(ProviderCovers {
                    provider: kind.name(),
                    quality: kind.quality(),
                    results,
                }),
                None => warn!(provider = kind.name(), id = %request.id, "Cover search finished without a reply"),
            }
        }

        batches.sort_by(|a, b| b.quality.total_cmp(&a.quality));

        let total = batches.iter().map(|batch| batch.results.len()).sum::<usize>();
        info!(id = %request.id, providers = batches.len(), total, "Cover search finished");

        Some(batches)
    }

    async fn wait_for(
        provider: &mut CoverProvider,
        request: &SearchRequest,
    ) -> Option<CoverSearchResults> {
        while let Some(finished) = provider.next_finished().await {
            if finished.id == request.id {
                return Some(finished.results);
            }
            debug!(provider = provider.name(), id = %finished.id, "Discarding reply of an earlier search");
        }

        None
    }
}
