mod coordinator;
mod credentials;
mod deezer;
mod error;
mod normalize;
mod provider;
mod qobuz;
mod spotify;
mod transport;

pub use coordinator::*;
pub use credentials::*;
pub use error::*;
pub use normalize::album_remove_disc_misc;
pub use provider::{CoverProvider, ProviderKind, SearchFinished};
pub use transport::*;

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use url::Url;
use uuid::Uuid;

/// Caller-chosen id correlating a search with its completion.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug, Serialize, Deserialize)]
pub struct SearchId(pub Uuid);

impl SearchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SearchId {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SearchId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Uuid> for SearchId {
    fn from(uuid: Uuid) -> Self {
        SearchId(uuid)
    }
}

impl std::fmt::Display for SearchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One candidate cover image found by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSearchResult {
    pub artist: String,
    pub album: String,
    pub image_url: Url,
    pub image_size: ImageSize,
    /// Lower is preferred. Results sharing a rank keep their first-seen order.
    pub rank: u32,
}

pub type CoverSearchResults = Vec<CoverSearchResult>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub id: SearchId,
    pub artist: String,
    pub album: String,
    pub title: String,
}

impl SearchRequest {
    pub fn is_empty(&self) -> bool {
        self.artist.is_empty() && self.album.is_empty() && self.title.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod testing;
