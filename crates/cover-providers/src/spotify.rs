use crate::normalize::album_remove_disc_misc;
use crate::provider::{
    log_item_error, ApiError, ProviderKind, ResultSet, SearchMode, SearchQuery, SEARCH_LIMIT,
};
use crate::{
    CoverSearchResult, CoverSearchResults, Credentials, HttpRequest, ImageSize, ItemError,
    ProviderError,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const MIN_IMAGE_DIMENSION: u32 = 300;

pub(crate) struct SpotifyApi {
    credentials: Arc<dyn Credentials>,
}

impl SpotifyApi {
    pub(crate) fn new(credentials: Arc<dyn Credentials>) -> Self {
        Self { credentials }
    }

    pub(crate) fn credentials(&self) -> &Arc<dyn Credentials> {
        &self.credentials
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    pub(crate) fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let limit = SEARCH_LIMIT.to_string();

        let url = Url::parse_with_params(
            &format!("{}/search", SPOTIFY_API_URL),
            &[
                ("q", query.text.as_str()),
                ("type", search_type(query.mode)),
                ("limit", limit.as_str()),
            ],
        )
        .expect("Spotify API URL is valid");

        let access_token = self.credentials.access_token().unwrap_or_default();

        HttpRequest::new(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Authorization", format!("Bearer {}", access_token))
    }

    pub(crate) fn decode_error(json: &Map<String, Value>) -> Option<ApiError> {
        let error = json.get("error")?.as_object()?;
        let status = error.get("status")?.as_i64().unwrap_or_default();
        let message = error.get("message")?.as_str().unwrap_or_default().to_string();

        Some(ApiError {
            message,
            code: status,
            credential_expired: status == 401,
        })
    }

    pub(crate) fn parse_results(
        json: &Map<String, Value>,
        mode: SearchMode,
    ) -> Result<CoverSearchResults, ProviderError> {
        let extract = match mode {
            SearchMode::Album => "albums",
            SearchMode::Track => "tracks",
        };

        let envelope = json
            .get(extract)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ProviderError::unexpected(
                    format!("Json object is missing {} object.", extract),
                    &Value::Object(json.clone()),
                )
            })?;

        let items = envelope
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::unexpected(
                    format!("{} object is missing items array.", extract),
                    &Value::Object(envelope.clone()),
                )
            })?;

        let mut results = ResultSet::default();

        for item in items {
            match Self::parse_item(item) {
                Ok(item_results) => {
                    for result in item_results {
                        results.insert(result);
                    }
                }
                Err(error) => log_item_error(ProviderKind::Spotify, &error),
            }
        }

        Ok(results.into_sorted())
    }

    fn parse_item(item: &Value) -> Result<Vec<CoverSearchResult>, ItemError> {
        let obj = item
            .as_object()
            .ok_or_else(|| ItemError::new("value in items is not an object.", item))?;

        let album_obj = match obj.get("album") {
            Some(Value::Object(album)) => album,
            _ => obj,
        };

        let (artists, images, name) = match (
            album_obj.get("artists").and_then(Value::as_array),
            album_obj.get("images").and_then(Value::as_array),
            album_obj.get("name"),
        ) {
            (Some(artists), Some(images), Some(name)) => (artists, images, name),
            _ => {
                return Err(ItemError::new(
                    "item is missing artists, name or images.",
                    item,
                ))
            }
        };

        let artist = artists
            .iter()
            .filter_map(|artist| artist.get("name")?.as_str())
            .next()
            .unwrap_or_default()
            .to_string();
        let album = album_remove_disc_misc(name.as_str().unwrap_or_default());

        let results = images
            .iter()
            .filter_map(|image| {
                let url = image.get("url")?.as_str()?;
                let width = image.get("width")?.as_u64()?;
                let height = image.get("height")?.as_u64()?;
                if width < MIN_IMAGE_DIMENSION as u64 || height < MIN_IMAGE_DIMENSION as u64 {
                    return None;
                }

                Some(CoverSearchResult {
                    artist: artist.clone(),
                    album: album.clone(),
                    image_url: Url::parse(url).ok()?,
                    image_size: ImageSize::new(width as u32, height as u32),
                    rank: 0,
                })
            })
            .collect();

        Ok(results)
    }
}

fn search_type(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Album => "album",
        SearchMode::Track => "track",
    }
}
