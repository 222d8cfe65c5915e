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

const QOBUZ_API_URL: &str = "https://www.qobuz.com/api.json/0.2";
const QOBUZ_IMAGE_SIZE: ImageSize = ImageSize::new(600, 600);

pub(crate) struct QobuzApi {
    credentials: Arc<dyn Credentials>,
}

impl QobuzApi {
    pub(crate) fn new(credentials: Arc<dyn Credentials>) -> Self {
        Self { credentials }
    }

    pub(crate) fn credentials(&self) -> &Arc<dyn Credentials> {
        &self.credentials
    }

    pub(crate) fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let resource = match query.mode {
            SearchMode::Track => "track/search",
            SearchMode::Album => "album/search",
        };
        let app_id = self.credentials.app_id().unwrap_or_default();
        let user_auth_token = self.credentials.access_token().unwrap_or_default();

        let mut params = vec![
            ("query", query.text.clone()),
            ("limit", SEARCH_LIMIT.to_string()),
            ("app_id", app_id.clone()),
        ];
        params.sort();

        let url = Url::parse_with_params(&format!("{}/{}", QOBUZ_API_URL, resource), &params)
            .expect("Qobuz API URL is valid");

        HttpRequest::new(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("X-App-Id", app_id)
            .header("X-User-Auth-Token", user_auth_token)
    }

    pub(crate) fn decode_error(json: &Map<String, Value>) -> Option<ApiError> {
        if !json.contains_key("status") {
            return None;
        }
        let code = json.get("code")?.as_i64().unwrap_or_default();
        let message = json.get("message")?.as_str().unwrap_or_default().to_string();

        Some(ApiError {
            message,
            code,
            credential_expired: code == 401,
        })
    }

    pub(crate) fn parse_results(
        json: &Map<String, Value>,
    ) -> Result<CoverSearchResults, ProviderError> {
        let envelope = json
            .get("albums")
            .or_else(|| json.get("tracks"))
            .ok_or_else(|| {
                ProviderError::unexpected(
                    "Json reply is missing albums and tracks object.",
                    &Value::Object(json.clone()),
                )
            })?;

        let items = envelope
            .as_object()
            .ok_or_else(|| {
                ProviderError::unexpected("Json albums or tracks is not an object.", envelope)
            })?
            .get("items")
            .ok_or_else(|| {
                ProviderError::unexpected(
                    "Json albums or tracks object does not contain items.",
                    envelope,
                )
            })?;

        let items = items.as_array().ok_or_else(|| {
            ProviderError::unexpected("Json albums or tracks object items is not an array.", items)
        })?;

        let mut results = ResultSet::default();

        for item in items {
            match Self::parse_item(item) {
                Ok(result) => {
                    results.insert(result);
                }
                Err(error) => log_item_error(ProviderKind::Qobuz, &error),
            }
        }

        Ok(results.into_sorted())
    }

    fn parse_item(item: &Value) -> Result<CoverSearchResult, ItemError> {
        let obj = item
            .as_object()
            .ok_or_else(|| ItemError::new("value in items is not an object.", item))?;

        let album_obj = match obj.get("album") {
            Some(Value::Object(album)) => album,
            Some(_) => return Err(ItemError::new("items album is not an object.", item)),
            None => obj,
        };

        let (artist, image, title) = match (
            album_obj.get("artist"),
            album_obj.get("image"),
            album_obj.get("title"),
        ) {
            (Some(artist), Some(image), Some(title)) => (artist, image, title),
            _ => {
                return Err(ItemError::new(
                    "item is missing artist, title or image.",
                    item,
                ))
            }
        };

        let artist = artist
            .as_object()
            .ok_or_else(|| ItemError::new("items (album) artist is not an object.", artist))?
            .get("name")
            .ok_or_else(|| ItemError::new("items (album) artist is missing name.", artist))?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let large = image
            .as_object()
            .ok_or_else(|| ItemError::new("items (album) image is not an object.", image))?
            .get("large")
            .ok_or_else(|| ItemError::new("items (album) image is missing large.", image))?;

        let image_url = large
            .as_str()
            .and_then(|large| Url::parse(large).ok())
            .ok_or_else(|| ItemError::new("items (album) image large is not a valid URL.", image))?;

        Ok(CoverSearchResult {
            artist,
            album: album_remove_disc_misc(title.as_str().unwrap_or_default()),
            image_url,
            image_size: QOBUZ_IMAGE_SIZE,
            rank: 0,
        })
    }
}

#[cfg(test)]
mod tests;
