use crate::normalize::album_remove_disc_misc;
use crate::provider::{
    log_item_error, ApiError, ProviderKind, ResultSet, SearchMode, SearchQuery, SEARCH_LIMIT,
};
use crate::{CoverSearchResult, CoverSearchResults, HttpRequest, ImageSize, ItemError, ProviderError};
use serde_json::{Map, Value};
use url::Url;

const DEEZER_API_URL: &str = "https://api.deezer.com";

const COVER_SIZES: [(&str, ImageSize); 2] = [
    ("cover_xl", ImageSize::new(1000, 1000)),
    ("cover_big", ImageSize::new(500, 500)),
];

struct DeezerEntry {
    artist: String,
    album: String,
    covers: Vec<(Url, ImageSize)>,
}

pub(crate) struct DeezerApi;

impl DeezerApi {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let resource = match query.mode {
            SearchMode::Track => "search/track",
            SearchMode::Album => "search/album",
        };
        let limit = SEARCH_LIMIT.to_string();

        let url = Url::parse_with_params(
            &format!("{}/{}", DEEZER_API_URL, resource),
            &[
                ("output", "json"),
                ("q", query.text.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .expect("Deezer API URL is valid");

        HttpRequest::new(url)
    }

    pub(crate) fn decode_error(json: &Map<String, Value>) -> Option<ApiError> {
        let error = json.get("error")?.as_object()?;
        let code = error.get("code")?.as_i64().unwrap_or_default();
        let message = error.get("message")?.as_str().unwrap_or_default().to_string();

        Some(ApiError {
            message,
            code,
            credential_expired: false,
        })
    }

    pub(crate) fn parse_results(
        json: &Map<String, Value>,
    ) -> Result<CoverSearchResults, ProviderError> {
        let data = Self::extract_data(json)?;

        let items = data
            .as_array()
            .ok_or_else(|| ProviderError::unexpected("Json data is not an array.", data))?;

        let mut results = ResultSet::default();
        let mut rank = 0;

        for item in items {
            let entry = match Self::parse_entry(item) {
                Ok(entry) => entry,
                Err(error) => {
                    log_item_error(ProviderKind::Deezer, &error);
                    continue;
                }
            };

            rank += 1;

            for (image_url, image_size) in entry.covers {
                results.insert(CoverSearchResult {
                    artist: entry.artist.clone(),
                    album: entry.album.clone(),
                    image_url,
                    image_size,
                    rank,
                });
            }
        }

        Ok(results.into_sorted())
    }

    fn extract_data(json: &Map<String, Value>) -> Result<&Value, ProviderError> {
        if let Some(error) = json.get("error") {
            let fragment = Value::Object(json.clone());
            return match Self::decode_error(json) {
                Some(api_error) => Err(ProviderError::Api {
                    message: api_error.message,
                    code: api_error.code,
                }),
                None if !error.is_object() => {
                    Err(ProviderError::unexpected("Error missing object", &fragment))
                }
                None => Err(ProviderError::unexpected("Unreadable error object", &fragment)),
            };
        }

        json.get("data").or_else(|| json.get("DATA")).ok_or_else(|| {
            ProviderError::unexpected(
                "Json reply object is missing data.",
                &Value::Object(json.clone()),
            )
        })
    }

    fn parse_entry(item: &Value) -> Result<DeezerEntry, ItemError> {
        let obj = item
            .as_object()
            .ok_or_else(|| ItemError::new("data array value is not an object.", item))?;

        // Track hits carry their album as a nested object.
        let album_obj = match obj.get("album") {
            Some(Value::Object(album)) => album,
            _ => obj,
        };

        if !obj.contains_key("id") || !album_obj.contains_key("id") {
            return Err(ItemError::new("data array value object is missing ID.", item));
        }

        match album_obj.get("type").and_then(Value::as_str) {
            Some("album") => {}
            Some(_) => {
                return Err(ItemError::new(
                    "data array value album object has incorrect type returned.",
                    item,
                ))
            }
            None => {
                return Err(ItemError::new(
                    "data array value album object is missing type.",
                    item,
                ))
            }
        }

        let artist = obj
            .get("artist")
            .ok_or_else(|| ItemError::new("data array value object is missing artist.", item))?
            .as_object()
            .ok_or_else(|| ItemError::new("data array value artist is not an object.", item))?
            .get("name")
            .ok_or_else(|| ItemError::new("data array value artist object is missing name.", item))?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let album = album_obj
            .get("title")
            .ok_or_else(|| ItemError::new("data array value album object is missing title.", item))?
            .as_str()
            .unwrap_or_default();

        let covers = COVER_SIZES
            .iter()
            .filter_map(|(key, size)| {
                let cover = album_obj.get(*key)?.as_str()?;
                Url::parse(cover).ok().map(|url| (url, *size))
            })
            .collect::<Vec<_>>();

        if covers.is_empty() {
            return Err(ItemError::new(
                "data array value album object is missing cover.",
                item,
            ));
        }

        Ok(DeezerEntry {
            artist,
            album: album_remove_disc_misc(album),
            covers,
        })
    }
}
