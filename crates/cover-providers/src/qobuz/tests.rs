use crate::provider::{parse_json_object, SearchQuery};
use crate::qobuz::QobuzApi;
use crate::testing::{MockCredentials, MockTransport};
use crate::{CoverProvider, CoverSearchResult, ImageSize, ProviderError, SearchId};
use url::Url;

const DREAMLAND_LARGE: &str = "https://static.qobuz.com/images/covers/87/70/0886443927087_600.jpg";
const REMASTER_LARGE: &str = "https://static.qobuz.com/images/covers/84/05/5054197190584_600.jpg";

fn cover(url: &str) -> CoverSearchResult {
    CoverSearchResult {
        artist: "Robert Miles".into(),
        album: "Dreamland".into(),
        image_url: Url::parse(url).unwrap(),
        image_size: ImageSize::new(600, 600),
        rank: 0,
    }
}

fn parse(body: &str) -> Result<Vec<CoverSearchResult>, ProviderError> {
    QobuzApi::parse_results(&parse_json_object(body.as_bytes())?)
}

#[test]
fn test_parsing_of_album_search_results() {
    let results = parse(include_str!("fixtures/album_search.json"))
        .expect("Expected successful parse results");

    assert_eq!(vec![cover(DREAMLAND_LARGE), cover(REMASTER_LARGE)], results);
}

#[test]
fn test_parsing_of_track_search_results() {
    let results = parse(include_str!("fixtures/track_search.json"))
        .expect("Expected successful parse results");

    assert_eq!(vec![cover(DREAMLAND_LARGE), cover(REMASTER_LARGE)], results);
}

#[test]
fn should_return_empty_results_for_empty_items() {
    let results = parse(r#"{"albums": {"limit": 10, "offset": 0, "total": 0, "items": []}}"#)
        .expect("Expected successful parse results");

    assert!(results.is_empty());
}

#[test]
fn should_fail_on_malformed_envelope() {
    assert!(matches!(
        parse(r#"{"artists": {"items": []}}"#),
        Err(ProviderError::UnexpectedJson { .. })
    ));
    assert!(matches!(
        parse(r#"{"albums": []}"#),
        Err(ProviderError::UnexpectedJson { .. })
    ));
    assert!(matches!(
        parse(r#"{"albums": {"total": 0}}"#),
        Err(ProviderError::UnexpectedJson { .. })
    ));
    assert!(matches!(
        parse(r#"{"tracks": {"items": {}}}"#),
        Err(ProviderError::UnexpectedJson { .. })
    ));
}

#[test]
fn should_build_request_with_sorted_params_and_auth_headers() {
    let api = QobuzApi::new(MockCredentials::with_token("user-token"));

    let request = api.build_request(&SearchQuery::new("Robert Miles", "Dreamland", "").unwrap());

    assert_eq!(
        "https://www.qobuz.com/api.json/0.2/album/search?app_id=app&limit=10&query=Robert+Miles+Dreamland",
        request.url.as_str()
    );
    assert_eq!(Some("app"), request.header_value("X-App-Id"));
    assert_eq!(Some("user-token"), request.header_value("X-User-Auth-Token"));
    assert_eq!(
        Some("application/x-www-form-urlencoded"),
        request.header_value("Content-Type")
    );

    let request = api.build_request(&SearchQuery::new("", "", "Children").unwrap());
    assert_eq!(
        "https://www.qobuz.com/api.json/0.2/track/search?app_id=app&limit=10&query=Children",
        request.url.as_str()
    );
}

#[actix_rt::test]
async fn should_deauthenticate_once_on_expired_token() {
    let credentials = MockCredentials::with_token("expired");
    let transport = MockTransport::reply(
        401,
        r#"{"status": "error", "code": 401, "message": "User authentication is required."}"#,
    );
    let mut provider = CoverProvider::qobuz(transport, credentials.clone());
    let id = SearchId::new();

    assert!(provider.start_search("Robert Miles", "Dreamland", "", id));

    let finished = provider.next_finished().await.unwrap();
    assert_eq!(id, finished.id);
    assert!(finished.results.is_empty());
    assert_eq!(1, credentials.deauthenticated());
}

#[actix_rt::test]
async fn should_deauthenticate_on_unauthorized_status_without_body() {
    let credentials = MockCredentials::with_token("expired");
    let mut provider = CoverProvider::qobuz(MockTransport::reply(401, ""), credentials.clone());

    assert!(provider.start_search("Robert Miles", "Dreamland", "", SearchId::new()));

    let finished = provider.next_finished().await.unwrap();
    assert!(finished.results.is_empty());
    assert_eq!(1, credentials.deauthenticated());
}

#[actix_rt::test]
async fn should_keep_credentials_on_other_api_errors() {
    let credentials = MockCredentials::with_token("token");
    let transport = MockTransport::reply(
        400,
        r#"{"status": "error", "code": 400, "message": "Invalid argument: limit"}"#,
    );
    let mut provider = CoverProvider::qobuz(transport, credentials.clone());

    assert!(provider.start_search("Robert Miles", "Dreamland", "", SearchId::new()));

    let finished = provider.next_finished().await.unwrap();
    assert!(finished.results.is_empty());
    assert_eq!(0, credentials.deauthenticated());
}
