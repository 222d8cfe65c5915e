use crate::services::CoverSearchService;
use actix_web::web::{Data, Query};
use actix_web::{HttpResponse, Responder};
use cover_providers::{ProviderCovers, SearchId, SearchRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CoversQuery {
    #[serde(default)]
    artist: String,
    #[serde(default)]
    album: String,
    #[serde(default)]
    title: String,
}

#[derive(Serialize)]
struct CoversResponse {
    id: Uuid,
    providers: Vec<ProviderCovers>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

pub(crate) async fn search_covers(
    query: Query<CoversQuery>,
    cover_search: Data<CoverSearchService>,
) -> impl Responder {
    let CoversQuery {
        artist,
        album,
        title,
    } = query.into_inner();
    let request = SearchRequest {
        id: SearchId::new(),
        artist: artist.trim().to_string(),
        album: album.trim().to_string(),
        title: title.trim().to_string(),
    };

    if request.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "At least one of artist, album or title is required",
        });
    }

    debug!(id = %request.id, ?request, "Received cover search request");

    match cover_search.search(&request).await {
        Some(providers) => HttpResponse::Ok().json(CoversResponse {
            id: *request.id,
            providers,
        }),
        None => HttpResponse::BadRequest().json(ErrorResponse {
            error: "No cover provider is able to search right now",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::search_covers;
    use crate::testing::{cover_search_service, FixedTransport};
    use actix_web::http::StatusCode;
    use actix_web::web::{self, Data};
    use actix_web::{test, App};
    use serde_json::Value;

    const DEEZER_REPLY: &str = r#"{"data": [{"id": 3, "title": "Children", "type": "album",
        "artist": {"name": "Robert Miles"},
        "cover_big": "https://cdn.example.com/children/500.jpg"}]}"#;

    #[actix_rt::test]
    async fn should_return_covers_grouped_by_provider() {
        let transport = FixedTransport::new(200, DEEZER_REPLY);
        let service = cover_search_service(transport.clone());
        let app = test::init_service(
            App::new()
                .app_data(Data::new(service))
                .route("/covers", web::get().to(search_covers)),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/covers?artist=Robert%20Miles&title=Children")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;

        assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
        assert_eq!("Deezer", body["providers"][0]["provider"]);
        assert_eq!(2.0, body["providers"][0]["quality"]);

        let result = &body["providers"][0]["results"][0];
        assert_eq!("Children", result["album"]);
        assert_eq!("https://cdn.example.com/children/500.jpg", result["image_url"]);
        assert_eq!(500, result["image_size"]["width"]);

        assert_eq!(
            "https://api.deezer.com/search/track?output=json&q=Robert+Miles+Children&limit=10",
            transport.last_url().unwrap()
        );
    }

    #[actix_rt::test]
    async fn should_reject_empty_query() {
        let transport = FixedTransport::new(200, DEEZER_REPLY);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(cover_search_service(transport.clone())))
                .route("/covers", web::get().to(search_covers)),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/covers?artist=%20&album=")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert!(transport.last_url().is_none());
    }
}
