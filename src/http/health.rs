use crate::services::CoverSearchService;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse<'a> {
    version: &'static str,
    providers: &'a [&'static str],
}

pub(crate) async fn health_check(cover_search: Data<CoverSearchService>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        version: crate::VERSION,
        providers: cover_search.provider_names(),
    })
}
