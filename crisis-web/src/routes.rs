//! Route handlers. Thin: parse/extract, delegate to `crisis-engine`, map the
//! result onto an HTTP response. No business logic lives here.

use crate::error::ApiError;
use crate::intervention::get_grounding_exercise;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use crisis_common::SourceName;
use crisis_config::EngineConfig;
use crisis_engine::AnalyzeRequest;
use serde::{Deserialize, Serialize};

const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/ready").route(web::get().to(ready)))
        .service(
            web::scope("/api/v1")
                .service(web::resource("/analyze").route(web::post().to(analyze)))
                .service(web::resource("/analyze/batch").route(web::post().to(analyze_batch)))
                .service(web::resource("/config/reload").route(web::post().to(config_reload)))
                .service(web::resource("/intervention").route(web::get().to(intervention))),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    models_loaded: Vec<SourceName>,
}

async fn ready(state: web::Data<AppState>) -> HttpResponse {
    let models_loaded = state.engine.configured_sources();
    let status = if models_loaded.len() == SourceName::ALL.len() {
        "ok"
    } else {
        "degraded"
    };
    HttpResponse::Ok().json(ReadyResponse { status, models_loaded })
}

async fn analyze(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut request = body.into_inner();
    if request.request_id.is_none() {
        request.request_id = header_request_id(&req);
    }
    let assessment = state.engine.analyze(request).await?;
    Ok(HttpResponse::Ok().json(assessment))
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    messages: Vec<String>,
    #[serde(default)]
    include_details: bool,
}

async fn analyze_batch(state: web::Data<AppState>, body: web::Json<BatchRequest>) -> HttpResponse {
    let body = body.into_inner();
    let result = state.engine.analyze_batch(body.messages, body.include_details).await;
    HttpResponse::Ok().json(result)
}

async fn config_reload(state: web::Data<AppState>, body: web::Json<EngineConfig>) -> Result<HttpResponse, ApiError> {
    state.engine.reload_config(body.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
struct InterventionQuery {
    risk_score: u8,
}

async fn intervention(query: web::Query<InterventionQuery>) -> HttpResponse {
    HttpResponse::Ok().json(get_grounding_exercise(query.risk_score))
}

fn header_request_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
