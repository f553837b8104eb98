use actix_web::{test, web, App};
use crisis_alerts::LoggingAlertDispatcher;
use crisis_config::EngineConfig;
use crisis_engine::CrisisEngine;
use crisis_web::{routes, AppState};
use std::sync::Arc;

fn state() -> AppState {
    let engine = Arc::new(CrisisEngine::new(EngineConfig::default(), Arc::new(LoggingAlertDispatcher)));
    AppState { engine }
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn ready_lists_all_configured_sources() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/ready").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models_loaded"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn analyze_rejects_empty_message_with_400() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/v1/analyze")
        .set_json(serde_json::json!({"message": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn analyze_returns_assessment_for_normal_message() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/v1/analyze")
        .set_json(serde_json::json!({"message": "I had a wonderful day today"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["crisis_score"].as_f64().unwrap() >= 0.0);
    assert!(body["request_id"].as_str().is_some());
}

#[actix_web::test]
async fn analyze_echoes_request_id_header() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/v1/analyze")
        .insert_header(("X-Request-Id", "abc-123"))
        .set_json(serde_json::json!({"message": "just an ordinary update"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["request_id"], "abc-123");
}

#[actix_web::test]
async fn config_reload_rejects_invalid_thresholds_with_422() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let mut config = EngineConfig::default();
    config.thresholds.low = 0.0;
    let req = test::TestRequest::post()
        .uri("/api/v1/config/reload")
        .set_json(&config)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}

#[actix_web::test]
async fn config_reload_accepts_valid_config_with_204() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/v1/config/reload")
        .set_json(&EngineConfig::default())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
}

#[actix_web::test]
async fn intervention_returns_grounding_exercise() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/api/v1/intervention?risk_score=85")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["risk_score"], 85);
    assert!(body["title"].as_str().is_some());
}

#[actix_web::test]
async fn analyze_batch_processes_all_messages() {
    let app = test::init_service(
        App::new().app_data(web::Data::new(state())).configure(routes::configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/v1/analyze/batch")
        .set_json(serde_json::json!({"messages": ["hi there", "another one"], "include_details": false}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["assessments"].as_array().unwrap().len(), 2);
}
