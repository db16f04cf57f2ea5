// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for the provider-backed HTTP surface.

mod common;

use axum::http::StatusCode;
use common::{create_test_app, create_test_app_with, get, json_request, providers_at, send};
use httpmock::prelude::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "message": "API is running" }));
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let (app, _state) = create_test_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_unknown_path_uses_error_envelope() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/no/such/page")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_status_reports_each_provider() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ping");
            then.status(200).json_body(json!({ "gecko_says": "(V3) To the Moon!" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rate_limit");
            then.status(200).json_body(json!({ "rate": { "limit": 60, "remaining": 0 } }));
        })
        .await;

    let mut providers = providers_at(&server.base_url());
    providers.news = api_dashboard::services::NewsClient::new(
        api_dashboard::services::http_client().unwrap(),
        None,
    );
    let (app, _state) = create_test_app_with(providers);

    let (status, body) = send(&app, get("/test-apis")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news"], "API Key Missing");
    assert_eq!(body["weather"], "OK");
    assert_eq!(body["crypto"], "OK");
    // Exhausted rate limit counts as unavailable.
    assert_eq!(body["github"], "Error");
}

#[tokio::test]
async fn test_dashboard_survives_total_outage() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/dashboard/data")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["news"]["articles"], json!([]));
    assert_eq!(data["news"]["total_results"], 0);
    assert!(data["weather"].is_null());
    assert_eq!(data["crypto"], json!({}));
    assert_eq!(data["github"], json!([]));
}

#[tokio::test]
async fn test_dashboard_partial_failure_keeps_healthy_sections() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/simple/price");
            then.status(200).json_body(json!({
                "bitcoin": { "usd": 40000.0 },
                "ethereum": { "usd": 2500.0 }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/top-headlines");
            then.status(503);
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let (status, body) = send(&app, get("/dashboard/data")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["crypto"]["bitcoin"]["price"], 40000.0);
    assert_eq!(data["crypto"]["ethereum"]["price"], 2500.0);
    assert_eq!(data["news"]["articles"], json!([]));
    assert!(data["weather"].is_null());
}

#[tokio::test]
async fn test_news_search_requires_query() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/news/api/search?q=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "Query required" }));
}

#[tokio::test]
async fn test_news_headlines_degrade_to_empty_page() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/news/api/headlines?category=technology")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "articles": [], "total_results": 0 })
    );
}

#[tokio::test]
async fn test_news_categories_are_static() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/news/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert!(categories.contains(&json!("technology")));
}

#[tokio::test]
async fn test_github_search_empty_query_skips_upstream() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let (status, body) = send(&app, get("/github/api/search/repositories?q=")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query required");
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_github_repo_not_found() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/github/api/repo/octo/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Repository not found");
}

#[tokio::test]
async fn test_github_rate_limit_degrades_to_zero() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/github/api/rate_limit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate_limit"]["remaining"], 0);
}

#[tokio::test]
async fn test_crypto_prices_accepts_repeated_and_comma_forms() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/simple/price")
                .query_param("ids", "bitcoin,ethereum,solana")
                .query_param("vs_currencies", "eur");
            then.status(200).json_body(json!({
                "bitcoin": { "eur": 37000.0 },
                "solana": { "eur": 140.0 }
            }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let (status, body) = send(
        &app,
        get("/crypto/api/prices?coins=bitcoin,ethereum&coins=solana&vs_currency=EUR"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(body["prices"]["bitcoin"]["price"], 37000.0);
    assert_eq!(body["prices"]["solana"]["price"], 140.0);
    assert!(body["prices"].get("ethereum").is_none());
}

#[tokio::test]
async fn test_crypto_coin_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/coins/doesnotexist123");
            then.status(404).json_body(json!({ "error": "coin not found" }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let (status, body) = send(&app, get("/crypto/api/coin/doesnotexist123")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Coin not found" }));
}

#[tokio::test]
async fn test_crypto_chart_degrades_to_null() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/crypto/api/chart/bitcoin?days=30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["chart_data"].is_null());
}

#[tokio::test]
async fn test_crypto_top_rejects_bad_limit() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/crypto/api/top?limit=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_weather_failure_is_bad_request() {
    let (app, _state) = create_test_app();
    let (status, body) = send(&app, get("/weather/api/current/Atlantis")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to fetch weather data");

    let (status, body) = send(&app, get("/weather/api/forecast/Atlantis?days=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to fetch forecast data");
}

#[tokio::test]
async fn test_weather_forecast_requests_eight_points_per_day() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/forecast")
                .query_param("q", "Paris")
                .query_param("cnt", "16");
            then.status(200).json_body(json!({
                "city": { "name": "Paris", "country": "FR" },
                "list": [{
                    "dt_txt": "2024-06-10 12:00:00",
                    "main": { "temp": 21.0, "humidity": 40 },
                    "weather": [{ "main": "Clear", "description": "clear sky", "icon": "01d" }],
                    "pop": 0.2
                }]
            }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let (status, body) = send(&app, get("/weather/api/forecast/Paris?days=2")).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"]["city"], "Paris");
    assert_eq!(body["forecast"]["forecasts"][0]["condition"], "Clear");
}

#[tokio::test]
async fn test_notifications_flow() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, get("/notifications/api/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, body) = send(
        &app,
        json_request("POST", "/notifications/api/", json!({ "message": "BTC moved" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notification"]["type"], "info");
    assert_eq!(body["notification"]["read"], false);
    let id = body["notification"]["id"].as_u64().unwrap();

    send(
        &app,
        json_request(
            "POST",
            "/notifications/api/",
            json!({ "message": "Disk full", "type": "warning" }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/notifications/api/{id}/read"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["read"], true);

    let (_, body) = send(&app, get("/notifications/api/")).await;
    assert_eq!(body["count"], 2);
    let kinds: Vec<_> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["type"].as_str().unwrap().to_string())
        .collect();
    assert!(kinds.contains(&"warning".to_string()));
}

#[tokio::test]
async fn test_notification_requires_message() {
    let (app, _state) = create_test_app();

    let (status, body) = send(
        &app,
        json_request("POST", "/notifications/api/", json!({ "type": "info" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");

    let (status, _) = send(
        &app,
        json_request("POST", "/notifications/api/", json!({ "message": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/notifications/api/9999/read", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
