// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for user accounts and the records they own.

mod common;

use api_dashboard::db::tables;
use api_dashboard::services::NotificationStore;
use axum::http::StatusCode;
use common::{
    create_test_app, create_test_app_with, create_user, delete, get, json_request, providers_at,
    send,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

async fn post(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("POST", uri, body)).await
}

fn bitcoin_holding() -> serde_json::Value {
    json!({
        "coin_id": "bitcoin",
        "coin_name": "Bitcoin",
        "symbol": "btc",
        "amount": 0.5,
        "purchase_price": 30000.0
    })
}

#[tokio::test]
async fn test_create_and_fetch_user() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;

    let (status, body) = send(&app, get(&format!("/api/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_user_is_conflict() {
    let (app, _state) = create_test_app();
    create_user(&app, "ada").await;

    let (status, body) = post(
        &app,
        "/api/users",
        json!({ "username": "ada", "email": "other@example.com", "password": "long enough" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_invalid_user_payload() {
    let (app, _state) = create_test_app();
    let (status, body) = post(
        &app,
        "/api/users",
        json!({ "username": "ab", "email": "nope", "password": "short" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post(&app, "/api/users", json!({ "username": "ada" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;

    let (status, body) = post(
        &app,
        "/api/login",
        json!({ "username": "ada", "password": "correct horse battery" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);

    let (status, body) = post(
        &app,
        "/api/login",
        json!({ "username": "ada", "password": "wrong password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, _) = post(
        &app,
        "/api/login",
        json!({ "username": "nobody", "password": "correct horse battery" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (app, _state) = create_test_app();

    let (status, body) = send(&app, get("/api/users/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User 42 not found");

    let (status, _) = send(&app, get("/api/users/42/holdings")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&app, "/api/users/42/holdings", bitcoin_holding()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete("/api/users/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_records_round_trip_owner_and_fields() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;

    let (status, body) = post(
        &app,
        &format!("/api/users/{id}/articles"),
        json!({
            "title": "Rust in production",
            "url": "https://example.com/rust",
            "source": "Example News",
            "published_at": "2024-06-10T09:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["article"]["user_id"], id);
    assert_eq!(body["article"]["url"], "https://example.com/rust");

    let (status, body) = post(
        &app,
        &format!("/api/users/{id}/favorites"),
        json!({ "city_name": "London", "country": "GB", "latitude": 51.5, "longitude": -0.12 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["favorite"]["city_name"], "London");
    assert_eq!(body["favorite"]["latitude"], 51.5);

    let (status, body) = post(
        &app,
        &format!("/api/users/{id}/repos"),
        json!({
            "repo_full_name": "tokio-rs/tokio",
            "repo_name": "tokio",
            "owner": "tokio-rs",
            "language": "Rust",
            "stars": 25000,
            "url": "https://github.com/tokio-rs/tokio"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["repo"]["repo_full_name"], "tokio-rs/tokio");
    assert_eq!(body["repo"]["forks"], 0);

    let (status, body) = post(&app, &format!("/api/users/{id}/holdings"), bitcoin_holding()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["holding"]["symbol"], "BTC");
    assert_eq!(body["holding"]["user_id"], id);

    let (_, body) = send(&app, get(&format!("/api/users/{id}/articles"))).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    assert_eq!(body["articles"][0]["title"], "Rust in production");

    let (_, body) = send(&app, get(&format!("/api/users/{id}/repos"))).await;
    assert_eq!(body["repos"][0]["stars"], 25000);
}

#[tokio::test]
async fn test_duplicate_records_are_conflicts() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;
    let uri = format!("/api/users/{id}/holdings");

    post(&app, &uri, bitcoin_holding()).await;
    let (status, _) = post(&app, &uri, bitcoin_holding()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Same coin for a different user is fine.
    let other = create_user(&app, "bob").await;
    let (status, _) = post(&app, &format!("/api/users/{other}/holdings"), bitcoin_holding()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_record_payloads() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;

    let (status, _) = post(
        &app,
        &format!("/api/users/{id}/articles"),
        json!({ "title": "No link", "url": "not a url" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        &format!("/api/users/{id}/favorites"),
        json!({ "city_name": "Nowhere", "latitude": 123.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        &format!("/api/users/{id}/alerts"),
        json!({ "coin_id": "bitcoin", "target_price": 1.0, "condition": "sideways" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_holding() {
    let (app, _state) = create_test_app();
    let id = create_user(&app, "ada").await;
    let (_, body) = post(&app, &format!("/api/users/{id}/holdings"), bitcoin_holding()).await;
    let holding_id = body["holding"]["id"].as_i64().unwrap();
    let uri = format!("/api/users/{id}/holdings/{holding_id}");

    let (status, body) = send(&app, json_request("PUT", &uri, json!({ "amount": 1.25 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holding"]["amount"], 1.25);
    assert_eq!(body["holding"]["purchase_price"], 30000.0);

    let (status, body) = send(&app, json_request("PUT", &uri, json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nothing to update");

    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/api/users/{id}/holdings/999"), json!({ "amount": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_scoped_to_owner() {
    let (app, _state) = create_test_app();
    let ada = create_user(&app, "ada").await;
    let bob = create_user(&app, "bob").await;

    let (_, body) = post(
        &app,
        &format!("/api/users/{ada}/favorites"),
        json!({ "city_name": "Paris" }),
    )
    .await;
    let favorite_id = body["favorite"]["id"].as_i64().unwrap();

    let uri = format!("/api/users/{bob}/favorites/{favorite_id}");
    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Favorite not found");

    let uri = format!("/api/users/{ada}/favorites/{favorite_id}");
    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Favorite deleted");

    let (_, body) = send(&app, get(&format!("/api/users/{ada}/favorites"))).await;
    assert_eq!(body["favorites"], json!([]));
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let (app, state) = create_test_app();
    let ada = create_user(&app, "ada").await;
    let bob = create_user(&app, "bob").await;

    for user in [ada, bob] {
        post(
            &app,
            &format!("/api/users/{user}/articles"),
            json!({ "title": "Story", "url": "https://example.com/story" }),
        )
        .await;
        post(&app, &format!("/api/users/{user}/holdings"), bitcoin_holding()).await;
        post(
            &app,
            &format!("/api/users/{user}/alerts"),
            json!({ "coin_id": "bitcoin", "target_price": 50000.0, "condition": "above" }),
        )
        .await;
        post(
            &app,
            &format!("/api/users/{user}/favorites"),
            json!({ "city_name": "Berlin" }),
        )
        .await;
        post(
            &app,
            &format!("/api/users/{user}/repos"),
            json!({
                "repo_full_name": "serde-rs/serde",
                "repo_name": "serde",
                "owner": "serde-rs",
                "url": "https://github.com/serde-rs/serde"
            }),
        )
        .await;
    }
    for table in tables::OWNED {
        assert_eq!(state.db.count_rows(table).unwrap(), 2, "{table}");
    }

    let (status, body) = send(&app, delete(&format!("/api/users/{ada}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    for table in tables::OWNED {
        assert_eq!(state.db.count_rows(table).unwrap(), 1, "{table}");
    }
    assert_eq!(state.db.count_rows(tables::USERS).unwrap(), 1);

    let (status, _) = send(&app, get(&format!("/api/users/{ada}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = send(&app, get(&format!("/api/users/{bob}/holdings"))).await;
    assert_eq!(body["holdings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_portfolio_valuation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/simple/price")
                .query_param("ids", "bitcoin,dogecoin")
                .query_param("vs_currencies", "usd");
            then.status(200).json_body(json!({
                "bitcoin": { "usd": 40000.0, "usd_24h_change": 2.0 }
            }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let id = create_user(&app, "ada").await;
    post(&app, &format!("/api/users/{id}/holdings"), bitcoin_holding()).await;
    post(
        &app,
        &format!("/api/users/{id}/holdings"),
        json!({
            "coin_id": "dogecoin",
            "coin_name": "Dogecoin",
            "symbol": "doge",
            "amount": 100.0
        }),
    )
    .await;

    let (status, body) = send(&app, get(&format!("/api/users/{id}/portfolio"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mock.hits_async().await, 1);

    let portfolio = &body["portfolio"];
    assert_eq!(portfolio["vs_currency"], "usd");
    assert_eq!(portfolio["total_value"], 20000.0);
    assert_eq!(portfolio["total_cost"], 15000.0);
    assert_eq!(portfolio["total_profit_loss"], 5000.0);
    assert_eq!(portfolio["total_profit_loss_percentage"], 33.33);
    assert_eq!(portfolio["unpriced"], json!(["dogecoin"]));
    assert!(portfolio["holdings"][1]["current_value"].is_null());
}

#[tokio::test]
async fn test_portfolio_in_unquoted_currency_is_unpriced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/simple/price")
                .query_param("vs_currencies", "xyz");
            then.status(200).json_body(json!({ "bitcoin": {} }));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let id = create_user(&app, "ada").await;
    post(&app, &format!("/api/users/{id}/holdings"), bitcoin_holding()).await;

    let (status, body) = send(
        &app,
        get(&format!("/api/users/{id}/portfolio?vs_currency=xyz")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let portfolio = &body["portfolio"];
    assert_eq!(portfolio["unpriced"], json!(["bitcoin"]));
    assert_eq!(portfolio["total_value"], 0.0);
    assert!(portfolio["holdings"][0]["current_value"].is_null());
}

#[tokio::test]
async fn test_empty_portfolio_skips_price_lookup() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({}));
        })
        .await;

    let (app, _state) = create_test_app_with(providers_at(&server.base_url()));
    let id = create_user(&app, "ada").await;

    let (status, body) = send(&app, get(&format!("/api/users/{id}/portfolio"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["portfolio"]["total_value"], 0.0);
    assert_eq!(body["portfolio"]["holdings"], json!([]));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_alert_check_triggers_once_and_notifies() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/simple/price");
            then.status(200).json_body(json!({
                "bitcoin": { "usd": 52000.0 },
                "ethereum": { "usd": 2500.0 }
            }));
        })
        .await;

    let (app, state) = create_test_app_with(providers_at(&server.base_url()));
    let id = create_user(&app, "ada").await;
    let alerts = format!("/api/users/{id}/alerts");
    let (status, _) = post(
        &app,
        &alerts,
        json!({ "coin_id": "bitcoin", "target_price": 50000.0, "condition": "above" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    post(
        &app,
        &alerts,
        json!({ "coin_id": "ethereum", "target_price": 2000.0, "condition": "below" }),
    )
    .await;

    let (status, body) = post(&app, &format!("{alerts}/check"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let triggered = body["triggered"].as_array().unwrap();
    assert_eq!(triggered.len(), 1);
    assert_eq!(triggered[0]["coin_id"], "bitcoin");
    assert_eq!(triggered[0]["current_price"], 52000.0);

    let notifications = state.notifications.list();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "alert");

    let (_, body) = send(&app, get(&alerts)).await;
    let bitcoin = body["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["coin_id"] == "bitcoin")
        .unwrap()
        .clone();
    assert_eq!(bitcoin["is_active"], false);
    assert!(bitcoin["triggered_at"].is_string());

    // Fired alerts stay quiet on the next check.
    let (_, body) = post(&app, &format!("{alerts}/check"), json!({})).await;
    assert_eq!(body["triggered"], json!([]));
    assert_eq!(state.notifications.list().len(), 1);
}

#[tokio::test]
async fn test_concurrent_alert_checks_notify_once() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/simple/price");
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(json!({ "bitcoin": { "usd": 52000.0 } }));
        })
        .await;

    let (app, state) = create_test_app_with(providers_at(&server.base_url()));
    let id = create_user(&app, "ada").await;
    let alerts = format!("/api/users/{id}/alerts");
    post(
        &app,
        &alerts,
        json!({ "coin_id": "bitcoin", "target_price": 50000.0, "condition": "above" }),
    )
    .await;

    // Both checks read the alert as active before either marks it.
    let check = format!("{alerts}/check");
    let ((first_status, first), (second_status, second)) = tokio::join!(
        post(&app, &check, json!({})),
        post(&app, &check, json!({}))
    );
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);

    let fired = first["triggered"].as_array().unwrap().len()
        + second["triggered"].as_array().unwrap().len();
    assert_eq!(fired, 1);
    assert_eq!(state.notifications.list().len(), 1);
}

#[tokio::test]
async fn test_alert_check_with_provider_down_triggers_nothing() {
    let (app, state) = create_test_app();
    let id = create_user(&app, "ada").await;
    post(
        &app,
        &format!("/api/users/{id}/alerts"),
        json!({ "coin_id": "bitcoin", "target_price": 1.0, "condition": "above" }),
    )
    .await;

    let (status, body) = post(&app, &format!("/api/users/{id}/alerts/check"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggered"], json!([]));
    assert!(state.notifications.list().is_empty());
}
