//! API integration tests
//!
//! Run against a live server with a bootstrap admin configured:
//! MUSEOSMART_AUTH__BOOTSTRAP_ADMIN_USERNAME=admin
//! MUSEOSMART_AUTH__BOOTSTRAP_ADMIN_PASSWORD=admin-password

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.org", prefix, uuid::Uuid::new_v4().simple())
}

async fn create_group_booking(client: &Client, total_visitors: i32) -> Value {
    let date = (Utc::now() + Duration::days(7)).date_naive();
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "booking_date": date.to_string(),
            "time_slot": "10:00-11:00",
            "booking_type": "group",
            "total_visitors": total_visitors,
            "institution": "Rizal High School",
            "purpose": "Field trip",
            "main_visitor": {
                "first_name": "Ana",
                "last_name": "Cruz",
                "email": unique_email("leader")
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_reports_require_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/checkin/groups/1/arrival", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_group_checkin_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let created = create_group_booking(&client, 3).await;
    let booking_id = created["booking"]["id"].as_i64().expect("booking id");
    let leader_token = created["main_visitor"]["token"].as_str().expect("token").to_string();

    // Nobody in yet
    let response = client
        .get(format!("{}/checkin/groups/{}/arrival", BASE_URL, booking_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let arrival: Value = response.json().await.expect("Failed to parse response");
    assert!(arrival["arrival_time"].is_null());
    assert_eq!(arrival["checked_in_count"], 0);

    // Leader invites two members
    let response = client
        .post(format!("{}/visitors/token/{}/invites", BASE_URL, leader_token))
        .json(&json!({ "emails": [unique_email("member"), unique_email("member")] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let invited: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(invited.len(), 2);
    assert!(invited.iter().all(|m| m.get("token").is_none()));

    // A fourth visitor exceeds the declared size
    let response = client
        .post(format!("{}/bookings/{}/invites", BASE_URL, booking_id))
        .bearer_auth(&token)
        .json(&json!({ "emails": [unique_email("extra")] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Scan the leader twice
    for expected_already in [false, true] {
        let response = client
            .post(format!("{}/checkin/scan", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({ "token": leader_token }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let result: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(result["already_checked_in"], expected_already);
        assert_eq!(result["visitor"]["status"], "visited");
    }

    let response = client
        .get(format!("{}/checkin/groups/{}", BASE_URL, booking_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let details: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(details["booking"]["status"], "checked-in");
    assert_eq!(details["summary"]["expected"], 3);
    assert_eq!(details["summary"]["checked_in"], 1);
    assert_eq!(details["summary"]["progress"], "1/3 visitors checked in");
    assert_eq!(details["summary"]["is_complete"], false);

    // Today's bucket includes the scan
    let today = Utc::now().date_naive();
    let response = client
        .get(format!(
            "{}/checkin/stats?start_date={}&end_date={}",
            BASE_URL, today, today
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let stats: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["date"], today.to_string());
    assert!(stats[0]["checkins"].as_i64().unwrap_or_default() >= 1);

    let response = client
        .get(format!("{}/checkin/groups/{}/export?format=csv", BASE_URL, booking_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let csv = response.text().await.expect("Failed to read body");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("visitor_type,name,email,checkin_time,status"));
    assert!(lines.next().is_some_and(|l| l.starts_with("Main,Ana Cruz")));
}

#[tokio::test]
#[ignore]
async fn test_group_details_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/checkin/groups/999999999", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_checkin_stats_rejects_inverted_range() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!(
            "{}/checkin/stats?start_date=2025-03-10&end_date=2025-03-01",
            BASE_URL
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_scan_unknown_token() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/checkin/scan", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "token": "does-not-exist" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_event_registration_is_idempotent() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let date = (Utc::now() + Duration::days(14)).date_naive();
    let response = client
        .post(format!("{}/events", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Curator talk",
            "event_date": date.to_string(),
            "capacity": 10
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let event: Value = response.json().await.expect("Failed to parse response");
    let event_id = event["id"].as_i64().expect("event id");

    let email = unique_email("guest");
    for (status, already) in [(201, false), (200, true)] {
        let response = client
            .post(format!("{}/events/{}/register", BASE_URL, event_id))
            .json(&json!({ "full_name": "Lea Santos", "email": email }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), status);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["already_registered"], already);
    }

    let response = client
        .get(format!("{}/events/upcoming", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let upcoming: Vec<Value> = response.json().await.expect("Failed to parse response");
    let listed = upcoming
        .iter()
        .find(|e| e["id"].as_i64() == Some(event_id))
        .expect("event listed");
    assert_eq!(listed["registered_count"], 1);
}

#[tokio::test]
#[ignore]
async fn test_promotion_bulk_deactivate() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let mut ids = Vec::new();
    for title in ["Night at the museum", "Free Sunday"] {
        let response = client
            .post(format!("{}/promotions", BASE_URL))
            .bearer_auth(&token)
            .json(&json!({ "title": title }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse response");
        ids.push(body["id"].as_i64().expect("promotion id"));
    }

    let response = client
        .post(format!("{}/promotions/bulk", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "ids": ids, "action": "deactivate" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["affected"], 2);
}
