//! API integration tests
//!
//! These run against a live server with a clean database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Seed a device type with `units` working devices, return its id
async fn seed_type(client: &Client, name: &str, rate: &str, deposit: &str, units: usize) -> i64 {
    let response = client
        .post(format!("{}/device-types", BASE_URL))
        .json(&json!({
            "name": name,
            "rental_rate": rate,
            "deposit": deposit
        }))
        .send()
        .await
        .expect("Failed to create device type");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let type_id = body["id"].as_i64().expect("No id in response");

    for _ in 0..units {
        let response = client
            .post(format!("{}/devices", BASE_URL))
            .json(&json!({ "device_type_id": type_id }))
            .send()
            .await
            .expect("Failed to create device");
        assert_eq!(response.status(), 201);
    }
    type_id
}

async fn availability(client: &Client, type_id: i64, start: &str, end: &str) -> (i64, i64) {
    let response = client
        .get(format!("{}/device-types/{}/availability", BASE_URL, type_id))
        .query(&[("start", start), ("end", end)])
        .send()
        .await
        .expect("Failed to query availability");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    (
        body["available"].as_i64().unwrap(),
        body["total"].as_i64().unwrap(),
    )
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
async fn test_availability_with_no_reservations() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera A", "20", "50", 3).await;

    let (available, total) =
        availability(&client, type_id, "2024-01-01T00:00:00Z", "2024-01-08T00:00:00Z").await;
    assert_eq!(available, 3);
    assert_eq!(total, 3);
}

#[tokio::test]
#[ignore]
async fn test_overlap_and_boundary_touch() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera B", "20", "50", 3).await;

    // book one unit for [Jan 3, Jan 5)
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "device_type_id": type_id,
            "start_at": "2024-01-03T00:00:00Z",
            "end_at": "2024-01-05T00:00:00Z",
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(response.status(), 201);

    // overlapping query sees one unit blocked
    let (available, _) =
        availability(&client, type_id, "2024-01-04T00:00:00Z", "2024-01-06T00:00:00Z").await;
    assert_eq!(available, 2);

    // boundary touch at Jan 5 does not block
    let (available, _) =
        availability(&client, type_id, "2024-01-05T00:00:00Z", "2024-01-06T00:00:00Z").await;
    assert_eq!(available, 3);
}

#[tokio::test]
#[ignore]
async fn test_checkout_rejects_over_quantity() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera C", "20", "50", 2).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "device_type_id": type_id,
            "start_at": "2024-02-01T00:00:00Z",
            "end_at": "2024-02-03T00:00:00Z",
            "quantity": 3
        }))
        .send()
        .await
        .expect("Failed to checkout");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["requested"], 3);
    assert_eq!(body["available"], 2);

    // nothing was partially reserved
    let (available, _) =
        availability(&client, type_id, "2024-02-01T00:00:00Z", "2024-02-03T00:00:00Z").await;
    assert_eq!(available, 2);
}

#[tokio::test]
#[ignore]
async fn test_quote_seven_day_checkout() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera D", "20", "50", 2).await;

    let response = client
        .post(format!("{}/reservations/quote", BASE_URL))
        .json(&json!({
            "device_type_id": type_id,
            "start_at": "2024-01-01T00:00:00Z",
            "end_at": "2024-01-08T00:00:00Z",
            "quantity": 2
        }))
        .send()
        .await
        .expect("Failed to quote");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["days"], 7);
    assert_eq!(body["device_rental_cost"], "280");
    assert_eq!(body["deposit"], "100");
    assert_eq!(body["total"], "380");
}

#[tokio::test]
#[ignore]
async fn test_racing_checkouts_never_oversell() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera E", "20", "50", 1).await;

    let request = json!({
        "device_type_id": type_id,
        "start_at": "2024-03-01T00:00:00Z",
        "end_at": "2024-03-05T00:00:00Z",
        "quantity": 1
    });

    let first = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&request)
        .send();
    let second = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&request)
        .send();

    let (first, second) = tokio::join!(first, second);
    let statuses = [
        first.expect("first checkout failed to send").status(),
        second.expect("second checkout failed to send").status(),
    ];

    let successes = statuses.iter().filter(|s| s.as_u16() == 201).count();
    let conflicts = statuses.iter().filter(|s| s.as_u16() == 409).count();
    assert_eq!(successes, 1, "exactly one racer may win, got {:?}", statuses);
    assert_eq!(conflicts, 1);

    let (available, _) =
        availability(&client, type_id, "2024-03-01T00:00:00Z", "2024-03-05T00:00:00Z").await;
    assert_eq!(available, 0);
}

#[tokio::test]
#[ignore]
async fn test_non_overlapping_windows_reuse_the_unit() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera F", "20", "50", 1).await;

    for (start, end) in [
        ("2024-04-01T00:00:00Z", "2024-04-03T00:00:00Z"),
        ("2024-04-03T00:00:00Z", "2024-04-05T00:00:00Z"),
    ] {
        let response = client
            .post(format!("{}/reservations", BASE_URL))
            .json(&json!({
                "device_type_id": type_id,
                "start_at": start,
                "end_at": end,
                "quantity": 1
            }))
            .send()
            .await
            .expect("Failed to checkout");
        assert_eq!(response.status(), 201, "back-to-back windows must both fit");
    }
}

#[tokio::test]
#[ignore]
async fn test_cancellation_frees_the_unit() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera G", "20", "50", 1).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "device_type_id": type_id,
            "start_at": "2024-05-01T00:00:00Z",
            "end_at": "2024-05-05T00:00:00Z",
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["reservation_ids"][0].as_i64().unwrap();

    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to cancel");
    assert!(response.status().is_success());

    let (available, _) =
        availability(&client, type_id, "2024-05-01T00:00:00Z", "2024-05-05T00:00:00Z").await;
    assert_eq!(available, 1);

    // cancelling twice is a conflict
    let response = client
        .post(format!("{}/reservations/{}/cancel", BASE_URL, reservation_id))
        .send()
        .await
        .expect("Failed to cancel");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_accessory_pool_is_not_oversold() {
    let client = Client::new();
    let type_id = seed_type(&client, "Camera H", "20", "50", 3).await;

    let response = client
        .post(format!("{}/accessories", BASE_URL))
        .json(&json!({ "name": "Tripod H", "rental_rate": "5", "total_quantity": 2 }))
        .send()
        .await
        .expect("Failed to create accessory");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let accessory_id = body["id"].as_i64().unwrap();

    let checkout = |quantity: i64| {
        json!({
            "device_type_id": type_id,
            "start_at": "2024-06-01T00:00:00Z",
            "end_at": "2024-06-05T00:00:00Z",
            "quantity": 1,
            "accessories": [{ "accessory_id": accessory_id, "quantity": quantity }]
        })
    };

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&checkout(2))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(response.status(), 201);

    // the pool is exhausted for the overlapping window
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&checkout(1))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_racing_checkouts_of_different_types_share_one_accessory_pool() {
    let client = Client::new();
    // two types, so the checkouts hold no device lock in common
    let type_a = seed_type(&client, "Camera I", "20", "50", 1).await;
    let type_b = seed_type(&client, "Light I", "10", "20", 1).await;

    let response = client
        .post(format!("{}/accessories", BASE_URL))
        .json(&json!({ "name": "Battery I", "rental_rate": "5", "total_quantity": 1 }))
        .send()
        .await
        .expect("Failed to create accessory");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let accessory_id = body["id"].as_i64().unwrap();

    let checkout = |type_id: i64| {
        json!({
            "device_type_id": type_id,
            "start_at": "2024-07-01T00:00:00Z",
            "end_at": "2024-07-05T00:00:00Z",
            "quantity": 1,
            "accessories": [{ "accessory_id": accessory_id, "quantity": 1 }]
        })
    };

    let first = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&checkout(type_a))
        .send();
    let second = client
        .post(format!("{}/reservations", BASE_URL))
        .json(&checkout(type_b))
        .send();

    let (first, second) = tokio::join!(first, second);
    let statuses = [
        first.expect("first checkout failed to send").status(),
        second.expect("second checkout failed to send").status(),
    ];

    let successes = statuses.iter().filter(|s| s.as_u16() == 201).count();
    let conflicts = statuses.iter().filter(|s| s.as_u16() == 409).count();
    assert_eq!(successes, 1, "only one draw fits the pool, got {:?}", statuses);
    assert_eq!(conflicts, 1);
}

#[tokio::test]
#[ignore]
async fn test_subscription_rollover_advances_dates() {
    let client = Client::new();

    let response = client
        .post(format!("{}/device-types", BASE_URL))
        .json(&json!({
            "name": "Router X",
            "rental_rate": "10",
            "deposit": "0",
            "has_subscription": true,
            "subscription_cost": "15"
        }))
        .send()
        .await
        .expect("Failed to create device type");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let type_id = body["id"].as_i64().unwrap();

    // billing date two months in the past
    let overdue = (chrono::Utc::now() - chrono::Duration::days(62)).to_rfc3339();
    let response = client
        .post(format!("{}/devices", BASE_URL))
        .json(&json!({ "device_type_id": type_id, "subscription_date": overdue }))
        .send()
        .await
        .expect("Failed to create device");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let device_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/subscriptions/rollover", BASE_URL))
        .send()
        .await
        .expect("Failed to roll over");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["updated"].as_u64().unwrap() >= 1);

    // the new billing date is strictly in the future
    let response = client
        .get(format!("{}/devices/{}", BASE_URL, device_id))
        .send()
        .await
        .expect("Failed to fetch device");
    let body: Value = response.json().await.expect("Failed to parse response");
    let next: chrono::DateTime<chrono::Utc> = body["subscription_date"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(next > chrono::Utc::now());

    // one Due payment per skipped cycle
    let response = client
        .get(format!("{}/devices/{}/payments", BASE_URL, device_id))
        .send()
        .await
        .expect("Failed to fetch payments");
    let payments: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(payments.len() >= 2);
    assert!(payments.iter().all(|p| p["status"] == 0));
}
