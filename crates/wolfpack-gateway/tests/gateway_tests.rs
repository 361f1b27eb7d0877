// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests: requests go through auth, handlers, and the pack.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use wolfpack_config::model::CompatibilityRuleConfig;
use wolfpack_core::types::{Coordinates, Gender, InteractionKind};
use wolfpack_gateway::{GatewayState, build_router};
use wolfpack_test_utils::TestHarness;
use wolfpack_test_utils::harness::VENUE_ID;

fn router(h: &TestHarness) -> Router {
    build_router(
        GatewayState::new(h.pack.clone(), Duration::from_secs(5)),
        64,
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn at(coords: Coordinates) -> Value {
    json!({ "latitude": coords.latitude, "longitude": coords.longitude })
}

async fn admit(app: &Router, h: &TestHarness, user: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/v1/locations/{VENUE_ID}/admit"),
        Some(&h.token(user)),
        Some(at(h.venue())),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_a_known_bearer_token() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);

    let (status, _) = send(&app, "GET", "/v1/locations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/v1/locations", Some("nope"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/v1/locations", Some(&h.token("alice")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], VENUE_ID);
}

#[tokio::test]
async fn admission_maps_geofence_and_lookup_errors() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    let token = h.token("alice");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/locations/{VENUE_ID}/admit"),
        Some(&token),
        Some(at(h.north_of_venue(101.0))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "out_of_range");
    assert!(body["distance_meters"].as_f64().unwrap() > 100.0);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/locations/nowhere/admit",
        Some(&token),
        Some(at(h.venue())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "location_not_found");

    // Coordinates off the globe are simply outside every venue.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/locations/{VENUE_ID}/admit"),
        Some(&token),
        Some(json!({ "latitude": 91.0, "longitude": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "out_of_range");
    assert!(body.get("distance_meters").is_none());

    let first = admit(&app, &h, "alice").await;
    let again = admit(&app, &h, "alice").await;
    assert_eq!(first, again);
}

#[tokio::test]
async fn session_lifecycle_is_owner_scoped() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    let session_id = admit(&app, &h, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/sessions/{session_id}/heartbeat"),
        Some(&h.token("bob")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/sessions/{session_id}/heartbeat"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/v1/sessions/{session_id}/profile"),
        Some(&h.token("alice")),
        Some(json!({ "vibe": "dancing", "table_label": "T4" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["vibe"], "dancing");
    assert_eq!(body["version"], 2);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/sessions/{session_id}/position"),
        Some(&h.token("alice")),
        Some(json!({ "x": 0.25, "y": 0.75 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"]["y"], 0.75);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/sessions/{session_id}/leave"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/sessions/{session_id}/heartbeat"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/v1/sessions/{session_id}"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "left");
}

#[tokio::test]
async fn access_check_reports_denials_without_acting() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    let uri = format!("/v1/locations/{VENUE_ID}/access");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&h.token("carol")),
        Some(json!({ "action": "order" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "not_a_member");

    admit(&app, &h, "carol").await;
    let (_, body) = send(
        &app,
        "POST",
        &uri,
        Some(&h.token("carol")),
        Some(json!({ "action": "order", "item_ids": ["ipa"] })),
    )
    .await;
    assert_eq!(body["allowed"], true);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&h.token("carol")),
        Some(json!({ "action": "interact" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn interactions_reach_the_receiver_inbox() {
    let h = TestHarness::builder()
        .with_rule(CompatibilityRuleConfig {
            sender: Some(Gender::Male),
            receiver: Some(Gender::Male),
            kinds: vec![InteractionKind::Wink],
            allow: false,
        })
        .build()
        .await
        .unwrap();
    let app = router(&h);
    for user in ["alice", "bob", "carol"] {
        admit(&app, &h, user).await;
    }
    let uri = format!("/v1/locations/{VENUE_ID}/interactions");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&h.token("alice")),
        Some(json!({ "receiver_id": "bob", "kind": "wink" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "incompatible_interaction");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&h.token("alice")),
        Some(json!({ "receiver_id": "carol", "kind": "wink" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = body["id"].as_str().unwrap().to_string();

    let (_, inbox) = send(&app, "GET", "/v1/inbox", Some(&h.token("carol")), None).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["sender_id"], "alice");

    let read_uri = format!("/v1/interactions/{event_id}/read");
    let (status, _) = send(&app, "POST", &read_uri, Some(&h.token("bob")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", &read_uri, Some(&h.token("carol")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "read");

    let (_, inbox) = send(&app, "GET", "/v1/inbox", Some(&h.token("carol")), None).await;
    assert!(inbox.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_broadcast_and_moderation() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    admit(&app, &h, "alice").await;
    admit(&app, &h, "bob").await;
    let messages = format!("/v1/locations/{VENUE_ID}/messages");

    let (status, _) = send(
        &app,
        "POST",
        &messages,
        Some(&h.token("alice")),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, first) = send(
        &app,
        "POST",
        &messages,
        Some(&h.token("alice")),
        Some(json!({ "content": "who's here?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // Both admissions were announced on the location scope first.
    assert_eq!(first["seq"], 3);
    let message_id = first["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/locations/{VENUE_ID}/broadcasts"),
        Some(&h.token("alice")),
        Some(json!({ "content": "free shots" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "insufficient_role");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/locations/{VENUE_ID}/broadcasts"),
        Some(&h.token("dj")),
        Some(json!({ "content": "last call" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "broadcast");
    assert_eq!(body["seq"], 4);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/messages/{message_id}/delete"),
        Some(&h.token("bob")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/messages/{message_id}/flag"),
        Some(&h.token("bob")),
        Some(json!({ "reason": "spam" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flagged"], true);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/messages/{message_id}/delete"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, listed) = send(&app, "GET", &messages, Some(&h.token("bob")), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["content"], "last call");

    let (status, body) = send(&app, "GET", &messages, Some(&h.token("carol")), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "not_a_member");
}

#[tokio::test]
async fn events_endpoint_replays_after_a_sequence() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    admit(&app, &h, "alice").await;

    for n in 1..=4 {
        send(
            &app,
            "POST",
            &format!("/v1/locations/{VENUE_ID}/messages"),
            Some(&h.token("alice")),
            Some(json!({ "content": format!("msg {n}"), "room": "patio" })),
        )
        .await;
    }

    let (status, events) = send(
        &app,
        "GET",
        &format!("/v1/locations/{VENUE_ID}/events?room=patio&after_seq=2&limit=10"),
        Some(&h.token("alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seqs: Vec<i64> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, vec![3, 4]);
    assert_eq!(events[0]["payload"]["type"], "chat");
    assert_eq!(events[0]["scope"]["room"], "patio");
}

#[tokio::test]
async fn votes_are_tallied_per_poll() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    for user in ["alice", "bob", "carol"] {
        admit(&app, &h, user).await;
    }
    let uri = format!("/v1/locations/{VENUE_ID}/polls/next-song/votes");
    for (user, option) in [("alice", "disco"), ("bob", "house"), ("carol", "disco")] {
        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(&h.token(user)),
            Some(json!({ "option": option })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    // Changing a vote replaces it.
    send(
        &app,
        "POST",
        &uri,
        Some(&h.token("bob")),
        Some(json!({ "option": "disco" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/v1/polls/next-song", Some(&h.token("dj")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["option"], "disco");
    assert_eq!(body["results"][0]["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn presence_listing_drops_expired_members() {
    let h = TestHarness::new().await.unwrap();
    let app = router(&h);
    admit(&app, &h, "alice").await;
    admit(&app, &h, "carol").await;
    let uri = format!("/v1/locations/{VENUE_ID}/presence");

    let (_, listed) = send(&app, "GET", &uri, Some(&h.token("barkeep")), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    h.advance(chrono::Duration::minutes(61));
    h.pack.reaper().sweep_once().await.unwrap();

    let (status, listed) = send(&app, "GET", &uri, Some(&h.token("barkeep")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}
