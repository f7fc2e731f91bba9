use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use explore_api::{app, AppState};
use explore_assistant::{AssistantError, ChatBackend, ChatMessage, ReplyChunk, ReplyStream, APOLOGY};
use explore_order::{MockPaymentGateway, PaymentOrchestrator};
use explore_store::{AppConfig, Store};
use futures_util::stream;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Answers every question with two fixed chunks.
struct CannedBackend;

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn stream_reply(
        &self,
        _system_instruction: &str,
        _history: &[ChatMessage],
    ) -> Result<ReplyStream, AssistantError> {
        let chunks = vec![
            Ok(ReplyChunk { text: "Try the ".to_string(), sources: vec![] }),
            Ok(ReplyChunk { text: "Hunza plan.".to_string(), sources: vec![] }),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

struct Offline;

#[async_trait]
impl ChatBackend for Offline {
    async fn stream_reply(&self, _: &str, _: &[ChatMessage]) -> Result<ReplyStream, AssistantError> {
        Err(AssistantError::Config("no key".to_string()))
    }
}

fn test_app_with(backend: Arc<dyn ChatBackend>) -> (Router, Arc<Store>) {
    let config = AppConfig::default();
    let store = Arc::new(Store::default());
    let payments = PaymentOrchestrator::new(Arc::new(MockPaymentGateway::instant()), "usd");
    let state = AppState::new(&config, store.clone(), payments, backend);
    (app(state), store)
}

fn test_app() -> (Router, Arc<Store>) {
    test_app_with(Arc::new(CannedBackend))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn customer_token(app: &Router) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "identifier": "user@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/v1/admin/login",
        None,
        Some(json!({ "email": "admin@exploregb.pk", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_public_catalog() {
    let (app, _) = test_app();

    let (status, tours) = call(&app, Method::GET, "/v1/tours", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tours.as_array().unwrap().len(), 2);

    let (_, luxury) = call(&app, Method::GET, "/v1/tours?categories=Luxury", None, None).await;
    assert_eq!(luxury.as_array().unwrap().len(), 1);
    assert_eq!(luxury[0]["slug"], "hunza-luxury-7");

    let (status, _) = call(&app, Method::GET, "/v1/tours?categories=Budget", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, detail) = call(&app, Method::GET, "/v1/tours/hunza-luxury-7", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tour"]["id"], 1);
    assert_eq!(detail["destination"]["name"], "Hunza");
    assert!(!detail["reviews"].as_array().unwrap().is_empty());

    let (status, _) = call(&app, Method::GET, "/v1/tours/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, quote) = call(&app, Method::GET, "/v1/tours/hunza-luxury-7/quote?seats=3", None, None).await;
    assert_eq!(quote["total"], 2850.0);

    let (_, destination) = call(&app, Method::GET, "/v1/destinations/1", None, None).await;
    assert_eq!(destination["tours"].as_array().unwrap().len(), 1);

    let (_, hero) = call(&app, Method::GET, "/v1/hero-media?section=hero", None, None).await;
    assert_eq!(hero.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_identify_unknown_account() {
    let (app, _) = test_app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/auth/identify",
        None,
        Some(json!({ "identifier": "new@traveler.pk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
    assert_eq!(body["next"], "signup");

    let (_, known) = call(
        &app,
        Method::POST,
        "/v1/auth/identify",
        None,
        Some(json!({ "identifier": "03001234567" })),
    )
    .await;
    assert_eq!(known["next"], "password");

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/auth/identify",
        None,
        Some(json!({ "identifier": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_the_right_role() {
    let (app, _) = test_app();

    let (status, _) = call(&app, Method::GET, "/v1/admin/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/v1/admin/bookings", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = customer_token(&app).await;
    let (status, _) = call(&app, Method::GET, "/v1/admin/bookings", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&app).await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/checkout",
        Some(&admin),
        Some(json!({ "tour_id": 1, "seats": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/admin/login",
        None,
        Some(json!({ "email": "admin@exploregb.pk", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_checkout_and_booking_flow() {
    let (app, store) = test_app();

    let (status, signup) = call(
        &app,
        Method::POST,
        "/v1/auth/signup",
        None,
        Some(json!({ "identifier": "03331112222", "name": "Zara", "password": "mountains" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(signup["name"], "Zara");
    assert!(store.check_user_exists("03331112222").await);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/auth/login",
        None,
        Some(json!({ "identifier": "03331112222", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = signup["token"].as_str().unwrap().to_string();

    let (status, session) = call(
        &app,
        Method::POST,
        "/v1/checkout",
        Some(&token),
        Some(json!({ "tour_id": 1, "seats": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["customer"], "Zara");
    assert_eq!(session["state"]["state"], "reviewing_order");
    assert_eq!(session["state"]["total"], 1900.0);
    let id = session["id"].as_str().unwrap().to_string();

    // Confirming before an intent exists is out of order.
    let card = json!({
        "card_number": "4242 4242 4242 4242",
        "expiry": "12/30",
        "cvc": "123",
        "name": "Zara"
    });
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/checkout/{}/confirm", id),
        Some(&token),
        Some(card.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, session) =
        call(&app, Method::POST, &format!("/v1/checkout/{}/intent", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"]["state"], "awaiting_card_confirmation");
    assert_eq!(session["state"]["intent"]["amount"], 1900.0);

    let (status, session) = call(
        &app,
        Method::POST,
        &format!("/v1/checkout/{}/confirm", id),
        Some(&token),
        Some(card),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"]["state"], "booked");
    let reference = session["state"]["reference"].as_str().unwrap();
    assert!(reference.starts_with("TX_"));

    // Another customer cannot see the session.
    let other = customer_token(&app).await;
    let (status, _) =
        call(&app, Method::GET, &format!("/v1/checkout/{}", id), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let admin = admin_token(&app).await;
    let (_, bookings) = call(&app, Method::GET, "/v1/admin/bookings", Some(&admin), None).await;
    let newest = &bookings[0];
    assert_eq!(newest["tour_id"], 1);
    assert_eq!(newest["seats"], 2);
    assert_eq!(newest["total_amount"], 1900.0);
    assert_eq!(newest["status"], "confirmed");
}

#[tokio::test]
async fn test_short_card_number_fails_checkout() {
    let (app, store) = test_app();
    let token = customer_token(&app).await;
    let before = store.bookings().await.len();

    let (_, session) = call(
        &app,
        Method::POST,
        "/v1/checkout",
        Some(&token),
        Some(json!({ "tour_id": 2, "seats": 1 })),
    )
    .await;
    let id = session["id"].as_str().unwrap().to_string();
    call(&app, Method::POST, &format!("/v1/checkout/{}/intent", id), Some(&token), None).await;

    let (status, session) = call(
        &app,
        Method::POST,
        &format!("/v1/checkout/{}/confirm", id),
        Some(&token),
        Some(json!({ "card_number": "4242", "expiry": "12/30", "cvc": "123", "name": "J" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["state"]["state"], "failed");
    assert_eq!(store.bookings().await.len(), before);
}

#[tokio::test]
async fn test_review_posting_uses_token_name() {
    let (app, _) = test_app();
    let token = customer_token(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/tours/hunza-luxury-7/reviews",
        None,
        Some(json!({ "rating": 5.0, "comment": "Stunning" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, review) = call(
        &app,
        Method::POST,
        "/v1/tours/hunza-luxury-7/reviews",
        Some(&token),
        Some(json!({ "rating": 5.0, "comment": "Stunning" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["user_name"], "John Doe");
    assert_eq!(review["tour_id"], 1);
}

#[tokio::test]
async fn test_admin_tour_crud() {
    let (app, store) = test_app();
    let admin = admin_token(&app).await;
    let mut events = store.subscribe();

    let (status, tour) = call(
        &app,
        Method::POST,
        "/v1/admin/tours",
        Some(&admin),
        Some(json!({
            "destination_id": 2,
            "title": "Deosai Camping",
            "price": 400.0,
            "duration_days": 3,
            "start_date": "2024-08-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tour["slug"], "deosai-camping");
    assert_eq!(tour["location"], "Skardu");
    let id = tour["id"].as_u64().unwrap();
    assert_eq!(events.recv().await.unwrap().kind(), "tour.created");

    let (_, rows) = call(&app, Method::GET, "/v1/admin/tours", Some(&admin), None).await;
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["availability"]["available"], 20);
    assert_eq!(rows[0]["seats_taken"], 0);
    assert_eq!(rows[0]["sold_out"], false);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/v1/admin/tours/{}", id),
        Some(&admin),
        Some(json!({ "price": 450.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 450.0);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/admin/tours",
        Some(&admin),
        Some(json!({
            "destination_id": 99,
            "title": "Nowhere",
            "price": 1.0,
            "duration_days": 1,
            "start_date": "2024-08-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        call(&app, Method::DELETE, &format!("/v1/admin/tours/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) =
        call(&app, Method::DELETE, &format!("/v1/admin/tours/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_destination_management() {
    let (app, store) = test_app();
    let admin = admin_token(&app).await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/admin/destinations",
        Some(&admin),
        Some(json!({
            "name": "Astore",
            "description": "Gateway to Nanga Parbat",
            "image": "https://cdn.exploregb.pk/astore.jpg",
            "services": ["Jeep hire"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Astore");
    assert_eq!(created["gallery"], json!([]));
    let id = created["id"].as_u64().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/admin/destinations",
        Some(&admin),
        Some(json!({ "name": "Astore", "description": "No cover" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, patched) = call(
        &app,
        Method::PATCH,
        &format!("/v1/admin/destinations/{}", id),
        Some(&admin),
        Some(json!({
            "gallery": [{ "url": "https://cdn.exploregb.pk/rama.mp4", "type": "video" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["gallery"][0]["type"], "video");
    assert_eq!(patched["services"], json!(["Jeep hire"]));
    assert_eq!(store.destination(id).await.unwrap().gallery.len(), 1);

    let (status, _) = call(
        &app,
        Method::PATCH,
        &format!("/v1/admin/destinations/{}", id),
        Some(&admin),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/v1/admin/destinations/999",
        Some(&admin),
        Some(json!({ "description": "Missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let customer = customer_token(&app).await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/admin/destinations",
        Some(&customer),
        Some(json!({ "name": "Astore", "description": "", "image": "x.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_hero_media_management() {
    let (app, _) = test_app();
    let admin = admin_token(&app).await;

    let (status, media) = call(
        &app,
        Method::PUT,
        "/v1/admin/hero-media",
        Some(&admin),
        Some(json!([
            { "url": "https://cdn.exploregb.pk/attabad.jpg", "type": "image", "section": "hero" },
            { "url": "https://cdn.exploregb.pk/khunjerab.mp4", "type": "video", "section": "about" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let media = media.as_array().unwrap().clone();
    assert_eq!(media.len(), 2);
    assert!(media.iter().all(|m| m["id"].as_u64().unwrap() > 0));

    let (_, hero) = call(&app, Method::GET, "/v1/hero-media?section=hero", None, None).await;
    assert_eq!(hero.as_array().unwrap().len(), 1);
    assert_eq!(hero[0]["url"], "https://cdn.exploregb.pk/attabad.jpg");

    let (status, _) = call(
        &app,
        Method::PUT,
        "/v1/admin/hero-media",
        Some(&admin),
        Some(json!([
            { "id": 18446744073709551615u64, "url": "https://cdn.exploregb.pk/x.jpg", "type": "image", "section": "hero" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, listed) = call(&app, Method::GET, "/v1/admin/hero-media", Some(&admin), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let id = media[0]["id"].as_u64().unwrap();
    let (status, _) =
        call(&app, Method::DELETE, &format!("/v1/admin/hero-media/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) =
        call(&app, Method::DELETE, &format!("/v1/admin/hero-media/{}", id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = call(&app, Method::GET, "/v1/admin/hero-media", Some(&admin), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_inquiry_lifecycle() {
    let (app, _) = test_app();

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/inquiries",
        None,
        Some(json!({ "user_name": "Ali", "email": "bad", "destination": "Hunza" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, inquiry) = call(
        &app,
        Method::POST,
        "/v1/inquiries",
        None,
        Some(json!({
            "user_name": "Ali",
            "email": "ali@example.com",
            "destination": "Hunza",
            "notes": "Family trip in June"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(inquiry["status"], "new");
    let id = inquiry["id"].as_u64().unwrap();

    let admin = admin_token(&app).await;
    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/v1/admin/inquiries/{}", id),
        Some(&admin),
        Some(json!({ "status": "responded" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "responded");
}

#[tokio::test]
async fn test_assistant_conversation() {
    let (app, _) = test_app();
    let token = customer_token(&app).await;

    let (status, chat) = call(&app, Method::POST, "/v1/assistant/sessions", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chat["messages"].as_array().unwrap().len(), 1);
    assert_eq!(chat["suggestions"].as_array().unwrap().len(), 4);
    let id = chat["id"].as_str().unwrap().to_string();

    let (status, reply) = call(
        &app,
        Method::POST,
        &format!("/v1/assistant/sessions/{}/messages", id),
        Some(&token),
        Some(json!({ "text": "Which tour for a family?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["reply"]["text"], "Try the Hunza plan.");
    assert_eq!(reply["messages"].as_array().unwrap().len(), 3);
    assert!(reply["suggestions"].as_array().unwrap().is_empty());

    let (_, blank) = call(
        &app,
        Method::POST,
        &format!("/v1/assistant/sessions/{}/messages", id),
        Some(&token),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert!(blank["reply"].is_null());
}

#[tokio::test]
async fn test_assistant_failure_becomes_apology() {
    let (app, _) = test_app_with(Arc::new(Offline));
    let token = customer_token(&app).await;

    let (_, chat) = call(&app, Method::POST, "/v1/assistant/sessions", Some(&token), None).await;
    let id = chat["id"].as_str().unwrap().to_string();

    let (status, reply) = call(
        &app,
        Method::POST,
        &format!("/v1/assistant/sessions/{}/messages", id),
        Some(&token),
        Some(json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["reply"]["text"], APOLOGY);
}
