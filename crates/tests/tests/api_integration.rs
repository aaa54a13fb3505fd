use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use yatra_api::build_app;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_status_and_backend() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = response_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["storage_backend"], "memory");
    assert!(parsed["metrics"]["requests_total"].is_u64());
}

#[tokio::test]
async fn chat_on_empty_store_returns_apology_and_deity_prompt() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(json_request("POST", "/v1/chat", json!({ "message": "hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = response_json(response).await;
    assert!(parsed["reply"]
        .as_str()
        .unwrap()
        .starts_with("I could not find temples"));
    assert_eq!(parsed["suggested_destinations"], json!([]));
    assert_eq!(
        parsed["next_question"],
        "Which deity would you like to center your yatra around?"
    );
}

#[tokio::test]
async fn chat_validates_message_length() {
    let app = build_app().await.expect("app should build");

    let empty = app
        .clone()
        .oneshot(json_request("POST", "/v1/chat", json!({ "message": "" })))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let oversized = app
        .oneshot(json_request(
            "POST",
            "/v1/chat",
            json!({ "message": "om ".repeat(700) }),
        ))
        .await
        .unwrap();
    assert_eq!(oversized.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn destination_create_rejects_empty_required_fields() {
    let app = build_app().await.expect("app should build");

    let all_empty = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/destinations",
            json!({ "name": "", "city": "", "state": "", "deity": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(all_empty.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let all_empty = response_json(all_empty).await;
    assert_eq!(all_empty["detail"], "name must not be empty");

    let blank_deity = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/destinations",
            json!({
                "name": "Kashi Vishwanath",
                "city": "Varanasi",
                "state": "Uttar Pradesh",
                "deity": "   "
            }),
        ))
        .await
        .unwrap();
    assert_eq!(blank_deity.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let blank_deity = response_json(blank_deity).await;
    assert_eq!(blank_deity["detail"], "deity must not be empty");

    let listed = app
        .oneshot(
            Request::builder()
                .uri("/v1/destinations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = response_json(listed).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn destination_admin_flow_and_filtered_chat() {
    let app = build_app().await.expect("app should build");

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/destinations",
            json!({
                "name": "Kashi Vishwanath",
                "city": "Varanasi",
                "state": "Uttar Pradesh",
                "deity": "Shiva",
                "description": "Jyotirlinga on the banks of the Ganga"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = response_json(created).await;
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);

    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/destinations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = response_json(listed).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let fetched = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/v1/destinations/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);

    let missing = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/destinations/9999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let missing = response_json(missing).await;
    assert_eq!(missing["detail"], "Destination not found");

    let chat = app
        .oneshot(json_request(
            "POST",
            "/v1/chat",
            json!({ "message": "I want to visit a Shiva temple near Varanasi with my family" }),
        ))
        .await
        .unwrap();
    assert_eq!(chat.status(), StatusCode::OK);
    let chat = response_json(chat).await;

    let reply = chat["reply"].as_str().unwrap();
    assert!(reply.starts_with("Blessings! I found options aligned with your devotion to Shiva. "));
    assert!(reply.contains("Varanasi"));
    assert!(reply.contains("family travel preference"));
    assert_eq!(
        chat["suggested_destinations"][0]["name"],
        "Kashi Vishwanath"
    );
    assert_eq!(
        chat["next_question"],
        "Would you like me to suggest an itinerary and nearby temples as your next step?"
    );
}
