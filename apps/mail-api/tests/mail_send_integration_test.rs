//! メール送信 API 統合テスト
//!
//! `build_app` で構築したルーターに `oneshot` でリクエストを送り、
//! SMTP の代わりに `MockMailTransport` で送信内容を検証する。
//!
//! ## テストケース
//!
//! - `{}` は Bad Request
//! - personalizations が無ければ 400（field: personalizations）
//! - 2 件の personalization は 2 通に展開され 202
//! - 添付が base64 でなければ 400（field: attachments.0.content）
//! - text/plain の重複は 400（field: content, help: null）
//! - メソッド・Authorization・Content-Type のチェック順
//! - 上限を超えるボディは 413
//! - 送信失敗は 502
//! - 未定義パスは 404、/health、X-Request-Id

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use pretty_assertions::assert_eq;
use sendgrid_dev_api::{
    app_builder::{MAX_BODY_BYTES, build_app},
    config::MailApiConfig,
};
use sendgrid_dev_domain::mail::{Disposition, Recipient};
use sendgrid_dev_infra::mock::MockMailTransport;
use serde_json::{Value, json};
use tower::ServiceExt;

const API_KEY: &str = "SG.xxxxx";

fn test_config(extra: &[(&str, &str)]) -> MailApiConfig {
    let mut vars = vec![("SENDGRID_DEV_APIKEY", API_KEY)];
    vars.extend_from_slice(extra);
    MailApiConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    })
    .unwrap()
}

fn test_app(transport: &MockMailTransport) -> Router {
    build_app(&test_config(&[]), Arc::new(transport.clone()))
}

fn send_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/v3/mail/send")
        .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> Value {
    json!({
        "personalizations": [
            {"to": [{"email": "a1@example.com", "name": "A1"}, {"email": "a2@example.com"}]},
            {"to": [{"email": "b1@example.com"}, {"email": "b2@example.com"}]}
        ],
        "from": {"email": "sender@example.com", "name": "Sender"},
        "subject": "Hello",
        "content": [
            {"type": "text/plain", "value": "Hi"},
            {"type": "text/html", "value": "<p>Hi</p>"}
        ]
    })
}

async fn into_parts(response: axum::response::Response) -> (StatusCode, Option<String>, Vec<u8>) {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

fn single_error(message: &str, field: Option<&str>, help: Option<&str>) -> Value {
    json!({"errors": [{"message": message, "field": field, "help": help}]})
}

// ===== リクエスト内容 =====

#[tokio::test]
async fn test_空オブジェクトはbad_request() {
    let transport = MockMailTransport::new();

    let response = test_app(&transport)
        .oneshot(send_request(&json!({})))
        .await
        .unwrap();

    let (status, content_type, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"{"errors":[{"message":"Bad Request","field":null,"help":null}]}"#
    );
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_jsonでないボディはbad_request() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v3/mail/send")
        .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, single_error("Bad Request", None, None));
}

#[tokio::test]
async fn test_personalizationsが無ければ400() {
    let transport = MockMailTransport::new();
    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("personalizations");

    let response = test_app(&transport).oneshot(send_request(&body)).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        single_error(
            "The personalizations field is required and must have at least one personalization.",
            Some("personalizations"),
            Some("http://sendgrid.com/docs/API_Reference/Web_API_v3/Mail/errors.html#-Personalizations-Errors"),
        )
    );
}

#[tokio::test]
async fn test_personalizationごとに1通ずつ送信され202を返す() {
    let transport = MockMailTransport::new();

    let response = test_app(&transport)
        .oneshot(send_request(&valid_body()))
        .await
        .unwrap();

    let (status, content_type, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(content_type, None);
    assert!(body.is_empty());

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(
        delivered[0].to,
        vec![
            Recipient::new("a1@example.com", "A1"),
            Recipient::address("a2@example.com"),
        ]
    );
    assert_eq!(delivered[1].recipient_count(), 2);
    assert_eq!(delivered[1].to[0].email, "b1@example.com");
    for message in &delivered {
        assert_eq!(message.from, Recipient::new("sender@example.com", "Sender"));
        assert_eq!(message.subject, "Hello");
        assert_eq!(message.text_body.as_deref(), Some("Hi"));
        assert_eq!(message.html_body.as_deref(), Some("<p>Hi</p>"));
    }
}

#[tokio::test]
async fn test_charset付きのcontent_typeも受け付ける() {
    let transport = MockMailTransport::new();
    let mut request = send_request(&valid_body());
    request.headers_mut().insert(
        header::CONTENT_TYPE,
        "application/json; charset=utf-8".parse().unwrap(),
    );

    let response = test_app(&transport).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_base64でない添付は400で送信しない() {
    let transport = MockMailTransport::new();
    let mut body = valid_body();
    body["attachments"] = json!([{"content": "NOT_BASE64", "filename": "a.txt"}]);

    let response = test_app(&transport).oneshot(send_request(&body)).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        single_error(
            "The attachment content must be base64 encoded.",
            Some("attachments.0.content"),
            Some("http://sendgrid.com/docs/API_Reference/Web_API_v3/Mail/errors.html#message.attachments.content"),
        )
    );
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_添付は全メッセージに同じ内容で付く() {
    let transport = MockMailTransport::new();
    let mut body = valid_body();
    body["attachments"] = json!([
        {"content": STANDARD.encode(b"report"), "type": "text/plain", "filename": "report.txt"},
        {"content": STANDARD.encode(b"logo"), "type": "image/png", "filename": "logo.png", "disposition": "inline", "content_id": "logo"}
    ]);

    let response = test_app(&transport).oneshot(send_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 2);
    for message in &delivered {
        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[0].data.as_ref(), b"report");
        assert_eq!(message.attachments[0].disposition, Disposition::Attachment);
        assert_eq!(message.attachments[1].disposition, Disposition::Inline);
        assert_eq!(message.attachments[1].content_id.as_deref(), Some("logo"));
    }
}

#[tokio::test]
async fn test_同じmimeタイプのcontentが重複すると400() {
    let transport = MockMailTransport::new();
    let mut body = valid_body();
    body["content"] = json!([
        {"type": "text/plain", "value": "first"},
        {"type": "text/plain", "value": "second"}
    ]);

    let response = test_app(&transport).oneshot(send_request(&body)).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["errors"][0]["field"], "content");
    assert_eq!(body["errors"][0]["help"], Value::Null);
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_strict_contentを無効にすると重複を許可する() {
    let transport = MockMailTransport::new();
    let app = build_app(
        &test_config(&[("SENDGRID_DEV_STRICT_CONTENT", "false")]),
        Arc::new(transport.clone()),
    );
    let mut body = valid_body();
    body["content"] = json!([
        {"type": "text/plain", "value": "first"},
        {"type": "text/plain", "value": "second"}
    ]);

    let response = app.oneshot(send_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(transport.delivered()[0].text_body.as_deref(), Some("second"));
}

// ===== ヘッダー・メソッド =====

#[tokio::test]
async fn test_post以外のメソッドは405() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/v3/mail/send")
        .body(Body::empty())
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, content_type, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, single_error("POST method allowed only", None, None));
}

#[tokio::test]
async fn test_apiキーが一致しなければ401() {
    let transport = MockMailTransport::new();
    let mut request = send_request(&valid_body());
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer SG.wrong".parse().unwrap());

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        single_error(
            "The provided authorization grant is invalid, expired, or revoked",
            None,
            None
        )
    );
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_認証はcontent_typeより先に判定する() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v3/mail/send")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("{}"))
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_content_typeがjsonでなければ415() {
    let transport = MockMailTransport::new();
    let mut request = send_request(&valid_body());
    request
        .headers_mut()
        .insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        single_error("Content-Type should be application/json.", None, None)
    );
}

#[tokio::test]
async fn test_上限を超えるボディは413() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v3/mail/send")
        .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, single_error("Payload Too Large", None, None));
}

#[tokio::test]
async fn test_上限超過でも認証を先に判定する() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v3/mail/send")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ===== 送信失敗・その他 =====

#[tokio::test]
async fn test_送信失敗は502で送信済みのメッセージは残る() {
    let transport = MockMailTransport::failing_after(1);

    let response = test_app(&transport)
        .oneshot(send_request(&valid_body()))
        .await
        .unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        single_error("Failed to relay the message to the SMTP server.", None, None)
    );
    assert_eq!(transport.delivered().len(), 1);
}

#[tokio::test]
async fn test_未定義のパスは404() {
    let transport = MockMailTransport::new();
    let request = Request::builder()
        .uri("/v3/unknown")
        .body(Body::empty())
        .unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"{"errors":[{"message":"not found","field":null,"help":null}]}"#
    );
}

#[tokio::test]
async fn test_healthはバージョンを返す() {
    let transport = MockMailTransport::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = test_app(&transport).oneshot(request).await.unwrap();

    let (status, _, body) = into_parts(response).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({"status": "healthy", "version": env!("CARGO_PKG_VERSION")})
    );
}

#[tokio::test]
async fn test_レスポンスにuuid_v7のx_request_idが付く() {
    let transport = MockMailTransport::new();

    let response = test_app(&transport)
        .oneshot(send_request(&valid_body()))
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap();
    let uuid = uuid::Uuid::parse_str(request_id).unwrap();
    assert_eq!(uuid.get_version(), Some(uuid::Version::SortRand));
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
    let transport = MockMailTransport::new();
    let mut request = send_request(&valid_body());
    request
        .headers_mut()
        .insert("x-request-id", "client-request-1".parse().unwrap());

    let response = test_app(&transport).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "client-request-1"
    );
}
