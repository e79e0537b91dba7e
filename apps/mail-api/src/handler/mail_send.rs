//! # メール送信ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /v3/mail/send` - SendGrid v3 互換のメール送信
//!
//! ## チェック順
//!
//! 1. メソッド（POST 以外は 405、ルーティングで判定）
//! 2. `Authorization: Bearer <api key>`（401）
//! 3. `Content-Type: application/json`（415）
//! 4. ボディサイズ（413）
//! 5. ボディの解析・検証・送信（[`SendMailUseCase`]）

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
};
use sendgrid_dev_domain::ValidationError;
use subtle::ConstantTimeEq;

use crate::{error::SendMailError, usecase::SendMailUseCase};

/// 受け付ける唯一のメディアタイプ
const APPLICATION_JSON: &str = "application/json";

/// メール送信ハンドラの共有状態
pub struct MailSendState {
    pub usecase: SendMailUseCase,
    /// `Bearer ` の後に期待する API キー
    pub api_key: String,
}

/// POST /v3/mail/send
///
/// 成功時は 202 をボディなしで返す。
/// ボディの読み込み失敗はヘッダーのチェック後に判定する。
pub async fn send_mail(
    State(state): State<Arc<MailSendState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, SendMailError> {
    authorize(&headers, &state.api_key)?;
    require_json(&headers)?;
    let body = body.map_err(body_error)?;

    let outcome = state.usecase.execute(&body).await?;
    tracing::debug!(messages = outcome.messages, "送信リクエストを受理");

    Ok(StatusCode::ACCEPTED)
}

/// `/v3/mail/send` への POST 以外のメソッド
pub async fn method_not_allowed() -> SendMailError {
    SendMailError::MethodNotAllowed
}

/// 未定義のパス
pub async fn not_found() -> SendMailError {
    SendMailError::NotFound
}

/// `Authorization` ヘッダーを定数時間で比較する
///
/// 前後の空白は無視する。API キーが空なら `Bearer` のみで一致する。
fn authorize(headers: &HeaderMap, api_key: &str) -> Result<(), SendMailError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim();
    let expected = format!("Bearer {api_key}");

    let is_valid: bool = provided
        .as_bytes()
        .ct_eq(expected.trim().as_bytes())
        .into();
    if is_valid {
        Ok(())
    } else {
        Err(SendMailError::Unauthorized)
    }
}

fn body_error(rejection: BytesRejection) -> SendMailError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SendMailError::PayloadTooLarge
    } else {
        tracing::debug!(error.message = %rejection, "リクエストボディの読み込みに失敗");
        SendMailError::Rejected(ValidationError::bad_request())
    }
}

/// メディアタイプが `application/json` であること
///
/// `; charset=utf-8` などのパラメータと大文字小文字は無視する。
fn require_json(headers: &HeaderMap) -> Result<(), SendMailError> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .unwrap_or_default();

    if media_type.eq_ignore_ascii_case(APPLICATION_JSON) {
        Ok(())
    } else {
        Err(SendMailError::UnsupportedMediaType)
    }
}
