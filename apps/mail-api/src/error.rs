//! # メール API エラー定義
//!
//! API 固有のエラーと、SendGrid 互換のエラーエンベロープへの変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sendgrid_dev_domain::ValidationError;
use sendgrid_dev_infra::TransportError;
use sendgrid_dev_shared::ErrorEnvelope;
use thiserror::Error;

/// `POST /v3/mail/send` で発生するエラー
#[derive(Debug, Error)]
pub enum SendMailError {
    /// リクエスト内容の不備（解析・検証・添付デコード）
    #[error("{0}")]
    Rejected(#[from] ValidationError),

    /// API キーが一致しない
    #[error("認証に失敗しました")]
    Unauthorized,

    /// Content-Type が application/json でない
    #[error("Content-Type が application/json ではありません")]
    UnsupportedMediaType,

    /// リクエストボディが上限を超えた
    #[error("リクエストボディが大きすぎます")]
    PayloadTooLarge,

    /// POST 以外のメソッド
    #[error("許可されていないメソッドです")]
    MethodNotAllowed,

    /// 未定義のパス
    #[error("パスが見つかりません")]
    NotFound,

    /// SMTP リレーへの送信失敗
    ///
    /// 詳細はユースケースでログ出力済み。クライアントには固定文言のみ返す。
    #[error("SMTP リレーへの送信に失敗しました: {0}")]
    Transport(#[from] TransportError),
}

impl SendMailError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(e) => {
                StatusCode::from_u16(e.status_code).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            Self::Rejected(e) => ErrorEnvelope::single(&e.message, e.field.clone(), e.help.clone()),
            Self::Unauthorized => ErrorEnvelope::unauthorized(),
            Self::UnsupportedMediaType => ErrorEnvelope::unsupported_media_type(),
            Self::PayloadTooLarge => ErrorEnvelope::payload_too_large(),
            Self::MethodNotAllowed => ErrorEnvelope::method_not_allowed(),
            Self::NotFound => ErrorEnvelope::not_found(),
            Self::Transport(_) => ErrorEnvelope::relay_failed(),
        }
    }
}

impl IntoResponse for SendMailError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}
