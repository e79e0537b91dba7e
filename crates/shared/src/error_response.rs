//! # エラーレスポンス（SendGrid v3 互換）
//!
//! 拒否したリクエストに返す JSON の形を定義する。
//!
//! ```json
//! {"errors":[{"message":"...","field":null,"help":null}]}
//! ```
//!
//! ## 設計
//!
//! - キーの順序は `message` → `field` → `help` で固定（バイト単位で互換）
//! - `field` / `help` が無い場合は省略せず `null` を出力する
//! - 常に 1 要素の配列（1 リクエスト 1 エラー）

use serde::{Deserialize, Serialize};

/// エラーエンベロープ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorDetail>,
}

/// エンベロープ内の個々のエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub field:   Option<String>,
    pub help:    Option<String>,
}

impl ErrorEnvelope {
    /// エラー 1 件のエンベロープを作る
    pub fn single(
        message: impl Into<String>,
        field: Option<String>,
        help: Option<String>,
    ) -> Self {
        Self {
            errors: vec![ErrorDetail {
                message: message.into(),
                field,
                help,
            }],
        }
    }

    /// `field` も `help` も持たないエラー
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::single(message, None, None)
    }

    /// 405: POST 以外のメソッド
    pub fn method_not_allowed() -> Self {
        Self::message_only("POST method allowed only")
    }

    /// 401: API キー不一致
    pub fn unauthorized() -> Self {
        Self::message_only("The provided authorization grant is invalid, expired, or revoked")
    }

    /// 415: Content-Type が application/json でない
    pub fn unsupported_media_type() -> Self {
        Self::message_only("Content-Type should be application/json.")
    }

    /// 404: 存在しないパス
    pub fn not_found() -> Self {
        Self::message_only("not found")
    }

    /// 413: リクエストボディが上限を超えた
    pub fn payload_too_large() -> Self {
        Self::message_only("Payload Too Large")
    }

    /// 502: SMTP リレーへの送信失敗
    ///
    /// 内部情報を漏らさないため文言は固定。
    pub fn relay_failed() -> Self {
        Self::message_only("Failed to relay the message to the SMTP server.")
    }
}
