//! # HTTP リクエストハンドラ
//!
//! - ハンドラは薄く保ち、送信パイプラインは usecase 層に委譲
//! - 親モジュールで re-export し、フラットな API を提供
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `mail_send`: `/v3/mail/send` とフォールバック

pub mod health;
pub mod mail_send;

pub use health::health_check;
pub use mail_send::{MailSendState, method_not_allowed, not_found, send_mail};
