//! # メール送信リクエスト
//!
//! 1 件の送信リクエストが N 件の SMTP メッセージになるまでの流れを扱う。
//!
//! ```text
//! SendRequest::from_json → Validator::validate → stage_all → compose → Vec<OutboundMessage>
//! ```
//!
//! ## モジュール構成
//!
//! - [`request`] - リクエスト JSON のモデル
//! - [`validation`] - 必須フィールドと構造の検証（最初の違反で打ち切り）
//! - [`attachment`] - base64 添付ファイルのデコード
//! - [`composer`] - personalization ごとのメッセージ展開
//! - [`message`] - 送信用メッセージ

pub mod attachment;
pub mod composer;
pub mod message;
pub mod request;
pub mod validation;

pub use attachment::{Disposition, StagedAttachment, stage, stage_all};
pub use composer::compose;
pub use message::OutboundMessage;
pub use request::{Attachment, ContentBlock, Personalization, Recipient, SendRequest};
pub use validation::{ValidationPolicy, Validator};

/// プレーンテキスト本文の MIME タイプ
pub const TEXT_PLAIN: &str = "text/plain";

/// HTML 本文の MIME タイプ
pub const TEXT_HTML: &str = "text/html";
