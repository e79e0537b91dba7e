//! # メール送信
//!
//! [`OutboundMessage`] を SMTP リレーへ届けるインフラストラクチャモジュール。
//!
//! - [`PreparedMessage`] で送信前に全メッセージを構築する
//! - [`MailTransport`] トレイトで送信方法を抽象化
//! - SMTP（Mailpit 等のローカルキャプチャサーバー）と Noop（オフライン・テスト用）の 2 実装
//! - `SENDGRID_DEV_TEST=1` でランタイムに Noop を選択する

mod noop;
mod prepared;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopMailTransport;
pub use prepared::PreparedMessage;
pub use smtp::{RelayAddress, RelayAddressError, SmtpMailTransport, SmtpSettings};

use crate::error::TransportError;

/// メール送信トレイト
///
/// 1 回の呼び出しが 1 回の SMTP トランザクションに対応する。
/// リトライは行わない。
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// 構築済みのメッセージを 1 通送る
    async fn deliver(&self, message: &PreparedMessage) -> Result<(), TransportError>;
}
