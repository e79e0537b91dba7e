//! Noop 送信実装
//!
//! SMTP に接続せず、メッセージ概要をログに出力するだけ。

use async_trait::async_trait;

use super::{MailTransport, PreparedMessage};
use crate::error::TransportError;

/// Noop 送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopMailTransport;

#[async_trait]
impl MailTransport for NoopMailTransport {
    async fn deliver(&self, message: &PreparedMessage) -> Result<(), TransportError> {
        let message = message.message();
        tracing::info!(
            from = %message.from,
            to = %message.rendered_to(),
            recipients = message.recipient_count(),
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Noop: SMTP 送信をスキップ"
        );
        Ok(())
    }
}
