//! # メール送信ユースケース
//!
//! ```text
//! from_json → validate → stage_all → compose → build_all → deliver × N
//! ```
//!
//! クライアント入力に起因するエラーはすべて最初の送信より前に確定する。
//! lettre のメッセージ構築（アドレス解析・宛先なし等）も送信前に全件済ませる。
//! 送信は personalization の順に 1 通ずつ行い、失敗した時点で打ち切る。
//! 送信済みのメッセージは取り消さない。

use std::sync::Arc;

use sendgrid_dev_domain::{
    ValidationError,
    mail::{OutboundMessage, SendRequest, ValidationPolicy, Validator, compose, stage_all},
};
use sendgrid_dev_infra::{MailTransport, PreparedMessage, TransportError};
use sendgrid_dev_shared::{
    event_log::{error, event},
    log_business_event,
};

use crate::error::SendMailError;

/// 送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    /// リレーに渡したメッセージ数
    pub messages: usize,
}

pub struct SendMailUseCase {
    transport: Arc<dyn MailTransport>,
    validator: Validator,
}

impl SendMailUseCase {
    pub fn new(transport: Arc<dyn MailTransport>, policy: ValidationPolicy) -> Self {
        Self {
            transport,
            validator: Validator::new(policy),
        }
    }

    /// リクエストボディを解析・検証し、全メッセージをリレーに渡す
    #[tracing::instrument(skip_all, level = "debug", fields(body_bytes = body.len()))]
    pub async fn execute(&self, body: &[u8]) -> Result<SendOutcome, SendMailError> {
        let messages = self.prepare(body).inspect_err(|e| {
            log_business_event!(
                event.category = event::category::MAIL,
                event.action = event::action::MAIL_REJECTED,
                event.result = event::result::FAILURE,
                error.category = error::category::VALIDATION,
                error.field = e.field.as_deref().unwrap_or("-"),
                error.message = %e.message,
                "送信リクエストを拒否"
            );
        })?;

        let total = messages.len();
        let prepared = PreparedMessage::build_all(messages)
            .inspect_err(|e| relay_failed(e, 0, total, "メッセージの構築に失敗"))?;
        tracing::debug!(messages = total, "送信メッセージを構築");

        for (index, message) in prepared.iter().enumerate() {
            if let Err(e) = self.transport.deliver(message).await {
                relay_failed(&e, index, total, "SMTP リレーへの送信に失敗");
                return Err(e.into());
            }
            tracing::debug!(
                message.index = index,
                to = %message.message().rendered_to(),
                recipients = message.message().recipient_count(),
                "メッセージを送信"
            );
        }

        log_business_event!(
            event.category = event::category::MAIL,
            event.action = event::action::MAIL_ACCEPTED,
            event.result = event::result::SUCCESS,
            mail.messages = total,
            "メール送信完了"
        );

        Ok(SendOutcome { messages: total })
    }

    /// 送信前の全工程。ここで失敗したら 1 通も送らない。
    fn prepare(&self, body: &[u8]) -> Result<Vec<OutboundMessage>, ValidationError> {
        let request = SendRequest::from_json(body)?;
        tracing::debug!(
            personalizations = request.personalizations.len(),
            content_blocks = request.content.len(),
            attachments = request.attachments.len(),
            "リクエストを解析"
        );

        self.validator.validate(&request)?;
        tracing::debug!("リクエストを検証");

        let attachments = stage_all(&request.attachments)?;
        tracing::debug!(staged = attachments.len(), "添付ファイルを展開");

        let messages = compose(&request, &attachments);
        tracing::debug!(messages = messages.len(), "メッセージを組み立て");

        Ok(messages)
    }
}

fn relay_failed(e: &TransportError, delivered: usize, total: usize, reason: &str) {
    tracing::error!(
        error.category = error::category::EXTERNAL_SERVICE,
        error.kind = e.kind_name(),
        error.message = %e,
        span_trace = %e.span_trace(),
        message.index = delivered,
        "{reason}"
    );
    log_business_event!(
        event.category = event::category::MAIL,
        event.action = event::action::MAIL_RELAY_FAILED,
        event.result = event::result::FAILURE,
        mail.delivered = delivered,
        mail.total = total,
        "メール送信失敗"
    );
}
