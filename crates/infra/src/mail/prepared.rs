//! 送信前のメッセージ構築
//!
//! [`OutboundMessage`] を lettre の [`Message`] に変換する。
//! アドレス解析や MIME 構築の失敗はここで確定するため、
//! 全メッセージを構築し終えてから送信を始めれば部分送信は起きない。

use lettre::{
    Address,
    Message,
    message::{self, Mailbox, MultiPart, SinglePart, header::ContentType},
};
use sendgrid_dev_domain::mail::{
    Disposition,
    OutboundMessage,
    Recipient,
    StagedAttachment,
    attachment::DEFAULT_CONTENT_TYPE,
};

use crate::error::TransportError;

/// 構築済みのメッセージ
///
/// 元の [`OutboundMessage`] と、SMTP に流す lettre の [`Message`] を対で持つ。
#[derive(Debug, Clone)]
pub struct PreparedMessage {
    message: OutboundMessage,
    email:   Message,
}

impl PreparedMessage {
    /// 封筒の宛先は To / Cc / Bcc ヘッダーから lettre が導出する。
    /// Bcc ヘッダーは構築時に取り除かれる。
    pub fn build(message: OutboundMessage) -> Result<Self, TransportError> {
        let email = build_message(&message)?;
        Ok(Self { message, email })
    }

    /// すべて構築できたときだけ `Ok` を返す
    pub fn build_all(messages: Vec<OutboundMessage>) -> Result<Vec<Self>, TransportError> {
        messages.into_iter().map(Self::build).collect()
    }

    pub fn message(&self) -> &OutboundMessage {
        &self.message
    }

    pub(crate) fn email(&self) -> &Message {
        &self.email
    }
}

fn build_message(message: &OutboundMessage) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&message.from)?)
        .subject(message.subject.as_str());

    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }
    for recipient in &message.to {
        builder = builder.to(mailbox(recipient)?);
    }
    for recipient in &message.cc {
        builder = builder.cc(mailbox(recipient)?);
    }
    for recipient in &message.bcc {
        builder = builder.bcc(mailbox(recipient)?);
    }

    let email = match (body(message), message.attachments.is_empty()) {
        (Body::Single(part), true) => builder.singlepart(part)?,
        (Body::Alternative(part), true) => builder.multipart(part)?,
        (body, false) => {
            let mut mixed = match body {
                Body::Single(part) => MultiPart::mixed().singlepart(part),
                Body::Alternative(part) => MultiPart::mixed().multipart(part),
            };
            for attachment in &message.attachments {
                mixed = mixed.singlepart(attachment_part(attachment)?);
            }
            builder.multipart(mixed)?
        }
    };

    Ok(email)
}

enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

fn body(message: &OutboundMessage) -> Body {
    match (&message.text_body, &message.html_body) {
        (Some(text), Some(html)) => Body::Alternative(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(text.clone()))
                .singlepart(SinglePart::html(html.clone())),
        ),
        (None, Some(html)) => Body::Single(SinglePart::html(html.clone())),
        (text, None) => Body::Single(SinglePart::plain(text.clone().unwrap_or_default())),
    }
}

fn attachment_part(attachment: &StagedAttachment) -> Result<SinglePart, TransportError> {
    let content_type = content_type(&attachment.content_type)?;
    let builder = match (attachment.disposition, &attachment.content_id) {
        (Disposition::Inline, Some(content_id)) => message::Attachment::new_inline(content_id.clone()),
        _ => message::Attachment::new(attachment.filename.clone()),
    };

    Ok(builder.body(attachment.data.to_vec(), content_type))
}

/// 解釈できない MIME タイプは `application/octet-stream` として扱う
fn content_type(value: &str) -> Result<ContentType, TransportError> {
    ContentType::parse(value)
        .or_else(|_| ContentType::parse(DEFAULT_CONTENT_TYPE))
        .map_err(|e| TransportError::invalid_content_type(e.to_string()))
}

fn mailbox(recipient: &Recipient) -> Result<Mailbox, TransportError> {
    let address = recipient
        .email
        .parse::<Address>()
        .map_err(|e| TransportError::invalid_address(format!("{}: {e}", recipient.email)))?;

    Ok(Mailbox::new(
        recipient.display_name().map(str::to_string),
        address,
    ))
}
