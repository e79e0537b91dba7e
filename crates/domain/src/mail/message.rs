//! # 送信用メッセージ
//!
//! [`compose`](super::compose) の出力。1 件の personalization に対応し、
//! SMTP トランスポートに渡される。

use super::{Recipient, StagedAttachment};

/// SMTP で送る 1 通のメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// 送信者
    pub from:        Recipient,
    /// 返信先
    pub reply_to:    Option<Recipient>,
    pub to:          Vec<Recipient>,
    pub cc:          Vec<Recipient>,
    pub bcc:         Vec<Recipient>,
    /// 件名
    pub subject:     String,
    /// プレーンテキスト本文
    pub text_body:   Option<String>,
    /// HTML 本文
    pub html_body:   Option<String>,
    /// 添付ファイル（リクエスト内の全メッセージで共有）
    pub attachments: Vec<StagedAttachment>,
}

impl OutboundMessage {
    /// 封筒の宛先数（To + Cc + Bcc）
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// To の表示用文字列（ログ出力用）
    pub fn rendered_to(&self) -> String {
        render_list(&self.to)
    }
}

fn render_list(recipients: &[Recipient]) -> String {
    recipients
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
