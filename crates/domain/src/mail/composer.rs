//! # メッセージ合成
//!
//! 検証済みの [`SendRequest`] を personalization ごとの
//! [`OutboundMessage`] に展開する（1:N ファンアウト）。
//!
//! - 送信者・返信先・本文・添付はリクエスト共通
//! - 宛先と件名は personalization ごと（件名が空ならリクエストの件名）
//! - 本文は `text/html` ブロックが HTML、それ以外がプレーンテキスト。
//!   同じ枠に複数のブロックがあれば後勝ち
//!
//! 合成そのものは失敗しない。添付のデコード失敗は
//! [`stage_all`](super::stage_all) の段階で報告される。

use super::{ContentBlock, OutboundMessage, SendRequest, StagedAttachment, TEXT_HTML};

/// リクエストを送信用メッセージの列に展開する
///
/// 戻り値の件数と順序は `request.personalizations` と一致する。
pub fn compose(request: &SendRequest, attachments: &[StagedAttachment]) -> Vec<OutboundMessage> {
    let (text_body, html_body) = split_bodies(&request.content);
    let reply_to = request.reply_to().cloned();

    request
        .personalizations
        .iter()
        .map(|personalization| {
            let subject = if personalization.subject.is_empty() {
                request.subject.clone()
            } else {
                personalization.subject.clone()
            };

            OutboundMessage {
                from: request.from.clone(),
                reply_to: reply_to.clone(),
                to: personalization.to.clone(),
                cc: personalization.cc.clone(),
                bcc: personalization.bcc.clone(),
                subject,
                text_body: text_body.clone(),
                html_body: html_body.clone(),
                attachments: attachments.to_vec(),
            }
        })
        .collect()
}

/// 本文ブロックをプレーンテキストと HTML に振り分ける
fn split_bodies(content: &[ContentBlock]) -> (Option<String>, Option<String>) {
    let mut text_body = None;
    let mut html_body = None;
    for block in content {
        if block.content_type == TEXT_HTML {
            html_body = Some(block.value.clone());
        } else {
            text_body = Some(block.value.clone());
        }
    }
    (text_body, html_body)
}
