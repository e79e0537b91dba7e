//! # リクエストモデル
//!
//! `POST /v3/mail/send` のリクエストボディを型付きで保持する。
//!
//! 構造体そのものは空や欠けたデータも受け入れる。妥当性は
//! [`Validator`](super::Validator) だけが判断する。JSON の `null` は
//! そのフィールドの空値（空文字列・空配列）として扱う。

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// `null` をデフォルト値として読み込む
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 送信リクエスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub personalizations: Vec<Personalization>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from:             Recipient,
    #[serde(default)]
    pub reply_to:         Option<Recipient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject:          String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content:          Vec<ContentBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments:      Vec<Attachment>,
}

/// 宛先グループ
///
/// 1 つの personalization が 1 通のメッセージになる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Personalization {
    #[serde(default, deserialize_with = "null_as_default")]
    pub to:      Vec<Recipient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cc:      Vec<Recipient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bcc:     Vec<Recipient>,
    /// この personalization だけの件名（空ならリクエストの件名を使う）
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
}

/// 送信者・受信者
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Recipient {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name:  String,
}

/// 本文ブロック
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentBlock {
    /// MIME タイプ（`text/plain`, `text/html` など）
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value:        String,
}

/// 添付ファイル（base64 エンコード済み）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content:      String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename:     String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disposition:  String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_id:   String,
}

impl SendRequest {
    /// リクエストボディをパースする
    ///
    /// 以下はすべて `"Bad Request"` になる:
    ///
    /// - 空ボディ、空白のみのボディ
    /// - JSON として不正、またはトップレベルがオブジェクトでない
    /// - メンバーを 1 つも持たないオブジェクト（`{}`）
    /// - フィールドの型が合わない（例: `"personalizations": "x"`）
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let members: Map<String, Value> =
            serde_json::from_slice(body).map_err(|_| ValidationError::bad_request())?;
        if members.is_empty() {
            return Err(ValidationError::bad_request());
        }

        serde_json::from_value(Value::Object(members)).map_err(|_| ValidationError::bad_request())
    }

    /// 返信先を返す（メールアドレスが空なら指定なしとみなす）
    pub fn reply_to(&self) -> Option<&Recipient> {
        self.reply_to.as_ref().filter(|r| !r.email.is_empty())
    }
}

impl Recipient {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name:  name.into(),
        }
    }

    /// 表示名なしの宛先
    pub fn address(email: impl Into<String>) -> Self {
        Self::new(email, "")
    }

    /// 表示名を返す（空なら `None`）
    pub fn display_name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

/// `"name <email>"` 形式、表示名が空ならアドレスのみ
impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name() {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn 全フィールドをパースできる() {
        let body = br#"{
            "personalizations": [{
                "to": [{"email": "to@example.com", "name": "To"}],
                "cc": [{"email": "cc@example.com"}],
                "bcc": [{"email": "bcc@example.com"}],
                "subject": "Personal"
            }],
            "from": {"email": "from@example.com", "name": "From"},
            "reply_to": {"email": "reply@example.com"},
            "subject": "Subject",
            "content": [{"type": "text/plain", "value": "Content"}],
            "attachments": [{
                "content": "dGVzdA==",
                "type": "text/plain",
                "filename": "a.txt",
                "disposition": "inline",
                "content_id": "cid-1"
            }]
        }"#;

        let request = SendRequest::from_json(body).unwrap();

        assert_eq!(
            request,
            SendRequest {
                personalizations: vec![Personalization {
                    to:      vec![Recipient::new("to@example.com", "To")],
                    cc:      vec![Recipient::address("cc@example.com")],
                    bcc:     vec![Recipient::address("bcc@example.com")],
                    subject: "Personal".to_string(),
                }],
                from:             Recipient::new("from@example.com", "From"),
                reply_to:         Some(Recipient::address("reply@example.com")),
                subject:          "Subject".to_string(),
                content:          vec![ContentBlock {
                    content_type: "text/plain".to_string(),
                    value:        "Content".to_string(),
                }],
                attachments:      vec![Attachment {
                    content:      "dGVzdA==".to_string(),
                    content_type: "text/plain".to_string(),
                    filename:     "a.txt".to_string(),
                    disposition:  "inline".to_string(),
                    content_id:   "cid-1".to_string(),
                }],
            }
        );
    }

    #[rstest]
    #[case::空ボディ(b"" as &[u8])]
    #[case::空白のみ(b"  \n ")]
    #[case::空オブジェクト(b"{}")]
    #[case::不正なjson(b"{\"from\":")]
    #[case::配列(b"[]")]
    #[case::文字列(b"\"text\"")]
    #[case::型不一致(br#"{"personalizations": "to@example.com"}"#)]
    fn 解釈できないボディはbad_requestになる(#[case] body: &[u8]) {
        assert_eq!(
            SendRequest::from_json(body),
            Err(ValidationError::bad_request())
        );
    }

    #[test]
    fn nullは空値として扱う() {
        let body = br#"{
            "personalizations": null,
            "from": null,
            "reply_to": null,
            "subject": null,
            "content": [{"type": null, "value": null}],
            "attachments": null
        }"#;

        let request = SendRequest::from_json(body).unwrap();

        assert!(request.personalizations.is_empty());
        assert_eq!(request.from, Recipient::default());
        assert_eq!(request.reply_to, None);
        assert_eq!(request.subject, "");
        assert_eq!(request.content, vec![ContentBlock::default()]);
        assert!(request.attachments.is_empty());
    }

    #[test]
    fn 未知のフィールドは無視する() {
        let body = br#"{"subject": "Subject", "template_id": "d-123", "mail_settings": {}}"#;

        let request = SendRequest::from_json(body).unwrap();

        assert_eq!(request.subject, "Subject");
    }

    #[test]
    fn reply_toのメールアドレスが空なら指定なし() {
        let request = SendRequest {
            reply_to: Some(Recipient::new("", "Nobody")),
            ..Default::default()
        };
        assert_eq!(request.reply_to(), None);

        let request = SendRequest {
            reply_to: Some(Recipient::address("reply@example.com")),
            ..Default::default()
        };
        assert_eq!(
            request.reply_to(),
            Some(&Recipient::address("reply@example.com"))
        );
    }

    #[rstest]
    #[case::表示名あり(Recipient::new("to@example.com", "ToName"), "ToName <to@example.com>")]
    #[case::表示名なし(Recipient::address("to@example.com"), "to@example.com")]
    fn 宛先の文字列表現(#[case] recipient: Recipient, #[case] expected: &str) {
        assert_eq!(recipient.to_string(), expected);
    }
}
