//! # バリデーションエラー
//!
//! クライアント入力の不備を表すエラー型。SendGrid v3 API と同じ
//! `status` / `message` / `field` / `help` の 4 要素を持つ。
//!
//! ## 設計方針
//!
//! - **文言はプロバイダ原文のまま**: API クライアントが文字列一致で判定するため、1 文字も変えない
//! - **`field` / `help` は省略可能**: JSON では `null` として出力される（変換は shared クレート）
//! - **ステータスは常に 400**: ヘッダー検証（401 / 415）は HTTP 層の責務
//!
//! | コンストラクタ | field | help |
//! |---------------|-------|------|
//! | [`bad_request`](ValidationError::bad_request) | `null` | `null` |
//! | [`personalizations_required`](ValidationError::personalizations_required) | `personalizations` | あり |
//! | [`from_email_required`](ValidationError::from_email_required) | `from.email` | あり |
//! | [`subject_required`](ValidationError::subject_required) | `subject` | あり |
//! | [`content_required`](ValidationError::content_required) | `content` | あり |
//! | [`duplicate_content_type`](ValidationError::duplicate_content_type) | `content` | `null` |
//! | [`attachment_not_base64`](ValidationError::attachment_not_base64) | `attachments.<i>.content` | あり |

use thiserror::Error;

/// help URL のベース
const HELP_BASE: &str = "http://sendgrid.com/docs/API_Reference/Web_API_v3/Mail/errors.html";

/// クライアント入力エラーの HTTP ステータス
const BAD_REQUEST: u16 = 400;

/// クライアント入力エラー
///
/// 1 つのリクエストにつき 1 つだけ返される。複数の違反があっても
/// 検証順で最初に見つかったものだけが報告される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// HTTP ステータスコード
    pub status_code: u16,
    /// 人間向けメッセージ（プロバイダ原文）
    pub message:     String,
    /// 問題のあるフィールドのドット区切りパス
    pub field:       Option<String>,
    /// エラー解説ページの URL
    pub help:        Option<String>,
}

impl ValidationError {
    fn new(message: &str, field: Option<String>, help_anchor: Option<&str>) -> Self {
        Self {
            status_code: BAD_REQUEST,
            message: message.to_string(),
            field,
            help: help_anchor.map(|anchor| format!("{HELP_BASE}#{anchor}")),
        }
    }

    /// JSON として解釈できない、または空のリクエストボディ
    pub fn bad_request() -> Self {
        Self::new("Bad Request", None, None)
    }

    /// `personalizations` が空
    pub fn personalizations_required() -> Self {
        Self::new(
            "The personalizations field is required and must have at least one personalization.",
            Some("personalizations".to_string()),
            Some("-Personalizations-Errors"),
        )
    }

    /// `from.email` が空
    pub fn from_email_required() -> Self {
        Self::new(
            "The from object must be provided for every email send. It is an object that requires the email parameter, but may also contain a name parameter.  e.g. {\"email\" : \"example@example.com\"}  or {\"email\" : \"example@example.com\", \"name\" : \"Example Recipient\"}.",
            Some("from.email".to_string()),
            Some("message.from"),
        )
    }

    /// 件名がリクエストにも全 personalization にも無い
    pub fn subject_required() -> Self {
        Self::new(
            "The subject is required. You can get around this requirement if you use a template with a subject defined or if every personalization has a subject defined.",
            Some("subject".to_string()),
            Some("message.subject"),
        )
    }

    /// `content` が空
    pub fn content_required() -> Self {
        Self::new(
            "Unless a valid template_id is provided, the content parameter is required. There must be at least one defined content block. We typically suggest both text/plain and text/html blocks are included, but only one block is required.",
            Some("content".to_string()),
            Some("message.content"),
        )
    }

    /// 同じ MIME タイプのコンテンツブロックが 2 つ以上ある
    pub fn duplicate_content_type() -> Self {
        Self::new(
            "If present, text/plain and text/html may only be provided once.",
            Some("content".to_string()),
            None,
        )
    }

    /// 添付ファイルの内容が base64 として不正
    ///
    /// `index` はリクエストの `attachments` 配列内の 0 始まりの位置。
    pub fn attachment_not_base64(index: usize) -> Self {
        Self::new(
            "The attachment content must be base64 encoded.",
            Some(format!("attachments.{index}.content")),
            Some("message.attachments.content"),
        )
    }
}
