//! # インフラ層エラー定義
//!
//! SMTP リレーへの送信で発生するエラーを表現する。
//!
//! `std::io::Error` と同じ struct + enum パターン:
//! - [`TransportError`]: エラー種別（[`TransportErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`TransportErrorKind`]: 具体的な種別
//!
//! 生成時点のスパン情報は `From` 実装と convenience constructor で自動的にキャプチャされる。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// SMTP トランスポートのエラー
///
/// ```ignore
/// match error.kind() {
///     TransportErrorKind::Smtp(e) if e.is_transient() => { /* ... */ }
///     _ => { /* ... */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct TransportError {
    kind:       TransportErrorKind,
    span_trace: SpanTrace,
}

/// トランスポートエラーの種別
#[derive(Debug, Error)]
pub enum TransportErrorKind {
    /// メールアドレスとして解釈できない
    #[error("メールアドレス不正: {0}")]
    InvalidAddress(String),

    /// 添付ファイルの MIME タイプが解釈できない
    #[error("Content-Type 不正: {0}")]
    InvalidContentType(String),

    /// lettre のメッセージ構築失敗（宛先なしなど）
    #[error("メッセージ構築失敗: {0}")]
    Build(#[source] lettre::error::Error),

    /// SMTP セッション中のエラー（接続・認証・拒否・タイムアウト）
    #[error("SMTP 送信失敗: {0}")]
    Smtp(#[source] lettre::transport::smtp::Error),
}

impl TransportError {
    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// ログの `error.kind` フィールドに出す種別名
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TransportErrorKind::InvalidAddress(_) => "invalid_address",
            TransportErrorKind::InvalidContentType(_) | TransportErrorKind::Build(_) => {
                "message_build"
            }
            TransportErrorKind::Smtp(_) => "smtp",
        }
    }

    // ===== Convenience constructors =====

    pub fn invalid_address(detail: impl Into<String>) -> Self {
        Self::from_kind(TransportErrorKind::InvalidAddress(detail.into()))
    }

    pub fn invalid_content_type(detail: impl Into<String>) -> Self {
        Self::from_kind(TransportErrorKind::InvalidContentType(detail.into()))
    }

    fn from_kind(kind: TransportErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<lettre::error::Error> for TransportError {
    fn from(source: lettre::error::Error) -> Self {
        Self::from_kind(TransportErrorKind::Build(source))
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(source: lettre::transport::smtp::Error) -> Self {
        Self::from_kind(TransportErrorKind::Smtp(source))
    }
}
