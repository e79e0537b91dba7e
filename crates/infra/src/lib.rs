//! # sendgrid-dev インフラ層
//!
//! 組み立て済みのメッセージを SMTP リレーへ届ける。
//!
//! ## 依存関係
//!
//! ```text
//! mail-api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`mail`] - [`PreparedMessage`]、[`MailTransport`] トレイトと SMTP / Noop 実装
//! - [`error`] - インフラ層エラー定義
//! - `mock` - テスト用インメモリトランスポート（`test-utils` feature）

pub mod error;
pub mod mail;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{TransportError, TransportErrorKind};
pub use mail::{
    MailTransport,
    NoopMailTransport,
    PreparedMessage,
    RelayAddress,
    RelayAddressError,
    SmtpMailTransport,
    SmtpSettings,
};
