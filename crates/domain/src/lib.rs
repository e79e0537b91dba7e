//! # sendgrid-dev ドメイン層
//!
//! `POST /v3/mail/send` のリクエストを検証し、SMTP で送る個々のメッセージへ
//! 展開するまでの純粋なロジックを定義する。
//!
//! ## 設計方針
//!
//! - **I/O を持たない**: HTTP・SMTP・環境変数には一切触れない
//! - **1 リクエスト 1 エラー**: 検証は最初の違反で打ち切り、[`ValidationError`] を 1 つだけ返す
//! - **ステートレス**: リクエスト間で共有する可変状態を持たない
//!
//! ## 依存関係の方向
//!
//! ```text
//! mail-api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - プロバイダ互換のバリデーションエラー
//! - [`mail`] - リクエストモデル、検証、添付ファイル展開、メッセージ合成
//!
//! ## 使用例
//!
//! ```rust
//! use sendgrid_dev_domain::mail::{SendRequest, ValidationPolicy, Validator};
//!
//! let request = SendRequest::from_json(br#"{"subject": "Hi"}"#).unwrap();
//! let error = Validator::new(ValidationPolicy::default())
//!     .validate(&request)
//!     .unwrap_err();
//!
//! assert_eq!(error.field.as_deref(), Some("personalizations"));
//! ```

pub mod error;
pub mod mail;

pub use error::ValidationError;
