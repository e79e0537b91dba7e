//! # sendgrid-dev メール API
//!
//! SendGrid v3 `POST /v3/mail/send` を受け付け、SMTP リレーへ転送する
//! 開発用エミュレータのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーターとミドルウェアの構築
//! - `config`: 環境変数からの設定読み込み
//! - `error`: API エラーと HTTP レスポンスへの変換
//! - `handler`: HTTP ハンドラ
//! - `usecase`: 送信パイプライン（解析 → 検証 → 添付展開 → 展開 → 送信）

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
