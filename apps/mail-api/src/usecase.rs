//! # ユースケース層
//!
//! ハンドラから呼ばれる送信パイプラインを実装する。

pub mod send_mail;

pub use send_mail::{SendMailUseCase, SendOutcome};
