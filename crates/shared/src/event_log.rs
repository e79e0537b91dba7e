//! # ビジネスイベントログ
//!
//! `jq` で調査しやすいよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! [`log_business_event!`] で出力したログには `event.kind = "business_event"` が付与され、
//! `jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! フィールド名はドット記法（`event.category`、`error.kind`）。
//! JSON 出力ではフラットなキーになる。

/// ビジネスイベントを INFO レベルの構造化ログとして出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
///
/// 利用側クレートは `tracing` に依存している必要がある。
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const MAIL: &str = "mail";
    }

    /// イベントアクション
    pub mod action {
        /// リクエストを受け付け、全メッセージをリレーに渡した
        pub const MAIL_ACCEPTED: &str = "mail.accepted";
        /// 検証・認証・Content-Type チェックで拒否した
        pub const MAIL_REJECTED: &str = "mail.rejected";
        /// SMTP リレーへの送信に失敗した
        pub const MAIL_RELAY_FAILED: &str = "mail.relay_failed";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// リクエスト内容の不備
        pub const VALIDATION: &str = "validation";
        /// 外部サービス呼び出し（SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }
}
