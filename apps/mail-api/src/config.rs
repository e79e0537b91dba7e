//! # メール API 設定
//!
//! 環境変数から設定を読み込む。
//!
//! 読み込みは [`MailApiConfig::from_lookup`] に集約し、テストでは
//! プロセス環境に触れずにキーと値を渡せるようにしている。

use std::time::Duration;

use sendgrid_dev_domain::mail::ValidationPolicy;
use sendgrid_dev_infra::{RelayAddress, RelayAddressError, SmtpSettings};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// 送信先の切り替え
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// SMTP リレーへ送信する
    Smtp,
    /// 送信せずログのみ（`SENDGRID_DEV_TEST=1`）
    Noop,
}

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SENDGRID_DEV_SMTP_SERVER が不正です: {0}")]
    InvalidRelay(#[from] RelayAddressError),

    #[error("SENDGRID_DEV_SMTP_TIMEOUT_SECS は正の整数である必要があります: {0:?}")]
    InvalidTimeout(String),

    #[error("{key} は true / false で指定してください: {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// メール API サーバーの設定
#[derive(Debug, Clone)]
pub struct MailApiConfig {
    /// バインドアドレス
    pub host:       String,
    /// ポート番号
    pub port:       u16,
    /// `Authorization: Bearer <api_key>` として期待する値
    pub api_key:    String,
    pub smtp:       SmtpSettings,
    pub transport:  TransportMode,
    pub validation: ValidationPolicy,
}

impl MailApiConfig {
    /// プロセス環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から読み込む
    ///
    /// - `SENDGRID_DEV_PORT` が不正・範囲外なら [`DEFAULT_PORT`]
    /// - `SENDGRID_DEV_SMTP_SERVER` のポートが不正ならエラー
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("SENDGRID_DEV_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = non_empty("SENDGRID_DEV_PORT")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_PORT);

        let relay = match non_empty("SENDGRID_DEV_SMTP_SERVER") {
            Some(value) => RelayAddress::parse(&value)?,
            None => RelayAddress::default(),
        };
        let timeout = match non_empty("SENDGRID_DEV_SMTP_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(value))?,
            None => DEFAULT_SMTP_TIMEOUT_SECS,
        };

        let transport = match lookup("SENDGRID_DEV_TEST").as_deref() {
            Some("1") => TransportMode::Noop,
            _ => TransportMode::Smtp,
        };
        let reject_duplicate_content = match non_empty("SENDGRID_DEV_STRICT_CONTENT") {
            Some(value) => parse_flag("SENDGRID_DEV_STRICT_CONTENT", value)?,
            None => ValidationPolicy::default().reject_duplicate_content,
        };

        Ok(Self {
            host,
            port,
            api_key: lookup("SENDGRID_DEV_APIKEY").unwrap_or_default(),
            smtp: SmtpSettings {
                relay,
                username: non_empty("SENDGRID_DEV_SMTP_USERNAME"),
                password: lookup("SENDGRID_DEV_SMTP_PASSWORD"),
                timeout: Duration::from_secs(timeout),
            },
            transport,
            validation: ValidationPolicy {
                reject_duplicate_content,
            },
        })
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value }),
    }
}
