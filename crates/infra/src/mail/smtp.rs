//! SMTP 送信実装
//!
//! lettre の `AsyncSmtpTransport` でリレーに送信する。
//! ローカルのキャプチャサーバー（Mailpit、MailHog 等）を想定し、TLS は使わない。

use std::{fmt, time::Duration};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use super::{MailTransport, PreparedMessage};
use crate::error::TransportError;

/// ホスト省略時の接続先
pub const DEFAULT_RELAY_HOST: &str = "localhost";

/// ポート省略時の接続先
pub const DEFAULT_RELAY_PORT: u16 = 1025;

/// リレーアドレスの解析エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayAddressError {
    #[error("SMTP ポートが不正です: {0:?}")]
    InvalidPort(String),
}

/// SMTP リレーの接続先（`host:port`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayAddress {
    pub host: String,
    pub port: u16,
}

impl RelayAddress {
    /// `host:port` を最後の `:` で分割して解析する
    ///
    /// ホストが空なら [`DEFAULT_RELAY_HOST`]、ポートが無い（または空）なら
    /// [`DEFAULT_RELAY_PORT`] を使う。
    pub fn parse(value: &str) -> Result<Self, RelayAddressError> {
        let value = value.trim();
        let (host, port) = value.rsplit_once(':').unwrap_or((value, ""));

        let port = if port.is_empty() {
            DEFAULT_RELAY_PORT
        } else {
            port.parse::<u16>()
                .map_err(|_| RelayAddressError::InvalidPort(port.to_string()))?
        };
        let host = if host.is_empty() {
            DEFAULT_RELAY_HOST
        } else {
            host
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl Default for RelayAddress {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_string(),
            port: DEFAULT_RELAY_PORT,
        }
    }
}

impl fmt::Display for RelayAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub relay:    RelayAddress,
    /// 空でなければ認証付きで送信する
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout:  Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            relay:    RelayAddress::default(),
            username: None,
            password: None,
            timeout:  Duration::from_secs(10),
        }
    }
}

/// SMTP 送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// lettre の `pool` feature は無効のため、メッセージごとに接続する。
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay:     RelayAddress,
}

impl SmtpMailTransport {
    pub fn new(settings: &SmtpSettings) -> Self {
        // builder_dangerous: TLS なしで接続（ローカル SMTP 向け）
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.relay.host.as_str())
                .port(settings.relay.port)
                .timeout(Some(settings.timeout));

        if let Some(username) = settings.username.as_deref().filter(|u| !u.is_empty()) {
            let password = settings.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.to_string(), password));
        }

        Self {
            transport: builder.build(),
            relay:     settings.relay.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: &PreparedMessage) -> Result<(), TransportError> {
        let email = message.email();

        let response = self
            .transport
            .send_raw(email.envelope(), &email.formatted())
            .await?;
        tracing::debug!(
            relay = %self.relay,
            code = %response.code(),
            recipients = message.message().recipient_count(),
            "SMTP リレーが受理"
        );

        Ok(())
    }
}
