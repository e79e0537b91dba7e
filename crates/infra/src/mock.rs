//! # テスト用モックトランスポート
//!
//! 送信されたメッセージをメモリに記録する。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! sendgrid-dev-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sendgrid_dev_domain::mail::OutboundMessage;

use crate::{
    error::TransportError,
    mail::{MailTransport, PreparedMessage},
};

/// 送信メッセージを記録するモック
///
/// クローンは記録先を共有する。
#[derive(Clone, Default)]
pub struct MockMailTransport {
    delivered: Arc<Mutex<Vec<OutboundMessage>>>,
    /// この回数の送信が成功した後、以降の送信を失敗させる
    fail_after: Option<usize>,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての送信を失敗させる
    pub fn failing() -> Self {
        Self::failing_after(0)
    }

    /// `successes` 通の成功後に失敗させる
    pub fn failing_after(successes: usize) -> Self {
        Self {
            delivered:  Arc::new(Mutex::new(Vec::new())),
            fail_after: Some(successes),
        }
    }

    /// 記録済みメッセージのスナップショット
    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn deliver(&self, message: &PreparedMessage) -> Result<(), TransportError> {
        let mut delivered = self.delivered.lock().unwrap();
        if self.fail_after.is_some_and(|limit| delivered.len() >= limit) {
            return Err(TransportError::invalid_address(
                "mock transport configured to fail",
            ));
        }
        delivered.push(message.message().clone());
        Ok(())
    }
}
