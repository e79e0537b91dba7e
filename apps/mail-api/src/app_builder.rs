//! # アプリケーション構築
//!
//! トランスポートと State の初期化、ルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sendgrid_dev_infra::{MailTransport, NoopMailTransport, SmtpMailTransport};
use sendgrid_dev_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::{MailApiConfig, TransportMode},
    handler::{MailSendState, health_check, method_not_allowed, not_found, send_mail},
    usecase::SendMailUseCase,
};

/// リクエストボディの上限（SendGrid のメッセージ総サイズ上限）
pub const MAX_BODY_BYTES: usize = 30 * 1024 * 1024;

/// 送信エンドポイントのパス
pub const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// 設定に応じたトランスポートを作る
pub fn build_transport(config: &MailApiConfig) -> Arc<dyn MailTransport> {
    match config.transport {
        TransportMode::Smtp => {
            tracing::info!(relay = %config.smtp.relay, "SMTP リレーへ送信します");
            Arc::new(SmtpMailTransport::new(&config.smtp))
        }
        TransportMode::Noop => {
            tracing::info!("SENDGRID_DEV_TEST=1: SMTP 送信をスキップします");
            Arc::new(NoopMailTransport)
        }
    }
}

/// ルーターを構築する
pub fn build_app(config: &MailApiConfig, transport: Arc<dyn MailTransport>) -> Router {
    let mail_send_state = Arc::new(MailSendState {
        usecase: SendMailUseCase::new(transport, config.validation),
        api_key: config.api_key.clone(),
    });

    Router::new()
        .route("/health", get(health_check))
        .route(
            MAIL_SEND_PATH,
            post(send_mail).fallback(method_not_allowed),
        )
        .with_state(mail_send_state)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // レイヤー順序: 下に書いたものが外側
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（クライアント提供値があればそれを使う）
        // 2. TraceLayer: request_id を含むスパンを作る
        // 3. CanonicalLogLineLayer: スパン内で 1 行サマリを出す
        // 4. PropagateRequestIdLayer: レスポンスに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
