//! # sendgrid-dev サーバー
//!
//! SendGrid v3 Mail Send API を模倣し、受け取ったメールを SMTP リレー
//! （Mailpit、MailHog 等）へ転送する開発用サーバー。
//!
//! ## 環境変数
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|-----------|------|
//! | `SENDGRID_DEV_HOST` | `0.0.0.0` | バインドアドレス |
//! | `SENDGRID_DEV_PORT` | `3030` | ポート番号 |
//! | `SENDGRID_DEV_APIKEY` | 空 | 期待する API キー |
//! | `SENDGRID_DEV_SMTP_SERVER` | `localhost:1025` | SMTP リレー |
//! | `SENDGRID_DEV_SMTP_USERNAME` / `SENDGRID_DEV_SMTP_PASSWORD` | なし | SMTP 認証 |
//! | `SENDGRID_DEV_SMTP_TIMEOUT_SECS` | `10` | SMTP タイムアウト |
//! | `SENDGRID_DEV_TEST` | なし | `1` で送信をスキップ |
//! | `SENDGRID_DEV_STRICT_CONTENT` | `true` | 同じ MIME タイプの content の重複を拒否 |
//! | `LOG_FORMAT` | `pretty` | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! SENDGRID_DEV_APIKEY=SG.xxxxx cargo run -p sendgrid-dev-api
//! ```

use std::net::SocketAddr;

use anyhow::Context as _;
use sendgrid_dev_api::{
    app_builder::{build_app, build_transport},
    config::MailApiConfig,
};
use sendgrid_dev_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("sendgrid-dev"));
    let _tracing_guard = tracing::info_span!("app", service = "sendgrid-dev").entered();

    let config = MailApiConfig::from_env().context("設定の読み込みに失敗しました")?;
    let transport = build_transport(&config);
    let app = build_app(&config, transport);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("アドレスのパースに失敗しました: {}", config.bind_address()))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("sendgrid-dev サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
