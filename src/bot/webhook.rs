//! Webhook mode implementation for the bot.
//!
//! Uses teloxide's axum webhook support to:
//! - Automatically call `setWebhook` on Telegram
//! - Validate the `X-Telegram-Bot-Api-Secret-Token` header (HTTP 403 on
//!   mismatch) when enforcement is enabled
//! - Serve the verification page from the same listener
//! - Automatically call `deleteWebhook` on shutdown

use std::net::SocketAddr;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::{error, info};
use url::Url;

use super::dispatcher::ThrottledBot;
use crate::config::Config;
use crate::web;

/// Start the bot in webhook mode. One HTTP listener carries both the
/// Telegram webhook route and the verification page.
pub async fn start_webhook(
    config: &Config,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
    bot: ThrottledBot,
    web_state: web::WebState,
) {
    let webhook_url = config
        .webhook_url
        .as_ref()
        .expect("RELAYCAT_WEBHOOK_URL must be set when using webhook mode");
    let url = Url::parse(webhook_url).expect("Invalid RELAYCAT_WEBHOOK_URL format");

    // Listen on all interfaces at the configured port.
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));

    let mut options = Options::new(address, url.clone());
    if config.enforce_webhook_secret {
        let secret = config
            .webhook_secret
            .clone()
            .expect("RELAYCAT_TG_WEBHOOK_SECRET must be set when enforcement is on");
        options = options.secret_token(secret);
        info!("Webhook secret token enforcement enabled");
    }

    info!("🔗 Setting webhook URL: {url}");
    info!("📡 Listening on: {address}");

    // Note: the webhook setup only needs basic API access, so it gets the
    // underlying Bot without Throttle.
    let (listener, stop_flag, bot_router) =
        webhooks::axum_to_router(bot.inner().clone(), options)
            .await
            .expect("Failed to setup webhook");

    let app = bot_router.merge(web::router(web_state));
    tokio::spawn(async move {
        let tcp = tokio::net::TcpListener::bind(address)
            .await
            .expect("Failed to bind webhook address");
        if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
            error!("HTTP server error: {e}");
        }
    });

    info!("✅ Webhook setup complete, waiting for updates...");

    let error_handler = LoggingErrorHandler::with_custom_text("Error from update listener");
    dispatcher
        .dispatch_with_listener(listener, error_handler)
        .await;
}
