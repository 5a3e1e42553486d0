//! Bot runtime - Polling and Webhook runners.

use std::net::SocketAddr;

use teloxide::prelude::*;
use tracing::{error, info};

use super::dispatcher::ThrottledBot;
use super::webhook;
use crate::config::{BotMode, Config};
use crate::web;

/// Run the bot with the configured mode.
///
/// The verification page is served in both modes; only the update transport
/// differs.
pub async fn run(
    config: &Config,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
    bot: ThrottledBot,
    web_state: web::WebState,
) {
    match config.bot_mode {
        BotMode::Polling => {
            info!("Starting bot in polling mode...");
            serve_verification_page(config, web_state);
            dispatcher.dispatch().await;
        }
        BotMode::Webhook => {
            info!("Starting bot in webhook mode...");
            webhook::start_webhook(config, dispatcher, bot, web_state).await;
        }
    }
}

/// In polling mode the verification page still needs an HTTP listener.
fn serve_verification_page(config: &Config, web_state: web::WebState) {
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = web::router(web_state);
    tokio::spawn(async move {
        info!("Verification page listening on: {address}");
        match tokio::net::TcpListener::bind(address).await {
            Ok(tcp) => {
                if let Err(e) = axum::serve(tcp, app).await {
                    error!("HTTP server error: {e}");
                }
            }
            Err(e) => error!("Failed to bind {address}: {e}"),
        }
    });
}
