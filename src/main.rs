//! RelayCat - anti-spam private-message relay for Telegram.
//!
//! Unverified senders are walked through a one-time CAPTCHA handshake;
//! verified senders' messages are forwarded to a single administrator, whose
//! normal chat replies are routed back to the original sender.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `storage` - File-backed JSON stores (verified/banned/routes/rate windows)
//! - `filter` - Bad-word matching
//! - `token` - Signed verification tokens
//! - `relay` - Inbound dispatch state machine (with Throttle for API rate limiting)
//! - `plugins` - Command handlers
//! - `web` - CAPTCHA verification page
//! - `bot` - Dispatcher wiring and runtimes

mod bot;
mod config;
mod filter;
mod plugins;
mod relay;
mod storage;
mod token;
mod utils;
mod web;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use token::TokenCodec;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Load configuration; the debug flag picks the default log level, with
    // RUST_LOG taking precedence as usual.
    let config = Config::from_env();
    let default_filter = if config.debug {
        "relaycat=debug,teloxide=warn"
    } else {
        "relaycat=info,teloxide=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting RelayCat...");
    info!("Bot mode: {:?}", config.bot_mode);

    // Stores live under the data directory; make sure it exists up front.
    for path in [
        &config.verified_users_file,
        &config.banned_users_file,
        &config.route_map_file,
        &config.rate_limit_file,
        &config.bad_words_file,
    ] {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
    }

    let config = Arc::new(config);
    let tokens = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        config.verification_token_ttl_secs,
        config.jwt_leeway_secs,
    ));

    // Initialize bot with Throttle so outbound calls respect Telegram's rate
    // limits.
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    let bot_username = config
        .bot_username
        .clone()
        .unwrap_or_else(|| me.username().to_string());
    info!("Using bot username: @{bot_username}");
    info!("Administrator id: {}", config.admin_id);

    let state = bot::dispatcher::AppState::new(config.clone(), tokens.clone(), bot_username.clone());
    let web_state = web::WebState {
        config: config.clone(),
        tokens,
        bot_username,
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?,
    };

    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    // Run the bot
    bot::run(&config, dispatcher, bot, web_state).await;

    Ok(())
}
