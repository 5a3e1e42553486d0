//! Dispatcher setup and shared application state.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::filter::WordFilter;
use crate::relay;
use crate::storage::{RateLimiter, RouteTable, UserSetStore};
use crate::token::TokenCodec;

/// Bot type with Throttle adaptor for automatic API rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Users who passed the verification handshake.
    pub verified: Arc<UserSetStore>,

    /// Users the admin has silenced.
    pub banned: Arc<UserSetStore>,

    /// Admin-side message id -> original sender routing.
    pub routes: Arc<RouteTable>,

    /// Sliding-window admission control.
    pub rate_limiter: Arc<RateLimiter>,

    /// Bad-word matcher over text + caption.
    pub bad_words: Arc<WordFilter>,

    /// Signed verification token codec.
    pub tokens: Arc<TokenCodec>,

    /// Bot username (without @) for command parsing and page instructions.
    pub bot_username: String,
}

impl AppState {
    pub fn new(config: Arc<Config>, tokens: Arc<TokenCodec>, bot_username: String) -> Self {
        let verified = Arc::new(UserSetStore::new(&config.verified_users_file));
        let banned = Arc::new(UserSetStore::new(&config.banned_users_file));
        let routes = Arc::new(RouteTable::new(
            &config.route_map_file,
            config.route_ttl_secs,
            config.route_max_entries,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(
            &config.rate_limit_file,
            config.rate_limit_enabled,
            config.rate_limit_window_secs,
            config.rate_limit_max_events,
        ));
        let bad_words = Arc::new(WordFilter::new(
            &config.bad_words_file,
            config.bad_words_mode,
            config.bad_words_ignore_case,
        ));

        Self {
            config,
            verified,
            banned,
            routes,
            rate_limiter,
            bad_words,
            tokens,
            bot_username,
        }
    }

    /// Whether `user_id` is the administrator.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.config.admin_id == user_id
    }

    /// The administrator's private chat.
    pub fn admin_chat(&self) -> ChatId {
        ChatId(self.config.admin_id as i64)
    }
}

/// Build the dispatcher with the relay pipeline.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            // Non-message updates are acknowledged and dropped.
            debug!("ignoring update {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema: every message goes through the relay pipeline,
/// which applies its checks in a fixed order.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    Update::filter_message().endpoint(relay::handle_message)
}
