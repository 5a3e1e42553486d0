//! Configuration module for RelayCat.
//!
//! Loads the full configuration from `RELAYCAT_*` environment variables into
//! one immutable struct built once at startup and shared by reference.

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::filter::MatchMode;

/// Bot running mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMode {
    Polling,
    Webhook,
}

impl Default for BotMode {
    fn default() -> Self {
        Self::Polling
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Verbose logging default (RUST_LOG still wins).
    pub debug: bool,

    // Telegram
    pub bot_token: String,

    /// Bot username (without @). Optional - fetched via getMe if not set.
    pub bot_username: Option<String>,

    /// The single privileged user id.
    pub admin_id: u64,

    /// Whether other bots may initiate conversations.
    pub allow_bot_initiated: bool,

    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,

    /// Shared secret Telegram echoes back in the webhook header.
    pub webhook_secret: Option<String>,
    pub enforce_webhook_secret: bool,

    /// HTTP port for the webhook and/or verification page.
    pub port: u16,

    // Stores
    pub verified_users_file: PathBuf,
    pub banned_users_file: PathBuf,
    pub route_map_file: PathBuf,
    pub rate_limit_file: PathBuf,
    pub route_ttl_secs: u64,
    pub route_max_entries: usize,

    // Rate limiting
    pub rate_limit_enabled: bool,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_events: usize,

    // Verification tokens
    pub jwt_secret: String,
    pub verification_token_ttl_secs: u64,
    pub jwt_leeway_secs: u64,

    // CAPTCHA
    pub recaptcha_site_key: String,
    pub recaptcha_secret_key: String,
    pub verify_url: Url,

    // Word filter
    pub bad_words_file: PathBuf,
    pub bad_words_mode: MatchMode,
    pub bad_words_ignore_case: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set or malformed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = match env_string("RELAYCAT_BOT_MODE").as_deref() {
            Some("webhook") => BotMode::Webhook,
            _ => BotMode::Polling,
        };
        let webhook_url = env_string("RELAYCAT_WEBHOOK_URL");
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("RELAYCAT_WEBHOOK_URL must be set when RELAYCAT_BOT_MODE is webhook");
        }

        let enforce_webhook_secret = env_bool("RELAYCAT_ENFORCE_WEBHOOK_SECRET", true);
        let webhook_secret = env_string("RELAYCAT_TG_WEBHOOK_SECRET");
        if bot_mode == BotMode::Webhook && enforce_webhook_secret && webhook_secret.is_none() {
            panic!("RELAYCAT_TG_WEBHOOK_SECRET must be set when webhook secret enforcement is on");
        }

        let data_dir =
            PathBuf::from(env_string("RELAYCAT_DATA_DIR").unwrap_or_else(|| "botdata".to_string()));
        let store_file = |key: &str, default_name: &str| {
            env_string(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(default_name))
        };

        // Regex wins over wildcard; with neither, plain substring search.
        let bad_words_mode = if env_bool("RELAYCAT_BAD_WORDS_ENABLE_REGEX", false) {
            MatchMode::Regex
        } else if env_bool("RELAYCAT_BAD_WORDS_ENABLE_WILDCARD", true) {
            MatchMode::Wildcard
        } else {
            MatchMode::Substr
        };

        let verify_url = env_string("RELAYCAT_VERIFY_URL")
            .expect("RELAYCAT_VERIFY_URL must be set");
        let verify_url = Url::parse(&verify_url).expect("RELAYCAT_VERIFY_URL must be a valid URL");

        Self {
            debug: env_bool("RELAYCAT_DEBUG", false),
            bot_token: env_string("RELAYCAT_BOT_TOKEN").expect("RELAYCAT_BOT_TOKEN must be set"),
            bot_username: env_string("RELAYCAT_BOT_USERNAME")
                .map(|s| s.trim_start_matches('@').to_string()),
            admin_id: env_string("RELAYCAT_ADMIN_ID")
                .expect("RELAYCAT_ADMIN_ID must be set")
                .parse()
                .expect("RELAYCAT_ADMIN_ID must be a numeric user id"),
            allow_bot_initiated: env_bool("RELAYCAT_ALLOW_BOT_INITIATED", false),
            bot_mode,
            webhook_url,
            webhook_secret,
            enforce_webhook_secret,
            port: env_u64("RELAYCAT_PORT", 8080) as u16,
            verified_users_file: store_file("RELAYCAT_VERIFIED_USERS_FILE", "verified_users.json"),
            banned_users_file: store_file("RELAYCAT_BANNED_USERS_FILE", "banned_users.json"),
            route_map_file: store_file("RELAYCAT_ROUTE_MAP_FILE", "routes.json"),
            rate_limit_file: store_file("RELAYCAT_RATE_LIMIT_FILE", "rate_limit.json"),
            route_ttl_secs: env_u64("RELAYCAT_ROUTE_TTL_SECONDS", 7 * 24 * 60 * 60),
            route_max_entries: env_u64("RELAYCAT_ROUTE_MAX_ENTRIES", 20_000) as usize,
            rate_limit_enabled: env_bool("RELAYCAT_RATE_LIMIT_ENABLED", true),
            rate_limit_window_secs: env_u64("RELAYCAT_RATE_LIMIT_WINDOW_SEC", 10),
            rate_limit_max_events: env_u64("RELAYCAT_RATE_LIMIT_MAX_EVENTS", 30) as usize,
            jwt_secret: env_string("RELAYCAT_SHARED_JWT_SECRET")
                .expect("RELAYCAT_SHARED_JWT_SECRET must be set"),
            verification_token_ttl_secs: env_u64("RELAYCAT_VERIFICATION_TOKEN_TTL", 600),
            jwt_leeway_secs: env_u64("RELAYCAT_JWT_LEEWAY", 300),
            recaptcha_site_key: env_string("RELAYCAT_RECAPTCHA_SITE_KEY")
                .expect("RELAYCAT_RECAPTCHA_SITE_KEY must be set"),
            recaptcha_secret_key: env_string("RELAYCAT_RECAPTCHA_SECRET_KEY")
                .expect("RELAYCAT_RECAPTCHA_SECRET_KEY must be set"),
            verify_url,
            bad_words_file: store_file("RELAYCAT_BAD_WORDS_FILE", "bad_words.txt"),
            bad_words_mode,
            bad_words_ignore_case: env_bool("RELAYCAT_BAD_WORDS_IGNORE_CASE", true),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_string(key)
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
