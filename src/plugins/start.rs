//! /start flow: welcome, verification-link issuance, token redemption.

use teloxide::prelude::*;
use tracing::{info, warn};
use url::Url;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::token::{TokenError, TokenKind};

/// Handle /start with or without a token payload.
pub async fn handle_start(
    bot: &ThrottledBot,
    state: &AppState,
    user_id: u64,
    is_admin: bool,
    is_verified: bool,
    text: &str,
) -> anyhow::Result<()> {
    let payload = text.split_whitespace().nth(1).unwrap_or("");
    if !payload.is_empty() {
        return redeem(bot, state, user_id, is_admin, is_verified, payload).await;
    }

    if is_verified {
        bot.send_message(
            ChatId(user_id as i64),
            "Welcome! You can send me messages directly.",
        )
        .await?;
        return Ok(());
    }
    send_verification_link(bot, state, user_id).await
}

/// Redeem a pasted success token. Accepting one marks the caller verified;
/// re-redeeming is a no-op that still confirms.
async fn redeem(
    bot: &ThrottledBot,
    state: &AppState,
    user_id: u64,
    is_admin: bool,
    is_verified: bool,
    payload: &str,
) -> anyhow::Result<()> {
    let chat = ChatId(user_id as i64);
    let claims = match state.tokens.decode(payload) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => {
            bot.send_message(chat, "❌ Verification failed: the token has expired.")
                .await?;
            return Ok(());
        }
        Err(TokenError::Invalid) => {
            bot.send_message(chat, "❌ Verification failed: the token is invalid.")
                .await?;
            return Ok(());
        }
    };

    if claims.kind != TokenKind::Success || !claims.verified || claims.user_id != user_id {
        bot.send_message(chat, "❌ Verification failed: the token does not match.")
            .await?;
        return Ok(());
    }

    if !is_admin && !is_verified {
        match state.verified.insert(user_id) {
            Ok(true) => info!("user {user_id} verified"),
            Ok(false) => {}
            Err(e) => warn!("persisting verification of {user_id} failed: {e}"),
        }
    }
    bot.send_message(chat, "✅ Verified! You can now talk to the bot normally.")
        .await?;
    Ok(())
}

/// Send a fresh verification link to an unverified user.
pub async fn send_verification_link(
    bot: &ThrottledBot,
    state: &AppState,
    user_id: u64,
) -> anyhow::Result<()> {
    let link = verification_link(state, user_id)?;
    let minutes = state.tokens.ttl_secs() / 60;
    bot.send_message(
        ChatId(user_id as i64),
        format!(
            "👋 Hi! To prevent spam, please complete a one-time human verification first:\n\n\
             ➡️ {link}\n\n\
             The link is valid for {minutes} minutes."
        ),
    )
    .await?;
    Ok(())
}

/// Verification-page URL embedding a freshly issued verify token.
pub fn verification_link(state: &AppState, user_id: u64) -> anyhow::Result<Url> {
    let (token, _exp) = state.tokens.issue_verify(user_id)?;
    let mut url = state.config.verify_url.clone();
    url.query_pairs_mut().append_pair("token", &token);
    Ok(url)
}
