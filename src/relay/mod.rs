//! Inbound update dispatch.
//!
//! Every private-chat message runs through one ordered pass; each stage
//! either consumes the update or falls through to the next. Banned and
//! rate-limited senders are dropped before any outbound call is built, so a
//! prober cannot tell a ban from plain silence.

mod content;
mod forward;
mod reply;

pub use content::RelayContent;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::debug;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::plugins::{self, AdminCommand};

pub async fn handle_message(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    // Private chats only, and the chat must be the sender's own.
    let Some(from) = msg.from.clone() else {
        return Ok(());
    };
    if !msg.chat.is_private() || msg.chat.id.0 != from.id.0 as i64 {
        return Ok(());
    }

    let user_id = from.id.0;
    let is_admin = state.is_admin(user_id);

    // Other bots cannot initiate conversations unless explicitly allowed.
    if !is_admin && from.is_bot && !state.config.allow_bot_initiated {
        return Ok(());
    }

    // Banned senders get total silence: no reply, no bookkeeping.
    if !is_admin && state.banned.contains(user_id) {
        debug!("ignoring message from banned user {user_id}");
        return Ok(());
    }

    if !is_admin && state.rate_limiter.hit(user_id) {
        debug!("rate limited user {user_id}");
        return Ok(());
    }

    let text = msg.text().map(str::trim).unwrap_or("");

    if is_admin && text.starts_with('/') {
        if let Ok(cmd) = AdminCommand::parse(text, state.bot_username.as_str()) {
            return plugins::admin::handle_command(&bot, &msg, &state, cmd).await;
        }
    }

    if !is_admin && is_command(text, "help") {
        return plugins::help::user_help(&bot, &state, user_id).await;
    }

    // The word filter looks at text and caption together. The matched entry
    // is never echoed back.
    if !is_admin {
        let composite = format!("{}\n{}", text, msg.caption().unwrap_or("").trim());
        if state.bad_words.matches(&composite) {
            debug!("message from {user_id} blocked by word filter");
            bot.send_message(
                msg.chat.id,
                "⚠️ Your message contains blocked content and was not delivered.",
            )
            .await?;
            return Ok(());
        }
    }

    let is_verified = is_admin || state.verified.contains(user_id);

    if is_command(text, "start") {
        return plugins::start::handle_start(&bot, &state, user_id, is_admin, is_verified, text)
            .await;
    }

    if is_admin {
        if let Some(replied) = msg.reply_to_message() {
            return reply::relay_admin_reply(&bot, &state, &msg, replied).await;
        }
    }

    if !is_admin && !is_verified {
        return plugins::start::send_verification_link(&bot, &state, user_id).await;
    }

    if !is_admin {
        return forward::forward_to_admin(&bot, &state, &msg, &from).await;
    }

    // An admin message that replies to nothing we can route.
    bot.send_message(
        msg.chat.id,
        "📌 Reply to a forwarded message or an info card to answer the sender.",
    )
    .await?;
    Ok(())
}

/// First-token command check, tolerating an `@botname` suffix.
fn is_command(text: &str, name: &str) -> bool {
    let Some(first) = text.split_whitespace().next() else {
        return false;
    };
    let Some(cmd) = first.strip_prefix('/') else {
        return false;
    };
    cmd.split('@').next().is_some_and(|c| c.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_detection() {
        assert!(is_command("/start", "start"));
        assert!(is_command("/start abc123", "start"));
        assert!(is_command("/START", "start"));
        assert!(is_command("/help@RelayCatBot", "help"));
        assert!(!is_command("/started", "start"));
        assert!(!is_command("start", "start"));
        assert!(!is_command("", "start"));
    }
}
