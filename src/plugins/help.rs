//! /help for regular users.

use teloxide::prelude::*;

use super::start;
use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Verified users get usage instructions; unverified users get a fresh
/// verification link.
pub async fn user_help(bot: &ThrottledBot, state: &AppState, user_id: u64) -> anyhow::Result<()> {
    let chat = ChatId(user_id as i64);
    if state.verified.contains(user_id) {
        bot.send_message(
            chat,
            "🤖 Help\nSend me a message and I will pass it to the administrator. \
             Replies come back here.",
        )
        .await?;
        return Ok(());
    }

    let link = start::verification_link(state, user_id)?;
    bot.send_message(
        chat,
        format!(
            "🤖 Help\nFirst-time users need a one-time human verification:\n\
             ➡️ {link}\n\
             Come back once you have passed it."
        ),
    )
    .await?;
    Ok(())
}
