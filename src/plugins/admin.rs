//! Administrator command handlers.
//!
//! Every command produces exactly one reply to the admin describing the
//! outcome: changed, unchanged, or malformed usage.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::warn;

use super::AdminCommand;
use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Most ids /banlist shows before the list is elided.
const BANLIST_DISPLAY_CAP: usize = 500;

pub async fn handle_command(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    cmd: AdminCommand,
) -> anyhow::Result<()> {
    match cmd {
        AdminCommand::Help => help(bot, state).await,
        AdminCommand::Ban(args) => ban(bot, msg, state, &args, true).await,
        AdminCommand::Unban(args) | AdminCommand::Allow(args) => {
            ban(bot, msg, state, &args, false).await
        }
        AdminCommand::Banlist => banlist(bot, state).await,
        AdminCommand::Badadd(entry) => badadd(bot, state, &entry).await,
        AdminCommand::Baddel(entry) => baddel(bot, state, &entry).await,
    }
}

async fn help(bot: &ThrottledBot, state: &AppState) -> anyhow::Result<()> {
    let text = "🤖 <b>Admin commands</b>\n\
        /help - this reference\n\
        /ban &lt;user_id&gt; - ban a user, or reply to a forwarded message with /ban\n\
        /unban &lt;user_id&gt; or /allow &lt;user_id&gt; - lift a ban\n\
        /banlist - list banned users\n\
        /badadd &lt;entry&gt; - add a blocked word\n\
        /baddel &lt;entry&gt; - remove a blocked word";
    bot.send_message(state.admin_chat(), text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Resolve the target of a ban-style command: an explicit numeric argument,
/// or the routed sender of the replied-to message.
fn resolve_target(msg: &Message, state: &AppState, args: &str) -> Option<u64> {
    let args = args.trim();
    if !args.is_empty() && args.bytes().all(|b| b.is_ascii_digit()) {
        return args.parse().ok();
    }
    let replied = msg.reply_to_message()?;
    state.routes.get(replied.id.0).map(|route| route.user_id)
}

async fn ban(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    args: &str,
    banning: bool,
) -> anyhow::Result<()> {
    let Some(target) = resolve_target(msg, state, args) else {
        bot.send_message(
            state.admin_chat(),
            "Usage:\n/ban <user_id>, or reply to a forwarded message or info card with /ban\n\
             /unban <user_id> or /allow <user_id>",
        )
        .await?;
        return Ok(());
    };

    let reply = if banning {
        match state.banned.insert(target) {
            Ok(true) => format!("🔒 Banned user_id={target}"),
            Ok(false) => "ℹ️ Already on the ban list.".to_string(),
            Err(e) => {
                warn!("persisting ban of {target} failed: {e}");
                "⚠️ Could not persist the ban, check the logs.".to_string()
            }
        }
    } else {
        match state.banned.remove(target) {
            Ok(true) => format!("✅ Unbanned user_id={target}"),
            Ok(false) => "ℹ️ Not on the ban list.".to_string(),
            Err(e) => {
                warn!("persisting unban of {target} failed: {e}");
                "⚠️ Could not persist the unban, check the logs.".to_string()
            }
        }
    };
    bot.send_message(state.admin_chat(), reply).await?;
    Ok(())
}

async fn banlist(bot: &ThrottledBot, state: &AppState) -> anyhow::Result<()> {
    let ids = state.banned.all();
    if ids.is_empty() {
        bot.send_message(state.admin_chat(), "The ban list is empty.")
            .await?;
        return Ok(());
    }
    let shown: Vec<String> = ids
        .iter()
        .take(BANLIST_DISPLAY_CAP)
        .map(|id| format!("<code>{id}</code>"))
        .collect();
    let mut text = format!("🔒 {} banned:\n{}", ids.len(), shown.join("\n"));
    if ids.len() > BANLIST_DISPLAY_CAP {
        text.push_str(&format!("\n… and {} more", ids.len() - BANLIST_DISPLAY_CAP));
    }
    bot.send_message(state.admin_chat(), text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn badadd(bot: &ThrottledBot, state: &AppState, entry: &str) -> anyhow::Result<()> {
    let reply = if entry.trim().is_empty() {
        format!(
            "Usage: /badadd <entry> (or edit {} directly)",
            state.bad_words.path().display()
        )
    } else {
        match state.bad_words.add(entry) {
            Ok(true) => "✅ Added.".to_string(),
            Ok(false) => "ℹ️ Not added: already present.".to_string(),
            Err(e) => {
                warn!("writing word list failed: {e}");
                "⚠️ Not added: write failed, check the logs.".to_string()
            }
        }
    };
    bot.send_message(state.admin_chat(), reply).await?;
    Ok(())
}

async fn baddel(bot: &ThrottledBot, state: &AppState, entry: &str) -> anyhow::Result<()> {
    let reply = if entry.trim().is_empty() {
        format!(
            "Usage: /baddel <entry> (or edit {} directly)",
            state.bad_words.path().display()
        )
    } else {
        match state.bad_words.remove(entry) {
            Ok(true) => "✅ Removed.".to_string(),
            Ok(false) => "ℹ️ Not removed: no such entry.".to_string(),
            Err(e) => {
                warn!("writing word list failed: {e}");
                "⚠️ Not removed: write failed, check the logs.".to_string()
            }
        }
    };
    bot.send_message(state.admin_chat(), reply).await?;
    Ok(())
}
