//! Verified-user inbound path: forward to the admin plus an info card.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, User};
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::{full_name, html_escape};

/// Forward a verified user's message to the admin verbatim, then attach an
/// info card as a reply to the forwarded copy. Both admin-side message ids
/// are recorded in the routing table so replying to either reaches the
/// sender.
pub async fn forward_to_admin(
    bot: &ThrottledBot,
    state: &AppState,
    msg: &Message,
    from: &User,
) -> anyhow::Result<()> {
    let admin = state.admin_chat();
    let forwarded = match bot.forward_message(admin, msg.chat.id, msg.id).await {
        Ok(m) => m,
        Err(e) => {
            warn!("forwarding message {} from {} failed: {e}", msg.id.0, from.id);
            return Ok(());
        }
    };
    if let Err(e) = state.routes.put(forwarded.id.0, from.id.0, msg.id.0) {
        warn!("recording route for forwarded message failed: {e}");
    }

    let card = info_card(from);
    match bot
        .send_message(admin, card)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(forwarded.id))
        .await
    {
        Ok(card_msg) => {
            if let Err(e) = state.routes.put(card_msg.id.0, from.id.0, msg.id.0) {
                warn!("recording route for info card failed: {e}");
            }
        }
        Err(e) => warn!("sending info card for {} failed: {e}", from.id),
    }
    Ok(())
}

/// HTML info card describing the sender of a forwarded message.
fn info_card(user: &User) -> String {
    let username = user
        .username
        .as_deref()
        .map(|u| format!("@{u}"))
        .unwrap_or_else(|| "(none)".to_string());
    let mut name = full_name(&user.first_name, user.last_name.as_deref());
    if name.is_empty() {
        name = "(none)".to_string();
    }
    if user.is_premium {
        name.push_str(" ⭐️");
    }
    format!(
        "👤 <b>User info</b>\n\
         ID: <code>{}</code>\n\
         Username: <b>{}</b>\n\
         Name: <b>{}</b>\n\
         <i>Reply to this card or the forwarded message above to answer.</i>",
        user.id.0,
        html_escape(&username),
        html_escape(&name)
    )
}
