//! Admin reply relay back to the original sender.
//!
//! When the admin replies to a forwarded message or an info card, the routing
//! table resolves the original sender and the relay re-sends the admin's
//! content there, referencing the sender's original message. If that message
//! is gone, the relay is retried once without the reference.

use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::debug;

use super::content::RelayContent;
use crate::bot::dispatcher::{AppState, ThrottledBot};

pub async fn relay_admin_reply(
    bot: &ThrottledBot,
    state: &AppState,
    msg: &Message,
    replied: &Message,
) -> anyhow::Result<()> {
    let admin = state.admin_chat();
    let Some(route) = state.routes.get(replied.id.0) else {
        bot.send_message(
            admin,
            "⚠️ No route for that message. Reply to a forwarded message or its info card.",
        )
        .await?;
        return Ok(());
    };

    let content = RelayContent::from_message(msg);
    if matches!(content, RelayContent::Unsupported) {
        bot.send_message(
            admin,
            format!(
                "⚠️ This content type cannot be relayed to user_id={} yet.",
                route.user_id
            ),
        )
        .await?;
        return Ok(());
    }

    let dest = ChatId(route.user_id as i64);
    let reply_to = MessageId(route.src_msg_id);
    match content.send(bot, dest, Some(reply_to)).await {
        Ok(_) => Ok(()),
        Err(err) if is_reply_not_found(&err) => {
            debug!(
                "original message {} of user {} is gone, retrying standalone",
                reply_to.0, route.user_id
            );
            match content.send(bot, dest, None).await {
                Ok(_) => {
                    bot.send_message(
                        admin,
                        format!(
                            "ℹ️ Delivered to user_id={} without the reply reference.\nOriginal error: {err}",
                            route.user_id
                        ),
                    )
                    .await?;
                    Ok(())
                }
                Err(retry_err) => {
                    report_failure(
                        bot,
                        state,
                        &content,
                        route.user_id,
                        &format!("{err} / retry failed: {retry_err}"),
                    )
                    .await
                }
            }
        }
        Err(err) => report_failure(bot, state, &content, route.user_id, &err.to_string()).await,
    }
}

/// Tell the admin a relay failed, including the API method and a hint when
/// the user appears to have blocked the bot.
async fn report_failure(
    bot: &ThrottledBot,
    state: &AppState,
    content: &RelayContent,
    user_id: u64,
    description: &str,
) -> anyhow::Result<()> {
    let hint = if description.to_lowercase().contains("blocked by the user") {
        "\nThe user may have blocked the bot."
    } else {
        ""
    };
    bot.send_message(
        state.admin_chat(),
        format!(
            "❗️ Delivery failed\nuser_id: {user_id}\nmethod: {}\nerror: {description}{hint}",
            content.method_name()
        ),
    )
    .await?;
    Ok(())
}

/// The Bot API reports a missing reply target only through its description
/// text, so match on that rather than an error variant.
fn is_reply_not_found(err: &RequestError) -> bool {
    let description = err.to_string().to_lowercase();
    description.contains("reply") && description.contains("not found")
}
