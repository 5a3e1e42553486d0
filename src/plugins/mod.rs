//! Command handlers.
//!
//! Add new admin commands by:
//! 1. Adding a variant to `AdminCommand` below
//! 2. Handling it in `admin::handle_command`

pub mod admin;
pub mod help;
pub mod start;

use teloxide::utils::command::BotCommands;

/// Commands the administrator can issue in the bot chat. Anything else falls
/// through to the reply-relay path.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommand {
    #[command(description = "show the admin command reference")]
    Help,

    #[command(description = "ban a user id")]
    Ban(String),

    #[command(description = "lift a ban")]
    Unban(String),

    #[command(description = "lift a ban (alias)")]
    Allow(String),

    #[command(description = "list banned users")]
    Banlist,

    #[command(description = "add a blocked word")]
    Badadd(String),

    #[command(description = "remove a blocked word")]
    Baddel(String),
}
