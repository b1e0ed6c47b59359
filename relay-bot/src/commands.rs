//! The bot's commands.

use std::sync::LazyLock;

use regex::Regex;
use relay_commands::{Args, Command, CommandGroup, HandlerError, HandlerResult, RegistryError};
use tracing::{debug, info};

use crate::client::UserId;
use crate::relay::BotContext;

/// Leading text up to and including the first user mention
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<]*<@!?(\d+)>").expect("mention pattern is valid"));

const REPLY_SUMMARY: &str = "Reply to a user's message using `reply @USER ...`";
const REPLY_FULL: &str =
    "Reply to a user's message using `reply @USER ...`\nE.g: `reply @steve Hello world!`";

const SEND_SUMMARY: &str = "Send a message to the output channel using `send ...`";
const SEND_FULL: &str =
    "Send a message to the output channel using `send ...`\nE.g: `send The answers are now posted!`";

/// Build the root command tree
pub fn build_commands() -> Result<CommandGroup<BotContext>, RegistryError> {
    let mut root = CommandGroup::root();

    root.add_command(
        "reply",
        Command::from_async(reply)
            .summary(REPLY_SUMMARY)
            .full(REPLY_FULL),
    )?;
    root.add_command(
        "send",
        Command::from_async(send).summary(SEND_SUMMARY).full(SEND_FULL),
    )?;

    info!(commands = root.len(), "Command tree built");
    Ok(root)
}

/// DM a server member on behalf of whoever typed the command
async fn reply(ctx: BotContext, args: Args) -> HandlerResult<()> {
    let text = args.joined();
    let Some(captures) = MENTION.captures(&text) else {
        return Err(HandlerError::user(
            "Mention the user to reply to, e.g. `reply @steve Hello`",
        ));
    };

    let user_id = captures[1]
        .parse::<u64>()
        .map(UserId)
        .map_err(|_| HandlerError::user("That mention does not name a valid user"))?;
    let body = text[captures[0].len()..].trim();

    let member = ctx
        .client
        .fetch_member(ctx.guild, user_id)
        .await
        .map_err(|e| HandlerError::system(e.to_string()))?;

    match member {
        Some(member) if !body.is_empty() => {
            let message = format!("{} replied:\n{}", ctx.message.author.display_name(), body);
            ctx.client
                .send_direct(member.id, &message)
                .await
                .map_err(|e| HandlerError::system(e.to_string()))?;
            info!(to = %member.id, from = %ctx.message.author.id, "Reply delivered");
        }
        Some(_) => debug!(to = %user_id, "Empty reply not sent"),
        None => debug!(to = %user_id, "Reply target is not a member"),
    }
    Ok(())
}

/// Post a message to the output channel as the bot
async fn send(ctx: BotContext, args: Args) -> HandlerResult<()> {
    let text = args.joined();
    let text = text.trim();
    if text.is_empty() {
        return Err(HandlerError::user(
            "Nothing to send, e.g. `send The answers are now posted!`",
        ));
    }

    ctx.client
        .send_channel(ctx.output_channel, text)
        .await
        .map_err(|e| HandlerError::system(e.to_string()))?;
    info!(channel = %ctx.output_channel, "Message sent");
    Ok(())
}
