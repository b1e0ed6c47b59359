//! Message relay.
//!
//! Decides what happens to every incoming message: commands typed in the
//! input channel go to the command tree, direct messages from server members
//! are forwarded to the output channel, everything else is dropped.

use std::sync::Arc;

use relay_commands::{CommandGroup, Reply};
use tracing::{debug, info, instrument};

use crate::client::{Channel, ChannelId, ChatClient, ClientError, GuildId, Message};
use crate::config::RelayConfig;

/// Sent to people who DM the bot without being in the server
pub const NOT_A_MEMBER: &str =
    "You don't appear to be in the server. You need to be in the server to ask questions.";

/// Context handed to every command and permission check
#[derive(Clone)]
pub struct BotContext {
    pub client: Arc<dyn ChatClient>,
    /// The message that triggered the command
    pub message: Message,
    /// The command line with the prefix removed
    pub command_line: String,
    pub guild: GuildId,
    pub output_channel: ChannelId,
}

/// What the relay did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Not for the bot
    Ignored,
    /// A DM from someone outside the server
    Rejected,
    /// Handled as a command
    Command,
    /// Forwarded to the output channel
    Forwarded,
}

/// Routes incoming messages
pub struct Relay {
    commands: Arc<CommandGroup<BotContext>>,
    client: Arc<dyn ChatClient>,
    settings: RelayConfig,
}

impl Relay {
    pub fn new(
        commands: Arc<CommandGroup<BotContext>>,
        client: Arc<dyn ChatClient>,
        settings: RelayConfig,
    ) -> Self {
        Self {
            commands,
            client,
            settings,
        }
    }

    pub fn settings(&self) -> &RelayConfig {
        &self.settings
    }

    /// Handle one incoming message
    #[instrument(skip_all, fields(author = %message.author.id))]
    pub async fn on_message(&self, message: Message) -> Result<RelayOutcome, ClientError> {
        if message.author.bot {
            return Ok(RelayOutcome::Ignored);
        }

        match message.channel {
            Channel::Guild(channel) if channel != self.settings.input_channel => {
                Ok(RelayOutcome::Ignored)
            }
            Channel::Guild(_) => match message.content.strip_prefix(&self.settings.prefix) {
                Some(line) => {
                    self.handle_command(&message, line).await?;
                    Ok(RelayOutcome::Command)
                }
                None => Ok(RelayOutcome::Ignored),
            },
            Channel::Direct(_) => {
                let member = self
                    .client
                    .is_guild_member(self.settings.guild_id, message.author.id)
                    .await?;
                if !member {
                    info!("Rejected direct message from non-member");
                    self.client.reply(&message, NOT_A_MEMBER).await?;
                    return Ok(RelayOutcome::Rejected);
                }

                let relayed = format!("{} sent:\n{}", message.author.mention(), message.content);
                self.client
                    .send_channel(self.settings.output_channel, &relayed)
                    .await?;
                info!(channel = %self.settings.output_channel, "Forwarded direct message");
                Ok(RelayOutcome::Forwarded)
            }
        }
    }

    /// Run a command line typed in the input channel and answer there.
    ///
    /// A line starting with `help` (any casing) renders help for the rest of
    /// the line instead of executing it.
    pub async fn handle_command(&self, message: &Message, line: &str) -> Result<(), ClientError> {
        let ctx = BotContext {
            client: Arc::clone(&self.client),
            message: message.clone(),
            command_line: line.to_string(),
            guild: self.settings.guild_id,
            output_channel: self.settings.output_channel,
        };

        let (first, rest) = line.split_once(' ').unwrap_or((line, ""));
        if first.to_lowercase() == "help" {
            debug!(query = %rest, "Rendering help");
            let help = self.commands.help(rest, &ctx);
            return self.client.reply(message, &help).await;
        }

        debug!(command = %line, "Executing command");
        match self.commands.execute(line, ctx).await {
            Reply::Text(text) => self.client.reply(message, &text).await,
            Reply::Silent => Ok(()),
        }
    }
}
