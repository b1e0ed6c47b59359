//! relay-bot: a chat bot relaying direct messages to a moderator channel
//!
//! Server members DM the bot; their messages show up in an output channel.
//! Moderators answer from an input channel with commands such as
//! `!reply @user ...`, routed through a [`relay_commands::CommandGroup`].

pub mod client;
pub mod commands;
pub mod config;
pub mod console;
pub mod relay;

pub use client::{Channel, ChannelId, ChatClient, ClientError, GuildId, Message, User, UserId};
pub use commands::build_commands;
pub use config::{BotConfig, ConfigError, RelayConfig};
pub use relay::{BotContext, Relay, RelayOutcome};
