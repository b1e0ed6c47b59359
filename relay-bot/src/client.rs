//! Chat platform abstraction.
//!
//! The relay and its commands only talk to the platform through
//! [`ChatClient`], so any transport (a real chat service, the console, a test
//! recorder) can drive them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake_id!(
    /// Platform identifier of a user
    UserId
);
snowflake_id!(
    /// Platform identifier of a text channel
    ChannelId
);
snowflake_id!(
    /// Platform identifier of a server
    GuildId
);

/// A chat user as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Server-specific nickname
    pub nick: Option<String>,
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nick: None,
            bot: false,
        }
    }

    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    pub fn as_bot(mut self) -> Self {
        self.bot = true;
        self
    }

    /// Nickname if set, else the account name
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.name)
    }

    /// Mention markup, e.g. `<@!42>`
    pub fn mention(&self) -> String {
        format!("<@!{}>", self.id)
    }
}

/// Where a message was posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// A server text channel
    Guild(ChannelId),
    /// A direct conversation with the given user
    Direct(UserId),
}

/// An incoming chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: User,
    pub channel: Channel,
    pub content: String,
}

impl Message {
    pub fn new(author: User, channel: Channel, content: impl Into<String>) -> Self {
        Self {
            author,
            channel,
            content: content.into(),
        }
    }
}

/// Errors reported by a chat client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to deliver message: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound operations the bot needs from a chat platform
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a message to a server channel
    async fn send_channel(&self, channel: ChannelId, text: &str) -> Result<(), ClientError>;

    /// Send a direct message to a user
    async fn send_direct(&self, user: UserId, text: &str) -> Result<(), ClientError>;

    /// Look up a member of a server
    async fn fetch_member(&self, guild: GuildId, user: UserId) -> Result<Option<User>, ClientError>;

    /// Check whether a user belongs to a server
    async fn is_guild_member(&self, guild: GuildId, user: UserId) -> Result<bool, ClientError> {
        Ok(self.fetch_member(guild, user).await?.is_some())
    }

    /// Answer in the conversation a message came from
    async fn reply(&self, message: &Message, text: &str) -> Result<(), ClientError> {
        match message.channel {
            Channel::Guild(channel) => self.send_channel(channel, text).await,
            Channel::Direct(user) => self.send_direct(user, text).await,
        }
    }
}

// ============================================================================
// Recording Client (for testing)
// ============================================================================

/// A message sent through a [`RecordingClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Channel(ChannelId, String),
    Direct(UserId, String),
}

/// Client that records outbound messages instead of delivering them
#[derive(Debug, Default)]
pub struct RecordingClient {
    /// Known server members
    members: Mutex<HashMap<UserId, User>>,
    /// Everything sent so far
    sent: Mutex<Vec<Sent>>,
    /// Refuse every send with a delivery error
    offline: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server member
    pub fn with_member(self, user: User) -> Self {
        self.members.lock().unwrap().insert(user.id, user);
        self
    }

    /// Make every send fail, as if the platform were unreachable
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn record(&self, sent: Sent) -> Result<(), ClientError> {
        if self.offline {
            return Err(ClientError::Delivery("client is offline".to_string()));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }

    /// Get all sent messages
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn send_channel(&self, channel: ChannelId, text: &str) -> Result<(), ClientError> {
        self.record(Sent::Channel(channel, text.to_string()))
    }

    async fn send_direct(&self, user: UserId, text: &str) -> Result<(), ClientError> {
        self.record(Sent::Direct(user, text.to_string()))
    }

    async fn fetch_member(&self, _guild: GuildId, user: UserId) -> Result<Option<User>, ClientError> {
        Ok(self.members.lock().unwrap().get(&user).cloned())
    }
}
