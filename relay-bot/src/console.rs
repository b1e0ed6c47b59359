//! Console transport.
//!
//! Runs the relay against stdin/stdout instead of a chat service. Each input
//! line is a message from the console user in the input channel; lines
//! starting with `dm ` are direct messages to the bot instead.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::client::{Channel, ChannelId, ChatClient, ClientError, GuildId, Message, User, UserId};
use crate::relay::Relay;

/// Client printing every outbound message to a writer.
///
/// Every user counts as a server member.
pub struct ConsoleClient<W> {
    out: Mutex<W>,
}

impl ConsoleClient<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> ConsoleClient<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn print(&self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = format!("[{}] {}\n", target, text);
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> ChatClient for ConsoleClient<W> {
    async fn send_channel(&self, channel: ChannelId, text: &str) -> Result<(), ClientError> {
        self.print(&format!("#{}", channel), text).await
    }

    async fn send_direct(&self, user: UserId, text: &str) -> Result<(), ClientError> {
        self.print(&format!("dm @{}", user), text).await
    }

    async fn fetch_member(&self, _guild: GuildId, user: UserId) -> Result<Option<User>, ClientError> {
        Ok(Some(User::new(user, format!("user{}", user))))
    }
}

/// Turn a console line into a message from `author`
pub fn console_message(author: &User, input_channel: ChannelId, line: &str) -> Message {
    match line.strip_prefix("dm ") {
        Some(content) => Message::new(author.clone(), Channel::Direct(author.id), content),
        None => Message::new(author.clone(), Channel::Guild(input_channel), line),
    }
}

/// Feed lines from `input` to the relay until end of input
pub async fn run_console<R>(relay: &Relay, author: User, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let input_channel = relay.settings().input_channel;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message = console_message(&author, input_channel, &line);
        match relay.on_message(message).await {
            Ok(outcome) => info!(?outcome, "Message handled"),
            Err(e) => error!(error = %e, "Failed to handle message"),
        }
    }

    info!("Console input closed");
    Ok(())
}
