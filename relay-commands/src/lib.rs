//! # relay-commands: command routing for chat bots
//!
//! A tree of named commands and command groups, dispatched by the words of a
//! chat message and able to render its own help.
//!
//! ## Core Principles
//!
//! - **Total dispatch**: `execute` and `help` never fail; unknown commands,
//!   denied permissions and broken registrations become replies
//! - **Setup errors are errors**: bad names and duplicate keys surface as
//!   [`RegistryError`] while the tree is built
//! - **Context passthrough**: one caller-chosen context value reaches every
//!   permission check and the final handler
//! - **Sync or async handlers**: both are awaited the same way
//!
//! ## Quick Start
//!
//! ```
//! use relay_commands::{Args, Command, CommandGroup, GroupOptions};
//!
//! #[derive(Clone)]
//! struct Ctx {
//!     is_admin: bool,
//! }
//!
//! # fn main() -> Result<(), relay_commands::RegistryError> {
//! let mut root: CommandGroup<Ctx> = CommandGroup::root();
//! root.add_command(
//!     "ping",
//!     Command::from_fn(|_ctx: Ctx, _args: Args| "pong").summary("pong?"),
//! )?;
//!
//! let admin = root.add_command_group(
//!     "admin",
//!     GroupOptions::new()
//!         .summary("Moderation tools")
//!         .check_perms(|ctx: &Ctx| ctx.is_admin),
//! )?;
//! admin.add_command(
//!     "kick",
//!     Command::from_async(|_ctx: Ctx, args: Args| async move {
//!         format!("kicked {}", args.joined())
//!     }),
//! )?;
//!
//! let reply = futures::executor::block_on(root.execute("admin kick steve", Ctx { is_admin: true }));
//! assert_eq!(reply.as_text(), Some("kicked steve"));
//! # Ok(())
//! # }
//! ```

use std::fmt;

pub mod command;
pub mod error;
pub mod group;
pub mod help;
pub mod tracing_support;

pub use command::{Action, Args, Command, Metadata, Predicate};
pub use error::RegistryError;
pub use group::{Child, CommandGroup, GroupOptions, GroupPath};
pub use help::{Describe, HelpText, MISSING_HELP};

#[cfg(feature = "subscriber")]
pub use tracing_support::{init_subscriber, init_subscriber_with_config, TracingConfig, TracingFormat};

// ============================================================================
// Handler Errors
// ============================================================================

/// Result type for command handlers.
///
/// Handlers returning `HandlerResult<T>` have their errors rendered as a reply.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors raised inside command handlers.
///
/// Distinguishes between mistakes the user can fix and failures they can't.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// User-fixable errors, e.g. a missing argument.
    #[error("Error: {0}")]
    User(String),

    /// Failures of the bot or the chat platform.
    #[error("Internal Error: {0}")]
    System(String),
}

impl HandlerError {
    /// Convenience constructor for user errors.
    pub fn user(message: impl Into<String>) -> Self {
        HandlerError::User(message.into())
    }

    /// Convenience constructor for system errors.
    pub fn system(message: impl Into<String>) -> Self {
        HandlerError::System(message.into())
    }
}

// ============================================================================
// Reply Types
// ============================================================================

/// What a dispatch produced for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to send back.
    Silent,

    /// Text to send back to the user.
    Text(String),
}

impl Reply {
    /// Create a text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    /// Check if there is nothing to send.
    pub fn is_silent(&self) -> bool {
        matches!(self, Reply::Silent)
    }

    /// Borrow the text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Silent => None,
            Reply::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Silent => Ok(()),
            Reply::Text(text) => write!(f, "{}", text),
        }
    }
}

// ============================================================================
// Reply Conversion Trait
// ============================================================================

/// Trait for converting handler return values into replies.
///
/// Implemented for `String`, `&str`, `()`, `Option<T>` and `HandlerResult<T>`.
pub trait IntoReply {
    /// Convert into a reply.
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Reply {
        Reply::Text(self)
    }
}

impl IntoReply for &str {
    fn into_reply(self) -> Reply {
        Reply::Text(self.to_string())
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Reply {
        Reply::Silent
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Reply {
        match self {
            Some(value) => value.into_reply(),
            None => Reply::Silent,
        }
    }
}

impl<T: IntoReply> IntoReply for HandlerResult<T> {
    fn into_reply(self) -> Reply {
        match self {
            Ok(value) => value.into_reply(),
            Err(e) => {
                if let HandlerError::System(message) = &e {
                    tracing::error!(error = %message, "Command handler failed");
                }
                Reply::Text(e.to_string())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
