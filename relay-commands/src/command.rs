//! Leaf commands.
//!
//! A [`Command`] wraps one action with its help texts and metadata. Commands
//! are assembled with the builder methods below and become immutable once a
//! [`CommandGroup`](crate::CommandGroup) takes ownership of them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::help::{Describe, HelpText};
use crate::{IntoReply, Reply};

/// Returned when a command was registered without anything to run.
pub const MISSING_ACTION: &str = "Error could not find a callable in the command object.";

/// Permission check over the caller's context.
pub type Predicate<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

type SyncHandler<C> = Arc<dyn Fn(C, Args) -> Reply + Send + Sync>;
type AsyncHandler<C> = Arc<dyn Fn(C, Args) -> BoxFuture<'static, Reply> + Send + Sync>;

// ============================================================================
// Arguments
// ============================================================================

/// The words of a command line left over after routing.
///
/// `"admin kick steve now"` reaches the `kick` handler as `["steve", "now"]`.
/// Tokens are split on single spaces and passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(pub Vec<String>);

impl Args {
    /// Collect tokens into arguments.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Args(tokens.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// The arguments as originally typed, rejoined with single spaces.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

// ============================================================================
// Actions
// ============================================================================

/// What a command runs.
///
/// Both variants are invoked through [`Action::invoke`], which always awaits,
/// so dispatch does not care which one it holds.
pub enum Action<C> {
    /// Runs to completion without suspending.
    Sync(SyncHandler<C>),

    /// Returns a future the dispatcher awaits.
    Async(AsyncHandler<C>),
}

impl<C: Send + 'static> Action<C> {
    /// Wrap a plain function.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(C, Args) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        Action::Sync(Arc::new(move |ctx, args| f(ctx, args).into_reply()))
    }

    /// Wrap an async function.
    pub fn from_async<F, Fut, R>(f: F) -> Self
    where
        F: Fn(C, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoReply,
    {
        Action::Async(Arc::new(move |ctx, args| {
            let fut = f(ctx, args);
            async move { fut.await.into_reply() }.boxed()
        }))
    }

    /// Run the action, suspending if it does.
    pub async fn invoke(&self, ctx: C, args: Args) -> Reply {
        match self {
            Action::Sync(handler) => handler(ctx, args),
            Action::Async(handler) => handler(ctx, args).await,
        }
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        match self {
            Action::Sync(handler) => Action::Sync(Arc::clone(handler)),
            Action::Async(handler) => Action::Async(Arc::clone(handler)),
        }
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sync(_) => f.write_str("Sync(..)"),
            Action::Async(_) => f.write_str("Async(..)"),
        }
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Per-node settings shared by commands and groups.
pub struct Metadata<C> {
    /// Checked before the node runs (or, for a group, before routing into it).
    /// `None` allows everyone.
    pub check_perms: Option<Predicate<C>>,

    /// Whether the registration key only matches its exact casing.
    pub case_sensitive: bool,
}

impl<C> Metadata<C> {
    /// Evaluate the permission predicate for a caller.
    pub fn allows(&self, ctx: &C) -> bool {
        self.check_perms.as_ref().map_or(true, |check| check(ctx))
    }
}

impl<C> Default for Metadata<C> {
    fn default() -> Self {
        Self {
            check_perms: None,
            case_sensitive: false,
        }
    }
}

impl<C> Clone for Metadata<C> {
    fn clone(&self) -> Self {
        Self {
            check_perms: self.check_perms.clone(),
            case_sensitive: self.case_sensitive,
        }
    }
}

impl<C> fmt::Debug for Metadata<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("check_perms", &self.check_perms.is_some())
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

// ============================================================================
// Command
// ============================================================================

/// A leaf of the command tree.
///
/// # Example
///
/// ```
/// use relay_commands::{Args, Command};
///
/// let echo: Command<()> = Command::from_fn(|_: (), args: Args| args.joined())
///     .summary("Echo the arguments")
///     .full("Echo the arguments\nE.g: `echo hello world`");
/// assert!(!echo.is_case_sensitive());
/// ```
pub struct Command<C> {
    action: Option<Action<C>>,
    summary: Option<HelpText<C>>,
    full: Option<HelpText<C>>,
    metadata: Metadata<C>,
}

impl<C> Command<C> {
    /// Create a command running `action`.
    pub fn new(action: Action<C>) -> Self {
        Self {
            action: Some(action),
            summary: None,
            full: None,
            metadata: Metadata::default(),
        }
    }

    /// Create a command with nothing to run.
    ///
    /// Executing it replies with [`MISSING_ACTION`]. Useful as a help-only
    /// entry.
    pub fn without_action() -> Self {
        Self {
            action: None,
            summary: None,
            full: None,
            metadata: Metadata::default(),
        }
    }

    /// Set the short help.
    pub fn summary(mut self, help: impl Into<HelpText<C>>) -> Self {
        self.summary = Some(help.into());
        self
    }

    /// Set the detailed help shown by `help <command>`.
    pub fn full(mut self, help: impl Into<HelpText<C>>) -> Self {
        self.full = Some(help.into());
        self
    }

    /// Restrict the command to callers passing `check`.
    pub fn check_perms<F>(mut self, check: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.metadata.check_perms = Some(Arc::new(check));
        self
    }

    /// Only match the name with its exact casing.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.metadata.case_sensitive = case_sensitive;
        self
    }

    pub fn metadata(&self) -> &Metadata<C> {
        &self.metadata
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.metadata.case_sensitive
    }

    pub fn action(&self) -> Option<&Action<C>> {
        self.action.as_ref()
    }
}

impl<C: Send + 'static> Command<C> {
    /// Shorthand for `Command::new(Action::from_fn(f))`.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(C, Args) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        Self::new(Action::from_fn(f))
    }

    /// Shorthand for `Command::new(Action::from_async(f))`.
    pub fn from_async<F, Fut, R>(f: F) -> Self
    where
        F: Fn(C, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoReply,
    {
        Self::new(Action::from_async(f))
    }

    /// Run the command's action.
    pub async fn execute(&self, ctx: C, args: Args) -> Reply {
        match &self.action {
            Some(action) => action.invoke(ctx, args).await,
            None => {
                tracing::warn!("Command executed without an action");
                Reply::text(MISSING_ACTION)
            }
        }
    }
}

impl<C> Describe<C> for Command<C> {
    fn summary(&self) -> Option<&HelpText<C>> {
        self.summary.as_ref()
    }

    fn full(&self) -> Option<&HelpText<C>> {
        self.full.as_ref()
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("action", &self.action)
            .field("summary", &self.summary)
            .field("full", &self.full)
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerError;

    #[tokio::test]
    async fn test_sync_action_runs() {
        let cmd: Command<u32> = Command::from_fn(|n: u32, args: Args| format!("{} {}", n, args.joined()));
        let reply = cmd.execute(3, Args::from_tokens(["a", "b"])).await;
        assert_eq!(reply.as_text(), Some("3 a b"));
    }

    #[tokio::test]
    async fn test_async_action_runs() {
        let cmd: Command<u32> = Command::from_async(|n: u32, _args: Args| async move {
            tokio::task::yield_now().await;
            (n * 2).to_string()
        });
        let reply = cmd.execute(21, Args::default()).await;
        assert_eq!(reply.as_text(), Some("42"));
    }

    #[tokio::test]
    async fn test_missing_action_replies_with_error_text() {
        let cmd: Command<()> = Command::without_action().summary("nothing here");
        let reply = cmd.execute((), Args::default()).await;
        assert_eq!(reply.as_text(), Some(MISSING_ACTION));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_reply() {
        let cmd: Command<()> = Command::from_fn(|_: (), args: Args| {
            if args.is_empty() {
                return Err(HandlerError::user("Missing name"));
            }
            Ok(args.joined())
        });
        let reply = cmd.execute((), Args::default()).await;
        assert_eq!(reply.as_text(), Some("Error: Missing name"));
    }

    #[test]
    fn test_metadata_defaults_allow_everyone() {
        let meta: Metadata<()> = Metadata::default();
        assert!(meta.allows(&()));
        assert!(!meta.case_sensitive);
    }

    #[test]
    fn test_check_perms_uses_context() {
        let cmd: Command<bool> = Command::without_action().check_perms(|allowed: &bool| *allowed);
        assert!(cmd.metadata().allows(&true));
        assert!(!cmd.metadata().allows(&false));
    }

    #[test]
    fn test_args_accessors() {
        let args = Args::from_tokens(["steve", "", "hello"]);
        assert_eq!(args.len(), 3);
        assert_eq!(args.first(), Some("steve"));
        assert_eq!(args.get(1), Some(""));
        assert_eq!(args.joined(), "steve  hello");
    }
}
