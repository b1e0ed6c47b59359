//! Help text and the describable contract.
//!
//! Every node of the command tree, leaf or group, can describe itself with a
//! short summary and an optional long form. Either may be a literal string or
//! computed from the caller's context at render time.

use std::fmt;
use std::sync::Arc;

/// Returned when a node has neither a usable full text nor a summary.
pub const MISSING_HELP: &str = "Error could not find the command's help.";

/// Help text that is either fixed or derived from the caller's context.
pub enum HelpText<C> {
    /// A fixed string.
    Literal(String),

    /// A function of the caller's context.
    Dynamic(Arc<dyn Fn(&C) -> String + Send + Sync>),
}

impl<C> HelpText<C> {
    /// Build help text from a closure over the caller's context.
    ///
    /// # Example
    ///
    /// ```
    /// use relay_commands::HelpText;
    ///
    /// let help: HelpText<String> = HelpText::dynamic(|user: &String| format!("Hello {user}"));
    /// assert_eq!(help.render(&"steve".to_string()).as_deref(), Some("Hello steve"));
    /// ```
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&C) -> String + Send + Sync + 'static,
    {
        HelpText::Dynamic(Arc::new(f))
    }

    /// Produce the text for a caller.
    ///
    /// An empty literal counts as no help at all, so the caller falls back to
    /// the next candidate.
    pub fn render(&self, ctx: &C) -> Option<String> {
        match self {
            HelpText::Literal(text) if text.is_empty() => None,
            HelpText::Literal(text) => Some(text.clone()),
            HelpText::Dynamic(f) => Some(f(ctx)),
        }
    }
}

impl<C> Clone for HelpText<C> {
    fn clone(&self) -> Self {
        match self {
            HelpText::Literal(text) => HelpText::Literal(text.clone()),
            HelpText::Dynamic(f) => HelpText::Dynamic(Arc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for HelpText<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelpText::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            HelpText::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<C> From<&str> for HelpText<C> {
    fn from(text: &str) -> Self {
        HelpText::Literal(text.to_string())
    }
}

impl<C> From<String> for HelpText<C> {
    fn from(text: String) -> Self {
        HelpText::Literal(text)
    }
}

/// Anything that can answer "what is your help text".
///
/// Implementors only expose their stored texts; the selection rule lives in
/// [`Describe::individual_help`].
pub trait Describe<C> {
    /// Short, one-line help.
    fn summary(&self) -> Option<&HelpText<C>>;

    /// Detailed help. Groups have none.
    fn full(&self) -> Option<&HelpText<C>> {
        None
    }

    /// Full help when asked for and available, else the summary, else
    /// [`MISSING_HELP`].
    fn individual_help(&self, ctx: &C, want_full: bool) -> String {
        let full = if want_full {
            self.full().and_then(|help| help.render(ctx))
        } else {
            None
        };

        full.or_else(|| self.summary().and_then(|help| help.render(ctx)))
            .unwrap_or_else(|| MISSING_HELP.to_string())
    }
}
