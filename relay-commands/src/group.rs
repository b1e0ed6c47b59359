//! Command groups: the inner nodes of the command tree.
//!
//! A group maps words to commands or nested groups. Dispatch takes the first
//! word of a line, resolves it, checks the permission of what it found and
//! then either runs the command or hands the rest of the line to the nested
//! group.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::command::{Args, Command, Metadata};
use crate::error::RegistryError;
use crate::help::{Describe, HelpText};
use crate::Reply;

/// Reply for an unresolved word in the root group, and for any unresolved help
/// query.
pub const UNKNOWN_COMMAND: &str = "Unknown command. Use \"help\" to get a list of commands.";

/// Reply when a permission predicate denies the caller.
pub const PERMISSION_DENIED: &str = "Error insufficient permissions for this command.";

/// Last line of every rendered group help.
pub const HELP_HINT: &str = "To learn more about a command, use `help <command>`";

/// An entry of a group.
pub enum Child<C> {
    Leaf(Command<C>),
    Group(CommandGroup<C>),
}

impl<C> Child<C> {
    pub fn metadata(&self) -> &Metadata<C> {
        match self {
            Child::Leaf(command) => command.metadata(),
            Child::Group(group) => group.metadata(),
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.metadata().case_sensitive
    }

    pub fn as_command(&self) -> Option<&Command<C>> {
        match self {
            Child::Leaf(command) => Some(command),
            Child::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&CommandGroup<C>> {
        match self {
            Child::Leaf(_) => None,
            Child::Group(group) => Some(group),
        }
    }
}

impl<C> Describe<C> for Child<C> {
    fn summary(&self) -> Option<&HelpText<C>> {
        match self {
            Child::Leaf(command) => Describe::summary(command),
            Child::Group(group) => Describe::summary(group),
        }
    }

    fn full(&self) -> Option<&HelpText<C>> {
        match self {
            Child::Leaf(command) => Describe::full(command),
            Child::Group(group) => Describe::full(group),
        }
    }
}

/// Settings for a group created by [`CommandGroup::add_command_group`].
pub struct GroupOptions<C> {
    summary: Option<HelpText<C>>,
    metadata: Metadata<C>,
}

impl<C> GroupOptions<C> {
    pub fn new() -> Self {
        Self {
            summary: None,
            metadata: Metadata::default(),
        }
    }

    /// Set the line shown for the group in its parent's help.
    pub fn summary(mut self, help: impl Into<HelpText<C>>) -> Self {
        self.summary = Some(help.into());
        self
    }

    /// Gate the whole subtree behind `check`.
    pub fn check_perms<F>(mut self, check: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.metadata.check_perms = Some(Arc::new(check));
        self
    }

    /// Only match the group name with its exact casing.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.metadata.case_sensitive = case_sensitive;
        self
    }
}

impl<C> Default for GroupOptions<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A path to a nested group: one name or a sequence of names.
pub trait GroupPath {
    fn segments(&self) -> Vec<&str>;
}

impl GroupPath for str {
    fn segments(&self) -> Vec<&str> {
        vec![self]
    }
}

impl GroupPath for String {
    fn segments(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl GroupPath for [&str] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl<const N: usize> GroupPath for [&str; N] {
    fn segments(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl GroupPath for Vec<&str> {
    fn segments(&self) -> Vec<&str> {
        self.clone()
    }
}

impl GroupPath for [String] {
    fn segments(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

impl GroupPath for Vec<String> {
    fn segments(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

/// A named collection of commands and nested groups.
///
/// Built once at startup, then shared read-only (typically behind an `Arc`)
/// by every dispatch. Registration needs `&mut self`, so the tree cannot
/// change while a dispatch holds it.
pub struct CommandGroup<C> {
    name: String,
    summary: Option<HelpText<C>>,
    metadata: Metadata<C>,
    children: Vec<(String, Child<C>)>,
}

impl<C> CommandGroup<C> {
    /// Create the unnamed top-level group.
    pub fn root() -> Self {
        Self::new("", GroupOptions::new())
    }

    /// Create a standalone named group, e.g. to nest later with
    /// [`CommandGroup::nest_group`].
    pub fn new(name: impl Into<String>, options: GroupOptions<C>) -> Self {
        Self {
            name: name.into(),
            summary: options.summary,
            metadata: options.metadata,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata<C> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Registration keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(key, _)| key.as_str())
    }

    /// Resolve a word to a child.
    ///
    /// An exact key match wins. Otherwise the lowercased word is tried, and
    /// only accepted if the entry stored under it is not case sensitive.
    pub fn lookup(&self, key: &str) -> Option<&Child<C>> {
        self.lookup_index(key).map(|index| &self.children[index].1)
    }

    fn lookup_index(&self, key: &str) -> Option<usize> {
        self.position(key).or_else(|| {
            let folded = key.to_lowercase();
            self.position(&folded)
                .filter(|&index| !self.children[index].1.is_case_sensitive())
        })
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.children.iter().position(|(stored, _)| stored == key)
    }

    /// Register a command under `name`.
    ///
    /// The name is stored lowercased unless the command is case sensitive.
    pub fn add_command(&mut self, name: &str, command: Command<C>) -> Result<(), RegistryError> {
        let case_sensitive = command.is_case_sensitive();
        self.insert(name, case_sensitive, Child::Leaf(command))?;
        Ok(())
    }

    /// Create a nested group named `name` and return it for further
    /// registration.
    ///
    /// Like command names, the name is stored lowercased unless the group is
    /// case sensitive, so `Admin` is also reached as `admin` or `ADMIN`.
    pub fn add_command_group(
        &mut self,
        name: &str,
        options: GroupOptions<C>,
    ) -> Result<&mut CommandGroup<C>, RegistryError> {
        let case_sensitive = options.metadata.case_sensitive;
        let group = CommandGroup::new(name, options);
        let index = self.insert(name, case_sensitive, Child::Group(group))?;
        self.group_at_mut(index, name)
    }

    /// Nest a pre-built group under `name`, keeping its own name and
    /// metadata. The key folds the same way as in `add_command_group`.
    pub fn nest_group(
        &mut self,
        name: &str,
        group: CommandGroup<C>,
    ) -> Result<&mut CommandGroup<C>, RegistryError> {
        let case_sensitive = group.metadata.case_sensitive;
        let index = self.insert(name, case_sensitive, Child::Group(group))?;
        self.group_at_mut(index, name)
    }

    fn insert(
        &mut self,
        name: &str,
        case_sensitive: bool,
        child: Child<C>,
    ) -> Result<usize, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let key = if case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        };

        if self.lookup_index(&key).is_some() {
            return Err(RegistryError::AlreadyExists(key));
        }

        debug!(
            group = %self.name,
            command = %key,
            kind = if matches!(child, Child::Group(_)) { "group" } else { "command" },
            "Command registered"
        );
        self.children.push((key, child));
        Ok(self.children.len() - 1)
    }

    fn group_at_mut(&mut self, index: usize, name: &str) -> Result<&mut CommandGroup<C>, RegistryError> {
        match self.children.get_mut(index) {
            Some((_, Child::Group(group))) => Ok(group),
            _ => Err(RegistryError::GroupNotFound(name.to_string())),
        }
    }

    /// Resolve a path of group names, one level per segment.
    pub fn get_command_group<P>(&self, path: &P) -> Result<&CommandGroup<C>, RegistryError>
    where
        P: GroupPath + ?Sized,
    {
        let segments = path.segments();
        if segments.is_empty() {
            return Err(RegistryError::EmptyPath);
        }

        let mut group = self;
        for segment in segments {
            group = match group.lookup(segment) {
                Some(Child::Group(child)) => child,
                _ => return Err(RegistryError::GroupNotFound(segment.to_string())),
            };
        }
        Ok(group)
    }

    /// Mutable variant of [`CommandGroup::get_command_group`], for registering
    /// into an existing subtree.
    pub fn get_command_group_mut<P>(&mut self, path: &P) -> Result<&mut CommandGroup<C>, RegistryError>
    where
        P: GroupPath + ?Sized,
    {
        let segments = path.segments();
        if segments.is_empty() {
            return Err(RegistryError::EmptyPath);
        }

        let mut group = self;
        for segment in segments {
            let index = group
                .lookup_index(segment)
                .ok_or_else(|| RegistryError::GroupNotFound(segment.to_string()))?;
            group = match &mut group.children[index].1 {
                Child::Group(child) => child,
                Child::Leaf(_) => return Err(RegistryError::GroupNotFound(segment.to_string())),
            };
        }
        Ok(group)
    }

    fn unknown_command(&self) -> String {
        if self.name.is_empty() {
            UNKNOWN_COMMAND.to_string()
        } else {
            format!(
                "Unknown {} command. Use \"help\" to get a list of commands.",
                self.name
            )
        }
    }

    /// Render help for `line`.
    ///
    /// An empty line lists this group; a line naming a group lists that
    /// group; a line naming a command shows its full help.
    pub fn help(&self, line: &str, ctx: &C) -> String {
        self.help_with_prefix(line, ctx, "")
    }

    fn help_with_prefix(&self, line: &str, ctx: &C, prefix: &str) -> String {
        let prefix = if self.name.is_empty() {
            prefix.to_string()
        } else {
            format!("{}{} ", prefix, self.name)
        };

        let (key, rest) = split_first(line);
        match self.lookup(key) {
            Some(Child::Group(group)) => group.help_with_prefix(rest, ctx, &prefix),
            Some(Child::Leaf(command)) => command.individual_help(ctx, true),
            None if line.is_empty() => self.render_help(ctx, &prefix),
            None => UNKNOWN_COMMAND.to_string(),
        }
    }

    fn render_help(&self, ctx: &C, prefix: &str) -> String {
        let mut message = if self.name.is_empty() {
            "Showing help:".to_string()
        } else {
            format!("Showing help for {}: ", self.name)
        };

        for (key, child) in &self.children {
            if child.metadata().allows(ctx) {
                message.push_str(&format!(
                    "\n`{}{}`: {}",
                    prefix,
                    key,
                    child.individual_help(ctx, false)
                ));
            }
        }

        message.push('\n');
        message.push_str(HELP_HINT);
        message
    }
}

impl<C: Clone + Send + Sync + 'static> CommandGroup<C> {
    /// Route `line` through the tree and run what it names.
    ///
    /// Only the permission of the entry resolved at this level is checked
    /// before descending, so a denied group blocks its whole subtree.
    pub fn execute<'a>(&'a self, line: &'a str, ctx: C) -> BoxFuture<'a, Reply> {
        async move {
            let (key, rest) = split_first(line);

            let Some(child) = self.lookup(key) else {
                debug!(group = %self.name, command = %key, "Unknown command");
                return Reply::text(self.unknown_command());
            };

            if !child.metadata().allows(&ctx) {
                warn!(group = %self.name, command = %key, "Permission denied");
                return Reply::text(PERMISSION_DENIED);
            }

            match child {
                Child::Leaf(command) => {
                    let args = if rest.is_empty() {
                        Args::default()
                    } else {
                        Args::from_tokens(rest.split(' '))
                    };
                    debug!(group = %self.name, command = %key, args = args.len(), "Executing command");
                    command.execute(ctx, args).await
                }
                Child::Group(group) => group.execute(rest, ctx).await,
            }
        }
        .boxed()
    }
}

impl<C> Describe<C> for CommandGroup<C> {
    fn summary(&self) -> Option<&HelpText<C>> {
        self.summary.as_ref()
    }
}

impl<C> Default for CommandGroup<C> {
    fn default() -> Self {
        Self::root()
    }
}

impl<C> fmt::Debug for CommandGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGroup")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("children", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Split off the first space-separated word.
fn split_first(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}
