//! Error types for building the command tree.
//!
//! These only surface while commands are registered. Dispatch never fails:
//! runtime problems become user-visible replies instead.

use thiserror::Error;

/// Errors raised while registering commands or resolving group paths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Command and group names need at least one character
    #[error("Command needs to have 1 or more characters.")]
    EmptyName,

    /// The key is already taken in this group
    #[error("Command already exists: {0}")]
    AlreadyExists(String),

    /// A path segment does not name a command group
    #[error("Could not find command group: {0}")]
    GroupNotFound(String),

    /// A group path needs at least one segment
    #[error("Error when locating the path to the command group: empty path")]
    EmptyPath,
}
