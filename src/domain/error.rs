//! Typed domain error enum.
//!
//! Every fallible operation in this crate returns `ProfileError`. Nothing
//! is retried or recovered internally: the registry performs no I/O after
//! load and has no transient-failure modes, so errors surface to the
//! caller immediately.

use thiserror::Error;

/// Errors raised while loading the profile table or rendering a script.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Lookup of a profile name that is not in the table.
    #[error("no profile named '{0}' is configured")]
    NotFound(String),

    /// Two entries in the source table share a name. The table is a
    /// mapping; a duplicate is rejected, never silently merged.
    #[error("duplicate profile name '{0}' in profile table")]
    DuplicateName(String),

    /// A `{{ placeholder }}` had neither a supplied value nor a default.
    #[error("no value or default supplied for placeholder '{0}'")]
    MissingVariable(String),

    /// A placeholder that cannot be parsed (unterminated braces, or a
    /// filter other than `default(...)`).
    #[error("malformed placeholder: {0}")]
    MalformedPlaceholder(String),

    /// A profile entry violates a load-time invariant.
    #[error("profile '{name}' is invalid: {reason}")]
    InvalidProfile { name: String, reason: String },

    /// The source table is not valid YAML for the profile schema.
    #[error("cannot parse profile table: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Reading a profile table file from disk failed.
    #[error("cannot read profile table: {0}")]
    Io(#[from] std::io::Error),
}
