//! Error types for parameter matching, registration and dispatch

use thiserror::Error;

use crate::value::ParamType;

/// Why a parameter tree failed to match a reference.
///
/// Every variant except [`MatchError::UnknownType`] is recoverable: the
/// caller moves on to the next overload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: ParamType, found: ParamType },

    #[error("Constant mismatch: expected '{expected}', got '{found}'")]
    ConstMismatch { expected: String, found: String },

    #[error("Arity error: expected {expected} parameters, got {got}")]
    ArityError { expected: String, got: usize },

    #[error("Unresolved parameter: {0}")]
    UnresolvedNamedParam(String),

    #[error("Positional parameter at index {0} follows a named parameter")]
    PositionalAfterNamed(usize),

    #[error("Named parameter '{0}' used with a variadic signature")]
    VariadicNamedConflict(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Cannot parse '{text}' as {ty}")]
    FormatError { ty: ParamType, text: String },

    #[error("No overload of '{0}' matched")]
    NoMatchingOverload(String),
}

impl MatchError {
    pub(crate) fn type_mismatch(expected: ParamType, found: ParamType) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Whether trying another overload can still succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnknownType(_))
    }
}

/// Result type for matching
pub type MatchResult<T> = Result<T, MatchError>;

/// Configuration errors caught while building a command set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Unknown type '{name}' referenced by {context}")]
    UnknownType { name: String, context: String },

    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Type '{0}' is defined in terms of itself")]
    CyclicType(String),

    #[error("Type '{0}' has no overloads")]
    EmptyType(String),

    #[error("Invalid variadic parameter in {context}: {reason}")]
    InvalidVariadic { context: String, reason: String },

    #[error("Default value of '{param}' does not match its declaration: {source}")]
    InvalidDefault {
        param: String,
        #[source]
        source: MatchError,
    },

    #[error("Command has no name")]
    EmptyCommandName,
}

/// Result type for registration
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Outcome of resolving or executing an invocation against a command set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command '{command}' is not allowed in mode {mode:#x}")]
    ModeNotAllowed { command: String, mode: u32 },

    #[error("Invalid parameters for command '{0}'")]
    NoMatchingOverload(String),

    #[error("Command '{command}' failed: {message}")]
    Action { command: String, message: String },
}

/// Result type for dispatch
pub type CommandResult<T> = Result<T, CommandError>;
