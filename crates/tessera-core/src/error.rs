//! Error types for graph construction.

use tessera_types::RegistryError;
use thiserror::Error;

/// Argument binding failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindError {
    /// Wrong number of arguments for the operator's signature.
    #[error("{operator}: expected {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Operator display name.
        operator: String,
        /// Accepted arity, e.g. "2", "1 to 3", "at least 1".
        expected: String,
        /// Number of arguments supplied.
        got: usize,
    },

    /// A required parameter received no value and has no default.
    #[error("{operator}: missing argument '{name}'")]
    MissingArgument {
        /// Operator display name.
        operator: String,
        /// Parameter name.
        name: String,
    },

    /// A keyword argument names no positional parameter.
    #[error("{operator}: unexpected keyword argument '{name}'")]
    UnknownKeyword {
        /// Operator display name.
        operator: String,
        /// The unknown keyword.
        name: String,
    },

    /// A parameter received a value twice.
    #[error("{operator}: multiple values for argument '{name}'")]
    DuplicateArgument {
        /// Operator display name.
        operator: String,
        /// Parameter name.
        name: String,
    },

    /// No dispatch case accepts the argument types and there is no default.
    #[error("{operator}: no dispatch case matches argument types ({arg_types})")]
    NoMatchingCase {
        /// Operator display name.
        operator: String,
        /// Comma-separated argument type names.
        arg_types: String,
    },
}

/// Errors surfaced by the expression engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Argument binding failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// A declared qtype constraint rejected the argument types.
    #[error("{operator}: {message}")]
    ConstraintViolation {
        /// Operator display name.
        operator: String,
        /// The constraint message with argument type names substituted.
        message: String,
    },

    /// An inference rule rejected an illegal type combination.
    #[error("{operator}: type error: {message}")]
    TypeError {
        /// Operator display name.
        operator: String,
        /// Explanation from the rule.
        message: String,
    },

    /// A referenced name, fingerprint or key could not be resolved.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A registry rejected a registration.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An operator definition is malformed.
    #[error("invalid operator '{name}': {message}")]
    InvalidOperator {
        /// Operator display name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// A rewrite processed more nodes than its configured limit.
    #[error("processed node limit of {limit} exceeded")]
    LimitExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl ExprError {
    /// Shorthand for a [`ExprError::TypeError`].
    pub fn type_error(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeError {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`ExprError::InvalidOperator`].
    pub fn invalid_operator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperator {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, ExprError>;
