//! Operators: the closed set of operator kinds.
//!
//! Every operator node references an [`Operator`]. The three kinds share one
//! capability set (name, signature, constraints, inference) and differ in
//! how they lower:
//!
//! - [`BackendOperator`]: primitive, already lowest.
//! - [`LambdaOperator`]: expands to its body with arguments substituted.
//! - [`DispatchOperator`]: forwards to the candidate selected by argument
//!   types.

mod backend;
mod constraint;
mod dispatch;
mod lambda;
mod signature;

use std::fmt;
use std::sync::Arc;

use tessera_types::Fingerprint;

pub use backend::{BackendOperator, FoldFn, InferFn, InferenceRule};
pub use constraint::{check_constraints, QTypeConstraint};
pub use dispatch::{DispatchCase, DispatchOperator};
pub use lambda::LambdaOperator;
pub use signature::{Parameter, ParameterKind, Signature};

use crate::arena::ExprArena;
use crate::error::{ExprError, Result};
use crate::expr::{Attribute, OperatorToken};
use crate::handle::ExprRef;

/// Shared handle to an operator.
pub type OperatorRef = Arc<Operator>;

/// An operator of one of the three kinds, with its identity fingerprint.
///
/// Operators are immutable once built; construct them with the kind's
/// `into_operator`.
pub enum Operator {
    /// A primitive operator.
    Backend {
        /// The definition.
        op: BackendOperator,
        /// Identity fingerprint.
        fingerprint: Fingerprint,
    },
    /// An operator defined by a body expression.
    Lambda {
        /// The definition.
        op: LambdaOperator,
        /// Identity fingerprint.
        fingerprint: Fingerprint,
    },
    /// An operator selecting among candidates by argument types.
    Dispatch {
        /// The definition.
        op: DispatchOperator,
        /// Identity fingerprint.
        fingerprint: Fingerprint,
    },
}

impl Operator {
    /// The name used for display and registry lookup.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Operator::Backend { op, .. } => op.name(),
            Operator::Lambda { op, .. } => op.name(),
            Operator::Dispatch { op, .. } => op.name(),
        }
    }

    /// The signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        match self {
            Operator::Backend { op, .. } => op.signature(),
            Operator::Lambda { op, .. } => op.signature(),
            Operator::Dispatch { op, .. } => op.signature(),
        }
    }

    /// The declared qtype constraints. Dispatch operators delegate
    /// constraint checking to the selected candidate.
    #[must_use]
    pub fn constraints(&self) -> &[QTypeConstraint] {
        match self {
            Operator::Backend { op, .. } => op.constraints(),
            Operator::Lambda { op, .. } => op.constraints(),
            Operator::Dispatch { .. } => &[],
        }
    }

    /// The documentation string.
    #[must_use]
    pub fn doc(&self) -> &str {
        match self {
            Operator::Backend { op, .. } => op.doc(),
            Operator::Lambda { op, .. } => op.doc(),
            Operator::Dispatch { op, .. } => op.doc(),
        }
    }

    /// The identity fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            Operator::Backend { fingerprint, .. }
            | Operator::Lambda { fingerprint, .. }
            | Operator::Dispatch { fingerprint, .. } => *fingerprint,
        }
    }

    /// The identity token exposed at the serialization boundary.
    #[must_use]
    pub fn token(&self) -> OperatorToken {
        OperatorToken {
            name: self.display_name().to_string(),
            fingerprint: self.fingerprint(),
        }
    }

    /// Returns true for backend operators.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Operator::Backend { .. })
    }

    /// Returns true for annotation operators.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        matches!(self, Operator::Backend { op, .. } if op.is_annotation())
    }

    /// The backend definition, for backend operators.
    #[must_use]
    pub fn as_backend(&self) -> Option<&BackendOperator> {
        match self {
            Operator::Backend { op, .. } => Some(op),
            _ => None,
        }
    }

    /// The lambda definition, for lambda operators.
    #[must_use]
    pub fn as_lambda(&self) -> Option<&LambdaOperator> {
        match self {
            Operator::Lambda { op, .. } => Some(op),
            _ => None,
        }
    }

    /// The dispatch definition, for dispatch operators.
    #[must_use]
    pub fn as_dispatch(&self) -> Option<&DispatchOperator> {
        match self {
            Operator::Dispatch { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Infers the attribute of a node applying this operator.
    ///
    /// Checks the dependency count, then the constraints in order, then
    /// runs the kind's inference. Unknown dependency types never fail on
    /// their own.
    ///
    /// # Errors
    ///
    /// [`ExprError::TypeError`] on a dependency count mismatch or an illegal
    /// type combination, [`ExprError::ConstraintViolation`] for the first
    /// failed constraint, and dispatch selection errors.
    pub fn infer_attr(&self, attrs: &[Attribute]) -> Result<Attribute> {
        let name = self.display_name();
        self.signature()
            .validate_deps_count(name, attrs.len())
            .map_err(|err| ExprError::type_error(name, err.to_string()))?;
        check_constraints(name, self.signature(), self.constraints(), attrs)?;
        match self {
            Operator::Backend { op, .. } => op.infer(attrs),
            Operator::Lambda { op, .. } => op.infer(attrs),
            Operator::Dispatch { op, .. } => op.infer(attrs),
        }
    }

    /// The node-local lowering of a call with the given dependencies.
    ///
    /// Returns `None` when the call is already lowest: backend operators,
    /// and dispatch operators whose choice is still undetermined.
    ///
    /// # Errors
    ///
    /// Propagates failures of building the expansion.
    pub fn expand(&self, arena: &ExprArena, deps: &[ExprRef]) -> Result<Option<ExprRef>> {
        match self {
            Operator::Backend { .. } => Ok(None),
            Operator::Lambda { op, .. } => op.expand(arena, deps).map(Some),
            Operator::Dispatch { op, .. } => op.expand(arena, deps),
        }
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Backend { op, .. } => fmt::Debug::fmt(op, f),
            Operator::Lambda { op, .. } => fmt::Debug::fmt(op, f),
            Operator::Dispatch { op, .. } => fmt::Debug::fmt(op, f),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_name(), self.signature())
    }
}
