//! Operators defined by an expression body.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tessera_types::{Fingerprint, FingerprintHasher};

use crate::arena::ExprArena;
use crate::error::{ExprError, Result};
use crate::expr::Attribute;
use crate::handle::ExprRef;
use crate::inference::infer_attr_with_bindings;
use crate::operator::constraint::QTypeConstraint;
use crate::operator::signature::{Parameter, Signature};
use crate::operator::{Operator, OperatorRef};
use crate::substitution::sub_placeholders;
use crate::traversal::get_placeholder_keys;

/// An operator whose meaning is a body expression over placeholders.
///
/// Each placeholder in the body names a parameter. Lowering replaces a call
/// by the body with the placeholders substituted by the call's arguments.
/// Identity is name, signature and body fingerprint.
#[derive(Clone)]
pub struct LambdaOperator {
    name: String,
    signature: Signature,
    body: ExprRef,
    constraints: Vec<QTypeConstraint>,
    doc: String,
}

impl LambdaOperator {
    /// Creates a lambda operator.
    ///
    /// # Errors
    ///
    /// [`ExprError::InvalidOperator`] if the signature is variadic or the
    /// body uses a placeholder that is not a parameter.
    pub fn new(name: impl Into<String>, signature: Signature, body: ExprRef) -> Result<Self> {
        let name = name.into();
        if let Some(param) = signature.variadic() {
            return Err(ExprError::invalid_operator(
                name,
                format!("variadic parameter '{}' is not supported by lambdas", param.name()),
            ));
        }
        for key in get_placeholder_keys(&body) {
            if !signature.params().iter().any(|param| param.name() == key) {
                return Err(ExprError::invalid_operator(
                    name,
                    format!("body placeholder P.{key} is not a parameter"),
                ));
            }
        }
        Ok(Self {
            name,
            signature,
            body,
            constraints: Vec::new(),
            doc: String::new(),
        })
    }

    /// Creates a lambda whose parameters are the body's placeholders in
    /// sorted order.
    ///
    /// # Errors
    ///
    /// [`ExprError::InvalidOperator`] if a placeholder key is not a valid
    /// parameter name.
    pub fn with_inferred_signature(name: impl Into<String>, body: ExprRef) -> Result<Self> {
        let params = get_placeholder_keys(&body)
            .into_iter()
            .map(Parameter::positional)
            .collect();
        Self::new(name, Signature::new(params)?, body)
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Appends a qtype constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: QTypeConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Finalizes the operator.
    #[must_use]
    pub fn into_operator(self) -> OperatorRef {
        let fingerprint = self.compute_fingerprint();
        Arc::new(Operator::Lambda {
            op: self,
            fingerprint,
        })
    }

    fn compute_fingerprint(&self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("lambda operator");
        hasher.combine_str(&self.name);
        self.signature.fingerprint_into(&mut hasher);
        hasher.combine_fingerprint(self.body.fingerprint());
        hasher.combine_usize(self.constraints.len());
        for constraint in &self.constraints {
            constraint.fingerprint_into(&mut hasher);
        }
        hasher.finish()
    }

    /// The operator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The body expression.
    #[must_use]
    pub fn body(&self) -> &ExprRef {
        &self.body
    }

    /// The qtype constraints.
    #[must_use]
    pub fn constraints(&self) -> &[QTypeConstraint] {
        &self.constraints
    }

    /// The documentation string.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    fn bind<T: Clone>(&self, args: &[T]) -> HashMap<String, T> {
        self.signature
            .params()
            .iter()
            .zip(args)
            .map(|(param, arg)| (param.name().to_string(), arg.clone()))
            .collect()
    }

    pub(crate) fn infer(&self, attrs: &[Attribute]) -> Result<Attribute> {
        infer_attr_with_bindings(&self.body, &self.bind(attrs))
    }

    pub(crate) fn expand(&self, arena: &ExprArena, deps: &[ExprRef]) -> Result<ExprRef> {
        sub_placeholders(arena, &self.body, &self.bind(deps))
    }
}

impl fmt::Debug for LambdaOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaOperator")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
