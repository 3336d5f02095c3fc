//! Operators that select an implementation by argument types.

use std::fmt;
use std::sync::Arc;

use tessera_types::{Fingerprint, FingerprintHasher};
use tracing::trace;

use crate::arena::ExprArena;
use crate::error::{BindError, ExprError, Result};
use crate::expr::{Attribute, NodeDescriptor};
use crate::handle::ExprRef;
use crate::inference::{infer_attr_with_bindings, qtype_bindings};
use crate::operator::signature::Signature;
use crate::operator::{Operator, OperatorRef};
use crate::traversal::get_placeholder_keys;

/// One candidate of a dispatch operator.
#[derive(Clone, Debug)]
pub struct DispatchCase {
    name: String,
    condition: ExprRef,
    operator: OperatorRef,
}

impl DispatchCase {
    /// Creates a case. `condition` is a boolean expression over
    /// placeholders named after the dispatch operator's parameters.
    pub fn new(name: impl Into<String>, condition: ExprRef, operator: OperatorRef) -> Self {
        Self {
            name: name.into(),
            condition,
            operator,
        }
    }

    /// The case name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The condition expression.
    #[must_use]
    pub fn condition(&self) -> &ExprRef {
        &self.condition
    }

    /// The operator applied when this case is selected.
    #[must_use]
    pub fn operator(&self) -> &OperatorRef {
        &self.operator
    }
}

/// An operator that forwards to the first case whose condition holds.
///
/// Conditions are evaluated in declaration order with each parameter bound
/// to the `QTYPE` of its argument. When a condition cannot be decided yet
/// because an argument type is unknown, selection stops and the choice is
/// left undetermined.
#[derive(Clone)]
pub struct DispatchOperator {
    name: String,
    signature: Signature,
    cases: Vec<DispatchCase>,
    default: Option<OperatorRef>,
    doc: String,
}

impl DispatchOperator {
    /// Creates a dispatch operator.
    ///
    /// # Errors
    ///
    /// [`ExprError::InvalidOperator`] if a condition references a
    /// placeholder that is not a parameter, or a candidate cannot accept the
    /// dispatch operator's arguments.
    pub fn new(
        name: impl Into<String>,
        signature: Signature,
        cases: Vec<DispatchCase>,
        default: Option<OperatorRef>,
    ) -> Result<Self> {
        let name = name.into();
        for case in &cases {
            for key in get_placeholder_keys(&case.condition) {
                if !signature.params().iter().any(|param| param.name() == key) {
                    return Err(ExprError::invalid_operator(
                        name,
                        format!("condition of case '{}' uses unknown placeholder P.{key}", case.name),
                    ));
                }
            }
        }
        if signature.variadic().is_none() {
            let arity = signature.len();
            let candidates = cases.iter().map(|case| &case.operator).chain(default.as_ref());
            for candidate in candidates {
                if candidate
                    .signature()
                    .validate_deps_count(candidate.display_name(), arity)
                    .is_err()
                {
                    return Err(ExprError::invalid_operator(
                        name,
                        format!(
                            "candidate '{}' does not accept {arity} argument(s)",
                            candidate.display_name()
                        ),
                    ));
                }
            }
        }
        Ok(Self {
            name,
            signature,
            cases,
            default,
            doc: String::new(),
        })
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Finalizes the operator.
    #[must_use]
    pub fn into_operator(self) -> OperatorRef {
        let fingerprint = self.compute_fingerprint();
        Arc::new(Operator::Dispatch {
            op: self,
            fingerprint,
        })
    }

    fn compute_fingerprint(&self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("dispatch operator");
        hasher.combine_str(&self.name);
        self.signature.fingerprint_into(&mut hasher);
        hasher.combine_usize(self.cases.len());
        for case in &self.cases {
            hasher
                .combine_str(&case.name)
                .combine_fingerprint(case.condition.fingerprint())
                .combine_fingerprint(case.operator.fingerprint());
        }
        match &self.default {
            Some(default) => hasher.combine_bool(true).combine_fingerprint(default.fingerprint()),
            None => hasher.combine_bool(false),
        };
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

    /// The cases, in evaluation order.
    #[must_use]
    pub fn cases(&self) -> &[DispatchCase] {
        &self.cases
    }

    /// The fallback operator.
    #[must_use]
    pub fn default_operator(&self) -> Option<&OperatorRef> {
        self.default.as_ref()
    }

    /// The documentation string.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Chooses the operator for the given argument attributes.
    ///
    /// Returns `Ok(None)` while the choice is undetermined.
    ///
    /// # Errors
    ///
    /// [`BindError::NoMatchingCase`] when every condition is false and there
    /// is no default; [`ExprError::TypeError`] for a non-boolean condition.
    pub fn select(&self, attrs: &[Attribute]) -> Result<Option<&OperatorRef>> {
        let bindings = qtype_bindings(&self.signature, attrs);
        for case in &self.cases {
            let outcome = infer_attr_with_bindings(&case.condition, &bindings)?;
            let Some(value) = outcome.qvalue() else {
                trace!(operator = %self.name, case = %case.name, "dispatch undecided");
                return Ok(None);
            };
            match value.as_bool() {
                Some(true) => return Ok(Some(&case.operator)),
                Some(false) => {}
                None => {
                    return Err(ExprError::type_error(
                        &self.name,
                        format!(
                            "condition of case '{}' must be BOOLEAN, got {}",
                            case.name,
                            value.qtype()
                        ),
                    ))
                }
            }
        }
        match &self.default {
            Some(default) => Ok(Some(default)),
            None => {
                let arg_types = attrs
                    .iter()
                    .map(|attr| attr.qtype().map_or("unknown", |qtype| qtype.name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(BindError::NoMatchingCase {
                    operator: self.name.clone(),
                    arg_types,
                }
                .into())
            }
        }
    }

    pub(crate) fn infer(&self, attrs: &[Attribute]) -> Result<Attribute> {
        match self.select(attrs)? {
            Some(op) => op.infer_attr(attrs),
            None => Ok(Attribute::default()),
        }
    }

    pub(crate) fn expand(&self, arena: &ExprArena, deps: &[ExprRef]) -> Result<Option<ExprRef>> {
        let attrs: Vec<Attribute> = deps.iter().map(|dep| dep.attr().clone()).collect();
        let Some(op) = self.select(&attrs)? else {
            return Ok(None);
        };
        arena
            .intern(NodeDescriptor::Operator {
                op: op.clone(),
                deps: deps.iter().cloned().collect(),
            })
            .map(Some)
    }
}

impl fmt::Debug for DispatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cases: Vec<&str> = self.cases.iter().map(DispatchCase::name).collect();
        f.debug_struct("DispatchOperator")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("cases", &cases)
            .field("has_default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}
