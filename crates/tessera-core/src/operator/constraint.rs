//! Declarative qtype constraints.

use std::collections::HashMap;

use tessera_types::FingerprintHasher;

use crate::error::{ExprError, Result};
use crate::expr::Attribute;
use crate::handle::ExprRef;
use crate::inference::{infer_attr_with_bindings, qtype_bindings};
use crate::operator::signature::Signature;

/// A boolean predicate over the argument types, with an error message.
///
/// The predicate is an expression over placeholders named after the
/// operator's parameters. It is evaluated with each placeholder bound to a
/// `QTYPE` literal of the corresponding argument's type. The message may
/// reference parameters as `{name}`; they are replaced by type names.
#[derive(Clone, Debug)]
pub struct QTypeConstraint {
    predicate: ExprRef,
    message: String,
}

impl QTypeConstraint {
    /// Creates a constraint.
    pub fn new(predicate: ExprRef, message: impl Into<String>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }

    /// The predicate expression.
    #[must_use]
    pub fn predicate(&self) -> &ExprRef {
        &self.predicate
    }

    /// The raw message template.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Substitutes `{param}` references with argument type names.
    #[must_use]
    pub fn format_message(&self, signature: &Signature, attrs: &[Attribute]) -> String {
        let mut names: HashMap<&str, Vec<String>> = HashMap::new();
        for (i, attr) in attrs.iter().enumerate() {
            if let Some(param) = signature.param_for_dep(i) {
                let type_name = attr
                    .qtype()
                    .map_or_else(|| "unknown".to_string(), |qtype| qtype.name().to_string());
                names.entry(param.name()).or_default().push(type_name);
            }
        }

        let mut message = self.message.clone();
        for param in signature.params() {
            let pattern = format!("{{{}}}", param.name());
            if message.contains(&pattern) {
                let rendered = names
                    .get(param.name())
                    .map_or_else(String::new, |types| types.join(", "));
                message = message.replace(&pattern, &rendered);
            }
        }
        message
    }

    pub(crate) fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
        hasher
            .combine_fingerprint(self.predicate.fingerprint())
            .combine_str(&self.message);
    }
}

/// Evaluates constraints in order, failing on the first violated one.
///
/// A predicate that cannot be decided because an argument type is unknown
/// is skipped.
///
/// # Errors
///
/// [`ExprError::ConstraintViolation`] for the first predicate evaluating to
/// `false`, [`ExprError::TypeError`] for a predicate that is not boolean.
pub fn check_constraints(
    operator: &str,
    signature: &Signature,
    constraints: &[QTypeConstraint],
    attrs: &[Attribute],
) -> Result<()> {
    if constraints.is_empty() {
        return Ok(());
    }
    let bindings = qtype_bindings(signature, attrs);
    for constraint in constraints {
        let outcome = infer_attr_with_bindings(&constraint.predicate, &bindings)?;
        let Some(value) = outcome.qvalue() else {
            continue;
        };
        match value.as_bool() {
            Some(true) => {}
            Some(false) => {
                return Err(ExprError::ConstraintViolation {
                    operator: operator.to_string(),
                    message: constraint.format_message(signature, attrs),
                })
            }
            None => {
                return Err(ExprError::type_error(
                    operator,
                    format!(
                        "constraint predicate must be BOOLEAN, got {}",
                        value.qtype()
                    ),
                ))
            }
        }
    }
    Ok(())
}
