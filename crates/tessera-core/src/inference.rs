//! Attribute inference over unbound expressions.
//!
//! Interned nodes carry the attribute computed when they were built. Lambda
//! bodies, constraint predicates and dispatch conditions are expressions
//! over placeholders whose attributes are only known per call site; this
//! module evaluates such expressions with the placeholders bound, without
//! interning anything.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tessera_types::TypedValue;

use crate::error::Result;
use crate::expr::{Attribute, NodeDescriptor};
use crate::handle::ExprRef;
use crate::operator::Signature;
use crate::traversal::post_order_traverse;

/// Evaluates the attribute `expr` would have with placeholders bound.
///
/// Unbound placeholders evaluate to the empty attribute. Subexpressions whose
/// dependencies keep their interned attributes reuse the cached result.
///
/// # Errors
///
/// Propagates inference errors raised by operators along the way.
pub fn infer_attr_with_bindings<S: BuildHasher>(
    expr: &ExprRef,
    bindings: &HashMap<String, Attribute, S>,
) -> Result<Attribute> {
    post_order_traverse(expr, |node, deps: &[Attribute]| match node.descriptor() {
        NodeDescriptor::Placeholder(key) => Ok(bindings.get(key).cloned().unwrap_or_default()),
        NodeDescriptor::Literal(_) | NodeDescriptor::Leaf(_) => Ok(node.attr().clone()),
        NodeDescriptor::Operator { op, deps: originals } => {
            let unchanged = originals
                .iter()
                .zip(deps)
                .all(|(original, attr)| original.attr() == attr);
            if unchanged {
                Ok(node.attr().clone())
            } else {
                op.infer_attr(deps)
            }
        }
    })
}

/// Binds each parameter name to a `QTYPE` literal of its argument's type.
///
/// Arguments of unknown type, and the variadic parameter, bind to the empty
/// attribute, which makes predicates over them undecidable.
#[must_use]
pub fn qtype_bindings(signature: &Signature, attrs: &[Attribute]) -> HashMap<String, Attribute> {
    signature
        .params()
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let attr = if param.is_variadic() {
                Attribute::default()
            } else {
                attrs
                    .get(i)
                    .and_then(Attribute::qtype)
                    .map(|qtype| Attribute::from_value(TypedValue::from(qtype.clone())))
                    .unwrap_or_default()
            };
            (param.name().to_string(), attr)
        })
        .collect()
}
