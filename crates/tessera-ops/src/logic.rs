//! Boolean logic.

use tessera_core::{BackendOperator, ExprArena, InferenceRule, OperatorRef, Result, Signature};
use tessera_types::{QType, TypedValue};

use crate::qtype::{is_boolean_op, requires};

/// Name of logical negation.
pub const NOT: &str = "core.not";
/// Name of logical conjunction.
pub const AND: &str = "core.and";
/// Name of logical disjunction.
pub const OR: &str = "core.or";

fn bool_arg(values: &[TypedValue], index: usize) -> std::result::Result<bool, String> {
    values
        .get(index)
        .and_then(TypedValue::as_bool)
        .ok_or_else(|| format!("argument {index} is not a BOOLEAN value"))
}

fn boolean_op(arena: &ExprArena, name: &str, params: &[&str], doc: &str) -> Result<BackendOperator> {
    let is_boolean = is_boolean_op()?;
    let constraints = params
        .iter()
        .map(|param| {
            requires(
                arena,
                &is_boolean,
                &[*param],
                &format!("expected BOOLEAN for '{param}', got {{{param}}}"),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BackendOperator::new(
        name,
        Signature::parse(&params.join(", "))?,
        InferenceRule::Fixed(QType::boolean()),
    )
    .with_doc(doc)
    .with_constraints(constraints))
}

/// `core.not(x)`.
///
/// # Errors
///
/// Propagates errors building the constraint predicates.
pub fn not(arena: &ExprArena) -> Result<OperatorRef> {
    Ok(boolean_op(arena, NOT, &["x"], "Logical negation.")?
        .with_fold(|values| Ok(TypedValue::from(!bool_arg(values, 0)?)))
        .into_operator())
}

/// `core.and(x, y)`.
///
/// # Errors
///
/// See [`not`].
pub fn and(arena: &ExprArena) -> Result<OperatorRef> {
    Ok(boolean_op(arena, AND, &["x", "y"], "Logical conjunction.")?
        .with_fold(|values| Ok(TypedValue::from(bool_arg(values, 0)? && bool_arg(values, 1)?)))
        .into_operator())
}

/// `core.or(x, y)`.
///
/// # Errors
///
/// See [`not`].
pub fn or(arena: &ExprArena) -> Result<OperatorRef> {
    Ok(boolean_op(arena, OR, &["x", "y"], "Logical disjunction.")?
        .with_fold(|values| Ok(TypedValue::from(bool_arg(values, 0)? || bool_arg(values, 1)?)))
        .into_operator())
}
