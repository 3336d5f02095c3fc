//! Registration of the standard library.

use tessera_core::annotation::{name_annotation_op, qtype_annotation_op};
use tessera_core::{ExprArena, OperatorRef, OperatorRegistry, Result};
use tessera_types::RegistrationOptions;
use tracing::debug;

use crate::{composite, logic, math, qtype};

/// Builds every standard operator, annotations excluded.
///
/// Constraint predicates and lambda bodies are interned in `arena`.
///
/// # Errors
///
/// Propagates errors building an operator.
pub fn standard_operators(arena: &ExprArena) -> Result<Vec<OperatorRef>> {
    Ok(vec![
        qtype::equal()?,
        qtype::is_numeric_op()?,
        qtype::is_integral_op()?,
        qtype::is_floating_point_op()?,
        qtype::is_boolean_op()?,
        qtype::is_text_op()?,
        logic::not(arena)?,
        logic::and(arena)?,
        logic::or(arena)?,
        math::add(arena)?,
        math::subtract(arena)?,
        math::multiply(arena)?,
        math::neg(arena)?,
        composite::square(arena)?,
        composite::invert(arena)?,
    ])
}

/// Registers the standard library in `registry`.
///
/// The two annotation operators are registered as non-overridable
/// singletons; everything else may later be shadowed with
/// [`RegistrationOptions::overriding`].
///
/// # Errors
///
/// [`tessera_core::ExprError::Registry`] if a name is already taken.
pub fn register_standard_operators(registry: &OperatorRegistry, arena: &ExprArena) -> Result<()> {
    for annotation in [name_annotation_op(), qtype_annotation_op()] {
        registry.register_with(annotation.clone(), RegistrationOptions::singleton())?;
    }
    let operators = standard_operators(arena)?;
    let count = operators.len();
    for op in operators {
        registry.register(op)?;
    }
    debug!(count = count + 2, "registered standard operators");
    Ok(())
}
