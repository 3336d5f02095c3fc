//! Operators defined in terms of other operators.

use tessera_core::{
    DispatchCase, DispatchOperator, ExprArena, LambdaOperator, OperatorRef, Result, Signature,
};

use crate::logic::not;
use crate::math::{multiply, neg};
use crate::qtype::{is_boolean_op, is_numeric_op};

/// Name of the squaring lambda.
pub const SQUARE: &str = "math.square";
/// Name of the type-directed inversion.
pub const INVERT: &str = "core.invert";

/// `math.square(x) = math.multiply(x, x)`.
///
/// # Errors
///
/// Propagates errors building the body.
pub fn square(arena: &ExprArena) -> Result<OperatorRef> {
    let x = arena.placeholder("x");
    let body = arena.call(&multiply(arena)?, [x.clone(), x])?;
    Ok(LambdaOperator::new(SQUARE, Signature::parse("x")?, body)?
        .with_doc("The square of a number.")
        .into_operator())
}

/// `core.invert(x)`: `core.not` for booleans, `math.neg` for numbers.
///
/// # Errors
///
/// Propagates errors building the conditions and candidates.
pub fn invert(arena: &ExprArena) -> Result<OperatorRef> {
    let x = arena.placeholder("x");
    let cases = vec![
        DispatchCase::new("boolean", arena.call(&is_boolean_op()?, [x.clone()])?, not(arena)?),
        DispatchCase::new("numeric", arena.call(&is_numeric_op()?, [x])?, neg(arena)?),
    ];
    Ok(DispatchOperator::new(INVERT, Signature::parse("x")?, cases, None)?
        .with_doc("Logical negation of booleans, arithmetic negation of numbers.")
        .into_operator())
}
