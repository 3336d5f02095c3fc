//! Predicates over types.
//!
//! These operators take `QTYPE` values and return `BOOLEAN`. They are the
//! vocabulary of qtype constraints and dispatch conditions, where parameter
//! placeholders are bound to the argument types: `qtype.is_numeric(P.x)`
//! folds to `true` once the type of `x` is known to be numeric.

use tessera_core::{
    Attribute, BackendOperator, ExprArena, InferenceRule, OperatorRef, QTypeConstraint, Result,
    Signature,
};
use tessera_types::{QType, TypedValue};

/// Name of the type equality operator.
pub const EQUAL: &str = "qtype.equal";
/// Name of the numeric type predicate.
pub const IS_NUMERIC: &str = "qtype.is_numeric";
/// Name of the integral type predicate.
pub const IS_INTEGRAL: &str = "qtype.is_integral";
/// Name of the floating point type predicate.
pub const IS_FLOATING_POINT: &str = "qtype.is_floating_point";
/// Name of the boolean type predicate.
pub const IS_BOOLEAN: &str = "qtype.is_boolean";
/// Name of the text type predicate.
pub const IS_TEXT: &str = "qtype.is_text";

/// Returns true for `INT32` and `INT64`.
#[must_use]
pub fn is_integral(qtype: &QType) -> bool {
    *qtype == QType::int32() || *qtype == QType::int64()
}

/// Returns true for `FLOAT32` and `FLOAT64`.
#[must_use]
pub fn is_floating_point(qtype: &QType) -> bool {
    *qtype == QType::float32() || *qtype == QType::float64()
}

/// Returns true for the integral and floating point types.
#[must_use]
pub fn is_numeric(qtype: &QType) -> bool {
    is_integral(qtype) || is_floating_point(qtype)
}

/// Every argument must be a `QTYPE` once known.
fn boolean_over_qtypes(attrs: &[Attribute]) -> std::result::Result<Option<QType>, String> {
    for attr in attrs {
        if let Some(qtype) = attr.qtype() {
            if *qtype != QType::qtype() {
                return Err(format!("expected QTYPE, got {qtype}"));
            }
        }
    }
    Ok(Some(QType::boolean()))
}

fn qtype_arg(values: &[TypedValue], index: usize) -> std::result::Result<&QType, String> {
    values
        .get(index)
        .and_then(TypedValue::as_qtype)
        .ok_or_else(|| format!("argument {index} is not a QTYPE value"))
}

fn predicate(name: &str, doc: &str, test: fn(&QType) -> bool) -> Result<OperatorRef> {
    Ok(BackendOperator::new(name, Signature::parse("x")?, InferenceRule::custom(boolean_over_qtypes))
        .with_doc(doc)
        .with_fold(move |values| Ok(TypedValue::from(test(qtype_arg(values, 0)?))))
        .into_operator())
}

/// Builds a constraint applying `predicate` to the placeholders of `params`.
pub(crate) fn requires(
    arena: &ExprArena,
    predicate: &OperatorRef,
    params: &[&str],
    message: &str,
) -> Result<QTypeConstraint> {
    let args = params.iter().map(|param| arena.placeholder(*param));
    Ok(QTypeConstraint::new(arena.call(predicate, args)?, message))
}

/// `qtype.equal(x, y)`: whether two types are the same.
///
/// # Errors
///
/// Propagates signature construction errors.
pub fn equal() -> Result<OperatorRef> {
    Ok(
        BackendOperator::new(EQUAL, Signature::parse("x, y")?, InferenceRule::custom(boolean_over_qtypes))
            .with_doc("Returns true if both types are equal.")
            .with_fold(|values| Ok(TypedValue::from(qtype_arg(values, 0)? == qtype_arg(values, 1)?)))
            .into_operator(),
    )
}

/// `qtype.is_numeric(x)`.
///
/// # Errors
///
/// See [`equal`].
pub fn is_numeric_op() -> Result<OperatorRef> {
    predicate(IS_NUMERIC, "Returns true for integral and floating point types.", is_numeric)
}

/// `qtype.is_integral(x)`.
///
/// # Errors
///
/// See [`equal`].
pub fn is_integral_op() -> Result<OperatorRef> {
    predicate(IS_INTEGRAL, "Returns true for INT32 and INT64.", is_integral)
}

/// `qtype.is_floating_point(x)`.
///
/// # Errors
///
/// See [`equal`].
pub fn is_floating_point_op() -> Result<OperatorRef> {
    predicate(IS_FLOATING_POINT, "Returns true for FLOAT32 and FLOAT64.", is_floating_point)
}

/// `qtype.is_boolean(x)`.
///
/// # Errors
///
/// See [`equal`].
pub fn is_boolean_op() -> Result<OperatorRef> {
    predicate(IS_BOOLEAN, "Returns true for BOOLEAN.", |qtype| *qtype == QType::boolean())
}

/// `qtype.is_text(x)`.
///
/// # Errors
///
/// See [`equal`].
pub fn is_text_op() -> Result<OperatorRef> {
    predicate(IS_TEXT, "Returns true for TEXT.", |qtype| *qtype == QType::text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ExprError;

    #[test]
    fn test_classification() {
        assert!(is_numeric(&QType::int32()));
        assert!(is_numeric(&QType::float64()));
        assert!(!is_numeric(&QType::boolean()));
        assert!(is_integral(&QType::int64()));
        assert!(!is_integral(&QType::float32()));
        assert!(is_floating_point(&QType::float32()));
    }

    #[test]
    fn test_predicates_fold_on_literal_types() {
        let arena = ExprArena::new();
        let is_num = is_numeric_op().unwrap();

        let yes = arena.call(&is_num, [arena.literal(QType::int32())]).unwrap();
        assert_eq!(yes.qvalue().and_then(TypedValue::as_bool), Some(true));
        let no = arena.call(&is_num, [arena.literal(QType::text())]).unwrap();
        assert_eq!(no.qvalue().and_then(TypedValue::as_bool), Some(false));

        // Unknown argument: typed BOOLEAN, value undecided.
        let open = arena.call(&is_num, [arena.placeholder("x")]).unwrap();
        assert_eq!(open.qtype(), Some(&QType::boolean()));
        assert!(open.qvalue().is_none());
    }

    #[test]
    fn test_equal() {
        let arena = ExprArena::new();
        let eq = equal().unwrap();
        let same = arena
            .call(&eq, [arena.literal(QType::int64()), arena.literal(QType::int64())])
            .unwrap();
        assert_eq!(same.qvalue().and_then(TypedValue::as_bool), Some(true));
        let different = arena
            .call(&eq, [arena.literal(QType::int64()), arena.literal(QType::int32())])
            .unwrap();
        assert_eq!(different.qvalue().and_then(TypedValue::as_bool), Some(false));
    }

    #[test]
    fn test_rejects_non_type_arguments() {
        let arena = ExprArena::new();
        let err = arena
            .call(&is_text_op().unwrap(), [arena.literal(1i32)])
            .unwrap_err();
        assert_eq!(
            err,
            ExprError::type_error(IS_TEXT, "expected QTYPE, got INT32")
        );
    }
}
