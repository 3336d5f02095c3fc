//! Annotation operators.
//!
//! An annotation is a backend operator flagged as such whose first argument
//! is the annotated expression; the remaining arguments are metadata.
//! Annotations keep the annotated expression's type and constant value.
//!
//! Two annotations are built in:
//! - `annotation.name(expr, name)` tags a subexpression with a `TEXT` name,
//!   used by name-based substitution.
//! - `annotation.qtype(expr, qtype)` attaches a type to an expression, which
//!   is how leaves get their types.

use std::sync::OnceLock;

use tessera_types::{QType, TypedValue};

use crate::arena::ExprArena;
use crate::binding::bind_op;
use crate::error::Result;
use crate::expr::Attribute;
use crate::handle::ExprRef;
use crate::operator::{BackendOperator, InferenceRule, OperatorRef, Parameter, Signature};

/// Name of the name annotation operator.
pub const NAME_ANNOTATION: &str = "annotation.name";

/// Name of the qtype annotation operator.
pub const QTYPE_ANNOTATION: &str = "annotation.qtype";

fn pass_through(values: &[TypedValue]) -> std::result::Result<TypedValue, String> {
    values
        .first()
        .cloned()
        .ok_or_else(|| "annotation without an annotated expression".to_string())
}

fn signature(metadata: &str) -> Signature {
    // Two distinct positional names without defaults always validate.
    Signature::new(vec![
        Parameter::positional("expr"),
        Parameter::positional(metadata),
    ])
    .expect("annotation signatures are valid")
}

/// The `annotation.name` operator.
pub fn name_annotation_op() -> &'static OperatorRef {
    static OP: OnceLock<OperatorRef> = OnceLock::new();
    OP.get_or_init(|| {
        BackendOperator::new(
            NAME_ANNOTATION,
            signature("name"),
            InferenceRule::custom(|attrs: &[Attribute]| {
                let name = &attrs[1];
                if name.qtype().is_some_and(|qtype| *qtype != QType::text()) {
                    return Err(format!("name must be TEXT, got {}", name.qtype().map_or("unknown", QType::name)));
                }
                if name.qvalue().is_none() {
                    return Err("name must be a literal".to_string());
                }
                Ok(attrs[0].qtype().cloned())
            }),
        )
        .with_fold(pass_through)
        .with_doc("Tags an expression with a name.")
        .as_annotation()
        .into_operator()
    })
}

/// The `annotation.qtype` operator.
pub fn qtype_annotation_op() -> &'static OperatorRef {
    static OP: OnceLock<OperatorRef> = OnceLock::new();
    OP.get_or_init(|| {
        BackendOperator::new(
            QTYPE_ANNOTATION,
            signature("qtype"),
            InferenceRule::custom(|attrs: &[Attribute]| {
                let Some(declared) = attrs[1].qvalue().and_then(TypedValue::as_qtype) else {
                    return Err("qtype must be a QTYPE literal".to_string());
                };
                match attrs[0].qtype() {
                    Some(actual) if actual != declared => Err(format!(
                        "expression has type {actual}, annotated as {declared}"
                    )),
                    _ => Ok(Some(declared.clone())),
                }
            }),
        )
        .with_fold(pass_through)
        .with_doc("Declares the type of an expression.")
        .as_annotation()
        .into_operator()
    })
}

/// Tags `expr` with `name`.
///
/// # Errors
///
/// Propagates binding errors.
pub fn with_name(arena: &ExprArena, expr: &ExprRef, name: &str) -> Result<ExprRef> {
    bind_op(arena, name_annotation_op(), [expr.clone(), arena.literal(name)])
}

/// Declares the type of `expr`.
///
/// # Errors
///
/// [`crate::ExprError::TypeError`] if `expr` already has a different type.
pub fn with_qtype(arena: &ExprArena, expr: &ExprRef, qtype: QType) -> Result<ExprRef> {
    bind_op(arena, qtype_annotation_op(), [expr.clone(), arena.literal(qtype)])
}

/// Returns true if `node` applies an annotation operator.
#[must_use]
pub fn is_annotation(node: &ExprRef) -> bool {
    node.op().is_some_and(|op| op.is_annotation())
}

fn annotation_argument<'a>(node: &'a ExprRef, name: &str) -> Option<&'a TypedValue> {
    let op = node.op()?;
    if !op.is_annotation() || op.display_name() != name {
        return None;
    }
    node.deps().get(1)?.qvalue()
}

/// The name carried by an `annotation.name` node.
#[must_use]
pub fn read_name_annotation(node: &ExprRef) -> Option<String> {
    annotation_argument(node, NAME_ANNOTATION)
        .and_then(TypedValue::as_text)
        .map(str::to_string)
}

/// The type declared by an `annotation.qtype` node.
#[must_use]
pub fn read_qtype_annotation(node: &ExprRef) -> Option<QType> {
    annotation_argument(node, QTYPE_ANNOTATION)
        .and_then(TypedValue::as_qtype)
        .cloned()
}

/// Strips annotations wrapped directly around `node`.
#[must_use]
pub fn strip_top_level_annotations(node: &ExprRef) -> ExprRef {
    let mut current = node.clone();
    while is_annotation(&current) {
        match current.deps().first() {
            Some(inner) => current = inner.clone(),
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExprError;

    #[test]
    fn test_name_annotation() {
        let arena = ExprArena::new();
        let x = arena.leaf("x");
        let tagged = with_name(&arena, &x, "input").unwrap();

        assert!(is_annotation(&tagged));
        assert_eq!(read_name_annotation(&tagged), Some("input".to_string()));
        assert_eq!(read_name_annotation(&x), None);
        assert_eq!(strip_top_level_annotations(&tagged), x);
        assert_eq!(tagged.to_string(), "annotation.name(L.x, \"input\")");
    }

    #[test]
    fn test_name_must_be_text() {
        let arena = ExprArena::new();
        let err = bind_op(&arena, name_annotation_op(), [arena.leaf("x"), arena.literal(1i64)]).unwrap_err();
        assert!(matches!(err, ExprError::TypeError { .. }));
    }

    #[test]
    fn test_qtype_annotation_types_leaves() {
        let arena = ExprArena::new();
        let typed = with_qtype(&arena, &arena.leaf("x"), QType::int32()).unwrap();
        assert_eq!(typed.qtype(), Some(&QType::int32()));
        assert_eq!(read_qtype_annotation(&typed), Some(QType::int32()));

        let nested = with_name(&arena, &typed, "n").unwrap();
        assert_eq!(nested.qtype(), Some(&QType::int32()));
        assert_eq!(strip_top_level_annotations(&nested), arena.leaf("x"));
    }

    #[test]
    fn test_qtype_annotation_checks_consistency() {
        let arena = ExprArena::new();
        let lit = arena.literal(1i64);
        let ok = with_qtype(&arena, &lit, QType::int64()).unwrap();
        // The constant passes through.
        assert_eq!(ok.qvalue(), Some(&TypedValue::from(1i64)));

        let err = with_qtype(&arena, &lit, QType::text()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "annotation.qtype: type error: expression has type INT64, annotated as TEXT"
        );
    }
}
