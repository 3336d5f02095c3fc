//! Lowering composite operators to backend operators.

use tessera_core::{ExprArena, ExprError, ExprRef, Operator, Result};
use tracing::debug;

use crate::transform::{deep_transform, TransformConfig};

/// Lowers a single node by one step.
///
/// - Lambda calls become the lambda body with the placeholders substituted
///   by the call's dependencies.
/// - Dispatch calls become a call of the selected candidate; a call whose
///   choice is still undetermined is returned unchanged.
/// - Backend calls, literals, leaves and placeholders are returned
///   unchanged.
///
/// # Errors
///
/// [`ExprError::TypeError`] if the lowered node has a known type different
/// from the known type of `node`. Propagates errors building the expansion.
pub fn to_lower_node(arena: &ExprArena, node: &ExprRef) -> Result<ExprRef> {
    let Some(op) = node.op() else {
        return Ok(node.clone());
    };
    let expansion = match &**op {
        Operator::Backend { .. } => None,
        Operator::Lambda { .. } | Operator::Dispatch { .. } => op.expand(arena, node.deps())?,
    };
    let Some(lowered) = expansion else {
        return Ok(node.clone());
    };

    if let (Some(before), Some(after)) = (node.qtype(), lowered.qtype()) {
        if before != after {
            return Err(ExprError::type_error(
                op.display_name(),
                format!("lowering changed the type from {before} to {after}"),
            ));
        }
    }
    debug!(
        operator = op.display_name(),
        from = %node.fingerprint(),
        to = %lowered.fingerprint(),
        "lowered node"
    );
    Ok(lowered)
}

/// Lowers every node of `root` until only backend operators and
/// undetermined dispatch calls remain.
///
/// # Errors
///
/// See [`to_lower_node`] and [`deep_transform`].
pub fn to_lowest(arena: &ExprArena, root: &ExprRef) -> Result<ExprRef> {
    to_lowest_with_config(arena, root, &TransformConfig::default())
}

/// [`to_lowest`] with an explicit configuration.
///
/// # Errors
///
/// See [`to_lowest`].
pub fn to_lowest_with_config(
    arena: &ExprArena,
    root: &ExprRef,
    config: &TransformConfig,
) -> Result<ExprRef> {
    deep_transform(arena, root, |node| to_lower_node(arena, node), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{
        annotation::with_qtype, BackendOperator, DispatchCase, DispatchOperator, InferenceRule,
        LambdaOperator, OperatorRef, Signature,
    };
    use tessera_types::{QType, TypedValue};

    fn backend(name: &str, sig: &str) -> OperatorRef {
        BackendOperator::new(name, Signature::parse(sig).unwrap(), InferenceRule::SameAsArg(0))
            .into_operator()
    }

    #[test]
    fn test_backend_is_lowest() {
        let arena = ExprArena::new();
        let node = arena.call(&backend("b", "x"), [arena.leaf("x")]).unwrap();
        assert!(to_lower_node(&arena, &node).unwrap().ptr_eq(&node));
        assert!(to_lowest(&arena, &node).unwrap().ptr_eq(&node));
    }

    #[test]
    fn test_nested_lambdas_lower_to_fixed_point() {
        let arena = ExprArena::new();
        let add = backend("add", "x, y");

        // double(x) = add(x, x); quadruple(x) = double(double(x))
        let double_body = arena
            .call(&add, [arena.placeholder("x"), arena.placeholder("x")])
            .unwrap();
        let double = LambdaOperator::with_inferred_signature("double", double_body)
            .unwrap()
            .into_operator();
        let quadruple_body = arena
            .call(&double, [arena.call(&double, [arena.placeholder("x")]).unwrap()])
            .unwrap();
        let quadruple = LambdaOperator::with_inferred_signature("quadruple", quadruple_body)
            .unwrap()
            .into_operator();

        let v = arena.leaf("v");
        let expr = arena.call(&quadruple, [v.clone()]).unwrap();

        // One step only unfolds the outer lambda.
        let one_step = to_lower_node(&arena, &expr).unwrap();
        assert_eq!(one_step.op().map(|op| op.display_name()), Some("double"));

        let lowest = to_lowest(&arena, &expr).unwrap();
        let inner = arena.call(&add, [v.clone(), v]).unwrap();
        assert_eq!(lowest, arena.call(&add, [inner.clone(), inner]).unwrap());
    }

    #[test]
    fn test_dispatch_lowering() {
        let arena = ExprArena::new();
        let eq = BackendOperator::new(
            "eq",
            Signature::parse("a, b").unwrap(),
            InferenceRule::Fixed(QType::boolean()),
        )
        .with_fold(|values| Ok(TypedValue::from(values[0] == values[1])))
        .into_operator();
        let is_int = arena
            .call(&eq, [arena.placeholder("x"), arena.literal(QType::int64())])
            .unwrap();
        let on_int = backend("on_int", "x");
        let fallback = backend("fallback", "x");
        let dispatch = DispatchOperator::new(
            "pick",
            Signature::parse("x").unwrap(),
            vec![DispatchCase::new("int", is_int, on_int.clone())],
            Some(fallback.clone()),
        )
        .unwrap()
        .into_operator();

        let int_leaf = with_qtype(&arena, &arena.leaf("i"), QType::int64()).unwrap();
        let lowered = to_lowest(&arena, &arena.call(&dispatch, [int_leaf.clone()]).unwrap()).unwrap();
        assert_eq!(lowered, arena.call(&on_int, [int_leaf]).unwrap());

        let text = arena.literal("t");
        let lowered = to_lowest(&arena, &arena.call(&dispatch, [text.clone()]).unwrap()).unwrap();
        assert_eq!(lowered, arena.call(&fallback, [text]).unwrap());

        // Unknown argument type: the choice stays open.
        let open = arena.call(&dispatch, [arena.leaf("u")]).unwrap();
        assert!(to_lowest(&arena, &open).unwrap().ptr_eq(&open));
    }

    #[test]
    fn test_lowering_keeps_inferred_type() {
        let arena = ExprArena::new();
        let to_text = BackendOperator::new(
            "to_text",
            Signature::parse("x").unwrap(),
            InferenceRule::Fixed(QType::text()),
        )
        .into_operator();
        let body = arena.call(&to_text, [arena.placeholder("x")]).unwrap();
        let lambda = LambdaOperator::with_inferred_signature("stringify", body)
            .unwrap()
            .into_operator();
        let node = arena.call(&lambda, [arena.literal(1i32)]).unwrap();
        assert_eq!(node.qtype(), Some(&QType::text()));

        let lowered = to_lower_node(&arena, &node).unwrap();
        assert_eq!(lowered.qtype(), Some(&QType::text()));
        assert_eq!(lowered.op().map(|op| op.display_name()), Some("to_text"));
    }
}
