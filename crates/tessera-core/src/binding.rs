//! Binding operators to arguments.
//!
//! Binding is the one way client code builds operator nodes: arguments are
//! matched against the operator's signature, then the node is interned,
//! which runs the constraints and attribute inference. A call that fails at
//! any stage leaves no node behind.

use tracing::trace;

use crate::arena::ExprArena;
use crate::error::Result;
use crate::expr::NodeDescriptor;
use crate::handle::ExprRef;
use crate::operator::OperatorRef;
use crate::registry::OperatorRegistry;

/// Applies `op` to positional arguments.
///
/// # Errors
///
/// [`crate::ExprError::Bind`] for arity problems, plus any constraint or inference
/// error raised while interning the node.
pub fn bind_op(
    arena: &ExprArena,
    op: &OperatorRef,
    args: impl IntoIterator<Item = ExprRef>,
) -> Result<ExprRef> {
    bind_op_with_kwargs(arena, op, args, std::iter::empty())
}

/// Applies `op` to positional and keyword arguments.
///
/// Parameters left unset take their defaults.
///
/// # Errors
///
/// See [`bind_op`].
pub fn bind_op_with_kwargs(
    arena: &ExprArena,
    op: &OperatorRef,
    args: impl IntoIterator<Item = ExprRef>,
    kwargs: impl IntoIterator<Item = (String, ExprRef)>,
) -> Result<ExprRef> {
    let deps = op.signature().bind_arguments(
        arena,
        op.display_name(),
        args.into_iter().collect(),
        kwargs.into_iter().collect(),
    )?;
    let result = arena.intern(NodeDescriptor::Operator {
        op: op.clone(),
        deps: deps.into_iter().collect(),
    });
    if let Err(err) = &result {
        trace!(operator = op.display_name(), error = %err, "binding rejected");
    }
    result
}

/// Looks `name` up in `registry` and applies it to positional arguments.
///
/// # Errors
///
/// [`crate::ExprError::Lookup`] if no operator is registered under `name`,
/// otherwise see [`bind_op`].
pub fn bind_by_name(
    registry: &OperatorRegistry,
    arena: &ExprArena,
    name: &str,
    args: impl IntoIterator<Item = ExprRef>,
) -> Result<ExprRef> {
    let op = registry.get(name)?;
    bind_op(arena, &op, args)
}
