//! Scalar arithmetic.
//!
//! Operands must share one numeric type; there are no implicit casts.
//! Integer folds are checked: a constant expression that overflows keeps its
//! type and is left without a constant instead of wrapping.

use tessera_core::{
    Attribute, BackendOperator, ExprArena, InferenceRule, OperatorRef, QTypeConstraint, Result,
    Signature,
};
use tessera_types::{QType, TypedValue};

use crate::qtype::{equal, is_numeric_op, requires};

/// Name of addition.
pub const ADD: &str = "math.add";
/// Name of subtraction.
pub const SUBTRACT: &str = "math.subtract";
/// Name of multiplication.
pub const MULTIPLY: &str = "math.multiply";
/// Name of negation.
pub const NEG: &str = "math.neg";

#[derive(Clone, Copy, Debug)]
enum Scalar {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    fn from_value(value: &TypedValue) -> std::result::Result<Self, String> {
        if let Some(v) = value.downcast_ref::<i32>() {
            Ok(Scalar::I32(*v))
        } else if let Some(v) = value.downcast_ref::<i64>() {
            Ok(Scalar::I64(*v))
        } else if let Some(v) = value.downcast_ref::<f32>() {
            Ok(Scalar::F32(*v))
        } else if let Some(v) = value.downcast_ref::<f64>() {
            Ok(Scalar::F64(*v))
        } else {
            Err(format!("expected a numeric value, got {}", value.qtype()))
        }
    }

    fn into_value(self) -> TypedValue {
        match self {
            Scalar::I32(v) => v.into(),
            Scalar::I64(v) => v.into(),
            Scalar::F32(v) => v.into(),
            Scalar::F64(v) => v.into(),
        }
    }
}

/// Integer and float implementations of one binary operation.
struct BinaryKernel {
    int32: fn(i32, i32) -> Option<i32>,
    int64: fn(i64, i64) -> Option<i64>,
    float32: fn(f32, f32) -> f32,
    float64: fn(f64, f64) -> f64,
}

impl BinaryKernel {
    fn apply(&self, values: &[TypedValue]) -> std::result::Result<TypedValue, String> {
        let [lhs, rhs] = values else {
            return Err(format!("expected 2 values, got {}", values.len()));
        };
        let overflow = || "integer overflow".to_string();
        let result = match (Scalar::from_value(lhs)?, Scalar::from_value(rhs)?) {
            (Scalar::I32(a), Scalar::I32(b)) => Scalar::I32((self.int32)(a, b).ok_or_else(overflow)?),
            (Scalar::I64(a), Scalar::I64(b)) => Scalar::I64((self.int64)(a, b).ok_or_else(overflow)?),
            (Scalar::F32(a), Scalar::F32(b)) => Scalar::F32((self.float32)(a, b)),
            (Scalar::F64(a), Scalar::F64(b)) => Scalar::F64((self.float64)(a, b)),
            _ => {
                return Err(format!(
                    "operand types differ: {} and {}",
                    lhs.qtype(),
                    rhs.qtype()
                ))
            }
        };
        Ok(result.into_value())
    }
}

/// The type of the first operand whose type is known.
fn first_known(attrs: &[Attribute]) -> std::result::Result<Option<QType>, String> {
    Ok(attrs.iter().find_map(|attr| attr.qtype().cloned()))
}

fn numeric_constraints(arena: &ExprArena, params: &[&str]) -> Result<Vec<QTypeConstraint>> {
    let is_numeric = is_numeric_op()?;
    let mut constraints = params
        .iter()
        .map(|param| {
            requires(
                arena,
                &is_numeric,
                &[*param],
                &format!("expected a numeric type for '{param}', got {{{param}}}"),
            )
        })
        .collect::<Result<Vec<_>>>()?;
    if let [x, y] = params {
        constraints.push(requires(
            arena,
            &equal()?,
            &[*x, *y],
            &format!("operand types differ: {{{x}}} and {{{y}}}"),
        )?);
    }
    Ok(constraints)
}

fn binary(arena: &ExprArena, name: &str, doc: &str, kernel: BinaryKernel) -> Result<OperatorRef> {
    Ok(
        BackendOperator::new(name, Signature::parse("x, y")?, InferenceRule::custom(first_known))
            .with_doc(doc)
            .with_constraints(numeric_constraints(arena, &["x", "y"])?)
            .with_fold(move |values| kernel.apply(values))
            .into_operator(),
    )
}

/// `math.add(x, y)`.
///
/// # Errors
///
/// Propagates errors building the constraint predicates.
pub fn add(arena: &ExprArena) -> Result<OperatorRef> {
    binary(
        arena,
        ADD,
        "Sum of two numbers of the same type.",
        BinaryKernel {
            int32: i32::checked_add,
            int64: i64::checked_add,
            float32: |a, b| a + b,
            float64: |a, b| a + b,
        },
    )
}

/// `math.subtract(x, y)`.
///
/// # Errors
///
/// See [`add`].
pub fn subtract(arena: &ExprArena) -> Result<OperatorRef> {
    binary(
        arena,
        SUBTRACT,
        "Difference of two numbers of the same type.",
        BinaryKernel {
            int32: i32::checked_sub,
            int64: i64::checked_sub,
            float32: |a, b| a - b,
            float64: |a, b| a - b,
        },
    )
}

/// `math.multiply(x, y)`.
///
/// # Errors
///
/// See [`add`].
pub fn multiply(arena: &ExprArena) -> Result<OperatorRef> {
    binary(
        arena,
        MULTIPLY,
        "Product of two numbers of the same type.",
        BinaryKernel {
            int32: i32::checked_mul,
            int64: i64::checked_mul,
            float32: |a, b| a * b,
            float64: |a, b| a * b,
        },
    )
}

/// `math.neg(x)`.
///
/// # Errors
///
/// See [`add`].
pub fn neg(arena: &ExprArena) -> Result<OperatorRef> {
    Ok(
        BackendOperator::new(NEG, Signature::parse("x")?, InferenceRule::SameAsArg(0))
            .with_doc("Arithmetic negation.")
            .with_constraints(numeric_constraints(arena, &["x"])?)
            .with_fold(|values| {
                let value = values.first().ok_or("expected 1 value")?;
                let negated = match Scalar::from_value(value)? {
                    Scalar::I32(v) => Scalar::I32(v.checked_neg().ok_or("integer overflow")?),
                    Scalar::I64(v) => Scalar::I64(v.checked_neg().ok_or("integer overflow")?),
                    Scalar::F32(v) => Scalar::F32(-v),
                    Scalar::F64(v) => Scalar::F64(-v),
                };
                Ok(negated.into_value())
            })
            .into_operator(),
    )
}
