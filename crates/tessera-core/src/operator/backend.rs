//! Primitive operators.

use std::fmt;
use std::sync::Arc;

use tessera_types::{Fingerprint, FingerprintHasher, QType, TypedValue};
use tracing::debug;

use crate::error::{ExprError, Result};
use crate::expr::Attribute;
use crate::operator::constraint::QTypeConstraint;
use crate::operator::signature::Signature;
use crate::operator::{Operator, OperatorRef};

/// A custom inference function. `Ok(None)` means "not determined yet",
/// `Err` reports an illegal combination.
pub type InferFn = Arc<dyn Fn(&[Attribute]) -> std::result::Result<Option<QType>, String> + Send + Sync>;

/// A constant-folding function over the argument values.
pub type FoldFn = Arc<dyn Fn(&[TypedValue]) -> std::result::Result<TypedValue, String> + Send + Sync>;

/// How a backend operator derives its output type.
#[derive(Clone)]
pub enum InferenceRule {
    /// Always the given type.
    Fixed(QType),
    /// The type of the argument at the given position, once known.
    SameAsArg(usize),
    /// An arbitrary function of the argument attributes.
    Custom(InferFn),
}

impl InferenceRule {
    /// Wraps a closure as a custom rule.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[Attribute]) -> std::result::Result<Option<QType>, String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    fn infer(&self, attrs: &[Attribute]) -> std::result::Result<Option<QType>, String> {
        match self {
            InferenceRule::Fixed(qtype) => Ok(Some(qtype.clone())),
            InferenceRule::SameAsArg(index) => Ok(attrs.get(*index).and_then(Attribute::qtype).cloned()),
            InferenceRule::Custom(f) => f(attrs),
        }
    }
}

impl fmt::Debug for InferenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceRule::Fixed(qtype) => write!(f, "Fixed({qtype})"),
            InferenceRule::SameAsArg(index) => write!(f, "SameAsArg({index})"),
            InferenceRule::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// A primitive operator with an opaque implementation.
///
/// The operator only declares what the engine needs: a signature, qtype
/// constraints, an inference rule and optionally a fold function used for
/// constant propagation. Its identity is its name, signature and
/// constraints.
#[derive(Clone)]
pub struct BackendOperator {
    name: String,
    signature: Signature,
    constraints: Vec<QTypeConstraint>,
    rule: InferenceRule,
    fold: Option<FoldFn>,
    doc: String,
    annotation: bool,
}

impl BackendOperator {
    /// Creates a backend operator.
    pub fn new(name: impl Into<String>, signature: Signature, rule: InferenceRule) -> Self {
        Self {
            name: name.into(),
            signature,
            constraints: Vec::new(),
            rule,
            fold: None,
            doc: String::new(),
            annotation: false,
        }
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Appends a qtype constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: QTypeConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Replaces the qtype constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Vec<QTypeConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Declares the operator foldable.
    #[must_use]
    pub fn with_fold<F>(mut self, fold: F) -> Self
    where
        F: Fn(&[TypedValue]) -> std::result::Result<TypedValue, String> + Send + Sync + 'static,
    {
        self.fold = Some(Arc::new(fold));
        self
    }

    /// Flags the operator as an annotation: its first argument is the
    /// annotated expression and passes through lowering unchanged.
    #[must_use]
    pub fn as_annotation(mut self) -> Self {
        self.annotation = true;
        self
    }

    /// Finalizes the operator.
    #[must_use]
    pub fn into_operator(self) -> OperatorRef {
        let fingerprint = self.compute_fingerprint();
        Arc::new(Operator::Backend {
            op: self,
            fingerprint,
        })
    }

    fn compute_fingerprint(&self) -> Fingerprint {
        let mut hasher = FingerprintHasher::new("backend operator");
        hasher.combine_str(&self.name);
        self.signature.fingerprint_into(&mut hasher);
        hasher.combine_usize(self.constraints.len());
        for constraint in &self.constraints {
            constraint.fingerprint_into(&mut hasher);
        }
        hasher.finish()
    }

    /// The operator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The qtype constraints.
    #[must_use]
    pub fn constraints(&self) -> &[QTypeConstraint] {
        &self.constraints
    }

    /// The documentation string.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Returns true if a fold function is declared.
    #[must_use]
    pub fn is_foldable(&self) -> bool {
        self.fold.is_some()
    }

    /// Returns true for annotation operators.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.annotation
    }

    /// Runs the inference rule and, when every input is constant, the fold.
    ///
    /// A fold that fails leaves the node typed but without a constant, so
    /// the type never depends on whether the inputs happen to be literals.
    pub(crate) fn infer(&self, attrs: &[Attribute]) -> Result<Attribute> {
        let qtype = self
            .rule
            .infer(attrs)
            .map_err(|message| ExprError::type_error(&self.name, message))?;

        let (Some(fold), Some(qtype)) = (&self.fold, qtype.as_ref()) else {
            return Ok(Attribute::new(qtype));
        };
        let Some(values) = attrs
            .iter()
            .map(|attr| attr.qvalue().cloned())
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(Attribute::new(Some(qtype.clone())));
        };

        let value = match fold(&values) {
            Ok(value) => value,
            Err(message) => {
                debug!(operator = %self.name, %message, "constant fold failed");
                return Ok(Attribute::new(Some(qtype.clone())));
            }
        };
        if value.qtype() != qtype {
            return Err(ExprError::type_error(
                &self.name,
                format!(
                    "folded value has type {} but the inferred type is {qtype}",
                    value.qtype()
                ),
            ));
        }
        Ok(Attribute::from_value(value))
    }
}

impl fmt::Debug for BackendOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendOperator")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .field("rule", &self.rule)
            .field("foldable", &self.fold.is_some())
            .field("annotation", &self.annotation)
            .finish_non_exhaustive()
    }
}
