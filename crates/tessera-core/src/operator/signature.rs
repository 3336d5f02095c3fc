//! Operator signatures and argument binding.

use std::fmt;

use tessera_types::{FingerprintHasher, TypedValue};

use crate::arena::ExprArena;
use crate::error::{BindError, ExprError, Result};
use crate::handle::ExprRef;

/// How a parameter consumes arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Exactly one argument.
    Positional,
    /// Every remaining positional argument.
    Variadic,
}

/// A named operator parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    default: Option<TypedValue>,
}

impl Parameter {
    /// A required positional parameter.
    #[must_use]
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Positional,
            default: None,
        }
    }

    /// A variadic parameter.
    #[must_use]
    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Variadic,
            default: None,
        }
    }

    /// Gives the parameter a default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<TypedValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter kind.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// The default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&TypedValue> {
        self.default.as_ref()
    }

    /// Returns true for the variadic parameter.
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.kind == ParameterKind::Variadic
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_variadic() {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, "={}", default.repr())?;
        }
        Ok(())
    }
}

/// An ordered, validated parameter list.
///
/// Validity:
/// - parameter names are unique identifiers,
/// - at most one variadic parameter, and only in last position,
/// - only positional parameters carry defaults,
/// - no parameter without a default follows one with a default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    /// Builds a signature, validating the parameter list.
    ///
    /// # Errors
    ///
    /// [`ExprError::InvalidOperator`] naming the rejected signature.
    pub fn new(params: Vec<Parameter>) -> Result<Self> {
        let signature = Self { params };
        signature.validate()?;
        Ok(signature)
    }

    /// Parses a signature such as `"x, y, *rest"`.
    ///
    /// Defaults cannot be written in this form; attach them with
    /// [`Parameter::with_default`] and [`Signature::new`].
    ///
    /// # Errors
    ///
    /// [`ExprError::InvalidOperator`] on malformed text or an invalid
    /// parameter list.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        let params = text
            .split(',')
            .map(|item| {
                let item = item.trim();
                match item.strip_prefix('*') {
                    Some(name) => Parameter::variadic(name.trim()),
                    None => Parameter::positional(item),
                }
            })
            .collect();
        Self::new(params)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| ExprError::invalid_operator(format!("({self})"), message);
        let mut seen_default = false;
        for (i, param) in self.params.iter().enumerate() {
            let name = param.name();
            let is_identifier = name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !is_identifier {
                return Err(invalid(format!("'{name}' is not a valid parameter name")));
            }
            if self.params[..i].iter().any(|other| other.name() == name) {
                return Err(invalid(format!("duplicate parameter '{name}'")));
            }
            if param.is_variadic() {
                if i + 1 != self.params.len() {
                    return Err(invalid(format!(
                        "variadic parameter '{name}' must be last"
                    )));
                }
                if param.default().is_some() {
                    return Err(invalid(format!(
                        "variadic parameter '{name}' cannot have a default"
                    )));
                }
            } else if param.default().is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(invalid(format!(
                    "parameter '{name}' without default follows a parameter with default"
                )));
            }
        }
        Ok(())
    }

    /// The parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the signature takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The variadic parameter, if any.
    #[must_use]
    pub fn variadic(&self) -> Option<&Parameter> {
        self.params.last().filter(|param| param.is_variadic())
    }

    /// Number of positional parameters.
    #[must_use]
    pub fn positional_count(&self) -> usize {
        self.params.len() - usize::from(self.variadic().is_some())
    }

    /// Smallest number of positional arguments a call may pass.
    #[must_use]
    pub fn min_arity(&self) -> usize {
        self.params
            .iter()
            .filter(|param| !param.is_variadic() && param.default().is_none())
            .count()
    }

    /// Largest number of positional arguments, or `None` when variadic.
    #[must_use]
    pub fn max_arity(&self) -> Option<usize> {
        if self.variadic().is_some() {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// Human-readable accepted call arity, e.g. `"2"`, `"1 to 3"`.
    #[must_use]
    pub fn arity_text(&self) -> String {
        let min = self.min_arity();
        match self.max_arity() {
            None => format!("at least {min}"),
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{min} to {max}"),
        }
    }

    /// Returns the parameter that receives the dependency at `index`.
    #[must_use]
    pub fn param_for_dep(&self, index: usize) -> Option<&Parameter> {
        self.params
            .get(index)
            .filter(|param| !param.is_variadic())
            .or_else(|| self.variadic())
    }

    /// Checks a node's dependency count after binding.
    ///
    /// Bound nodes carry one dependency per positional parameter (defaults
    /// filled in) followed by any variadic arguments.
    ///
    /// # Errors
    ///
    /// [`BindError::ArityMismatch`] when the count does not fit.
    pub fn validate_deps_count(&self, operator: &str, count: usize) -> std::result::Result<(), BindError> {
        let positional = self.positional_count();
        let fits = if self.variadic().is_some() {
            count >= positional
        } else {
            count == positional
        };
        if fits {
            Ok(())
        } else {
            let expected = if self.variadic().is_some() {
                format!("at least {positional}")
            } else {
                positional.to_string()
            };
            Err(BindError::ArityMismatch {
                operator: operator.to_string(),
                expected,
                got: count,
            })
        }
    }

    /// Maps positional and keyword arguments onto the parameters.
    ///
    /// Returns the dependency list of the bound node: one entry per
    /// positional parameter, missing ones filled from their defaults as
    /// literal nodes, followed by the variadic arguments.
    ///
    /// # Errors
    ///
    /// [`BindError`] for too many or too few arguments, unknown keywords,
    /// duplicate values, and missing required arguments.
    pub fn bind_arguments(
        &self,
        arena: &ExprArena,
        operator: &str,
        args: Vec<ExprRef>,
        kwargs: Vec<(String, ExprRef)>,
    ) -> std::result::Result<Vec<ExprRef>, BindError> {
        let positional = self.positional_count();
        let got = args.len() + kwargs.len();
        let arity_mismatch = || BindError::ArityMismatch {
            operator: operator.to_string(),
            expected: self.arity_text(),
            got,
        };
        if self.variadic().is_none() && args.len() > positional {
            return Err(arity_mismatch());
        }
        if kwargs.is_empty() && args.len() < self.min_arity() {
            return Err(arity_mismatch());
        }

        let mut slots: Vec<Option<ExprRef>> = vec![None; positional];
        let mut rest = Vec::new();
        for (i, arg) in args.into_iter().enumerate() {
            if i < positional {
                slots[i] = Some(arg);
            } else {
                rest.push(arg);
            }
        }

        for (name, value) in kwargs {
            let Some(index) = self.params[..positional]
                .iter()
                .position(|param| param.name() == name)
            else {
                return Err(BindError::UnknownKeyword {
                    operator: operator.to_string(),
                    name,
                });
            };
            if slots[index].is_some() {
                return Err(BindError::DuplicateArgument {
                    operator: operator.to_string(),
                    name,
                });
            }
            slots[index] = Some(value);
        }

        let mut deps = Vec::with_capacity(positional + rest.len());
        for (param, slot) in self.params.iter().zip(slots) {
            match (slot, param.default()) {
                (Some(arg), _) => deps.push(arg),
                (None, Some(default)) => deps.push(arena.literal(default.clone())),
                (None, None) => {
                    return Err(BindError::MissingArgument {
                        operator: operator.to_string(),
                        name: param.name().to_string(),
                    })
                }
            }
        }
        deps.extend(rest);
        Ok(deps)
    }

    /// Mixes the signature into an operator fingerprint.
    pub fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_usize(self.params.len());
        for param in &self.params {
            hasher
                .combine_str(param.name())
                .combine_bool(param.is_variadic());
            match param.default() {
                Some(default) => hasher.combine_bool(true).combine_fingerprint(default.fingerprint()),
                None => hasher.combine_bool(false),
            };
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let sig = Signature::parse("x, y, *rest").unwrap();
        assert_eq!(sig.len(), 3);
        assert_eq!(sig.positional_count(), 2);
        assert_eq!(sig.variadic().map(Parameter::name), Some("rest"));
        assert_eq!(sig.to_string(), "x, y, *rest");
        assert_eq!(sig.arity_text(), "at least 2");

        assert!(Signature::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_signatures() {
        assert!(Signature::parse("x, x").is_err());
        assert!(Signature::parse("*rest, x").is_err());
        assert!(Signature::parse("1x").is_err());
        assert!(Signature::parse("x,").is_err());

        let after_default = Signature::new(vec![
            Parameter::positional("x").with_default(1i64),
            Parameter::positional("y"),
        ]);
        assert!(matches!(after_default, Err(ExprError::InvalidOperator { .. })));
    }

    #[test]
    fn test_validate_deps_count() {
        let sig = Signature::parse("x, y").unwrap();
        assert!(sig.validate_deps_count("op", 2).is_ok());
        let err = sig.validate_deps_count("op", 3).unwrap_err();
        assert_eq!(err.to_string(), "op: expected 2 argument(s), got 3");

        let variadic = Signature::parse("x, *rest").unwrap();
        assert!(variadic.validate_deps_count("op", 1).is_ok());
        assert!(variadic.validate_deps_count("op", 4).is_ok());
        assert!(variadic.validate_deps_count("op", 0).is_err());
    }

    #[test]
    fn test_bind_arguments() {
        let arena = ExprArena::new();
        let sig = Signature::new(vec![
            Parameter::positional("x"),
            Parameter::positional("y").with_default(10i64),
        ])
        .unwrap();
        assert_eq!(sig.arity_text(), "1 to 2");

        let a = arena.leaf("a");
        let b = arena.leaf("b");

        let deps = sig.bind_arguments(&arena, "op", vec![a.clone()], vec![]).unwrap();
        assert_eq!(deps, vec![a.clone(), arena.literal(10i64)]);

        let deps = sig
            .bind_arguments(&arena, "op", vec![], vec![("y".into(), b.clone()), ("x".into(), a.clone())])
            .unwrap();
        assert_eq!(deps, vec![a.clone(), b.clone()]);

        let err = sig
            .bind_arguments(&arena, "op", vec![a.clone()], vec![("x".into(), b.clone())])
            .unwrap_err();
        assert!(matches!(err, BindError::DuplicateArgument { .. }));

        let err = sig
            .bind_arguments(&arena, "op", vec![], vec![("z".into(), b.clone())])
            .unwrap_err();
        assert!(matches!(err, BindError::UnknownKeyword { .. }));

        let err = sig
            .bind_arguments(&arena, "op", vec![], vec![("y".into(), b)])
            .unwrap_err();
        assert!(matches!(err, BindError::MissingArgument { .. }));

        let err = sig.bind_arguments(&arena, "op", vec![], vec![]).unwrap_err();
        assert!(matches!(err, BindError::ArityMismatch { got: 0, .. }));
    }

    #[test]
    fn test_bind_variadic() {
        let arena = ExprArena::new();
        let sig = Signature::parse("x, *rest").unwrap();
        let args: Vec<_> = ["a", "b", "c"].iter().map(|k| arena.leaf(*k)).collect();
        let deps = sig.bind_arguments(&arena, "op", args.clone(), vec![]).unwrap();
        assert_eq!(deps, args);
        assert_eq!(sig.param_for_dep(2).map(Parameter::name), Some("rest"));
    }
}
