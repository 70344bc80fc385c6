//! Parameter matching
//!
//! Binds a parsed [`ParamValue`] tree against a [`ReferenceParam`] and
//! produces a normalized tree: every slot of the reference is filled (from
//! a positional argument, a named argument or a default), values are
//! converted to the declared types, and nodes are named after the
//! reference, in declaration order.
//!
//! ## Array rules
//!
//! - Parameters before the first one with a default are mandatory.
//! - A trailing variadic parameter absorbs zero or more extra positional
//!   arguments. Named arguments are rejected for variadic signatures.
//! - Arguments bind positionally until the first named argument. From there
//!   on every remaining slot is looked up by name, falling back to its
//!   default.
//! - Every argument must be consumed: unknown names and positional
//!   arguments after a named one fail the match.

use crate::error::{MatchError, MatchResult};
use crate::reference::{ReferenceParam, ReferenceType};
use crate::types::TypeDefinitions;
use crate::value::{ParamKind, ParamType, ParamValue};

/// Matches parameter trees against references
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    types: &'a TypeDefinitions,
}

impl<'a> Matcher<'a> {
    /// Create a matcher resolving custom types through `types`
    pub fn new(types: &'a TypeDefinitions) -> Self {
        Self { types }
    }

    /// Match `input` against `reference`.
    ///
    /// A missing reference accepts anything and returns a copy of `input`.
    pub fn match_param(
        &self,
        reference: Option<&ReferenceParam>,
        input: &ParamValue,
    ) -> MatchResult<ParamValue> {
        let Some(reference) = reference else {
            return Ok(input.clone());
        };

        match reference.reference_type() {
            ReferenceType::Custom(type_name) => self.match_custom(reference, type_name, input),
            ReferenceType::Param(ParamType::Array) => self.match_array(reference, input),
            ReferenceType::Param(ty) => self.match_scalar(reference, *ty, input),
        }
    }

    fn match_custom(
        &self,
        reference: &ReferenceParam,
        type_name: &str,
        input: &ParamValue,
    ) -> MatchResult<ParamValue> {
        let definition = self
            .types
            .get(type_name)
            .map_err(|_| MatchError::UnknownType(type_name.to_string()))?;

        let mut first_error = None;
        for (index, overload) in definition.overloads().iter().enumerate() {
            match self.match_param(Some(overload), input) {
                Ok(value) => {
                    return Ok(match reference.name() {
                        Some(name) => value.with_name(name),
                        None => value,
                    });
                }
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => {
                    log::trace!("{} overload {} rejected {}: {}", type_name, index, input, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| MatchError::NoMatchingOverload(type_name.to_string())))
    }

    fn match_scalar(
        &self,
        reference: &ReferenceParam,
        ty: ParamType,
        input: &ParamValue,
    ) -> MatchResult<ParamValue> {
        if ty == ParamType::Any {
            // Loose passthrough: arrays are copied without structural checks
            let value = match input.kind() {
                ParamKind::Array(children) => ParamValue::array(children.clone()),
                ParamKind::Scalar(_) => input.clone(),
            };
            return Ok(value.renamed(reference.name()));
        }

        let Some(scalar) = input.as_scalar() else {
            return Err(MatchError::type_mismatch(ty, input.param_type()));
        };
        if !input.is_valid_type(ty) {
            return Err(MatchError::type_mismatch(ty, input.param_type()));
        }

        let text = scalar.text();
        if ty == ParamType::Const {
            let expected = reference.name().unwrap_or_default();
            if !text.eq_ignore_ascii_case(expected) {
                return Err(MatchError::ConstMismatch {
                    expected: expected.to_string(),
                    found: text,
                });
            }
        }

        Ok(ParamValue::parse(ty, &text)?.renamed(reference.name()))
    }

    fn match_array(&self, reference: &ReferenceParam, input: &ParamValue) -> MatchResult<ParamValue> {
        let ParamKind::Array(inputs) = input.kind() else {
            return Err(MatchError::type_mismatch(ParamType::Array, input.param_type()));
        };
        let references = reference.children();

        let variadic = references.last().is_some_and(ReferenceParam::is_variadic);
        let fixed = if variadic { references.len() - 1 } else { references.len() };
        let default_index = references[..fixed]
            .iter()
            .position(ReferenceParam::is_optional)
            .unwrap_or(fixed);

        if variadic {
            if let Some(named) = inputs.iter().find(|p| p.is_named()) {
                return Err(MatchError::VariadicNamedConflict(
                    named.name().unwrap_or_default().to_string(),
                ));
            }
        }

        if inputs.len() < default_index || (!variadic && inputs.len() > references.len()) {
            let expected = if variadic {
                format!("at least {}", default_index)
            } else if default_index == references.len() {
                references.len().to_string()
            } else {
                format!("{} to {}", default_index, references.len())
            };
            return Err(MatchError::ArityError { expected, got: inputs.len() });
        }

        let slot_count = if variadic {
            references.len().max(inputs.len())
        } else {
            references.len()
        };

        let mut bound = Vec::with_capacity(slot_count);
        let mut consumed = vec![false; inputs.len()];
        let mut cursor = 0;
        let mut named_mode = false;

        for slot in 0..slot_count {
            // Extra variadic slots keep reusing the last reference
            let slot_ref = &references[slot.min(references.len() - 1)];

            let positional = inputs.get(cursor).filter(|p| !named_mode && !p.is_named());
            if let Some(argument) = positional {
                log::trace!("slot {} bound positionally to {}", slot, argument);
                bound.push(self.match_param(Some(slot_ref), argument)?);
                consumed[cursor] = true;
                cursor += 1;
            } else if named_mode || cursor < inputs.len() {
                named_mode = true;
                let found = slot_ref
                    .name()
                    .and_then(|name| inputs.iter().position(|p| p.name() == Some(name)));
                match found {
                    Some(index) => {
                        log::trace!("slot {} bound by name to {}", slot, inputs[index]);
                        bound.push(self.match_param(Some(slot_ref), &inputs[index])?);
                        consumed[index] = true;
                    }
                    None => bound.push(Self::default_for(slot_ref)?),
                }
            } else if slot_ref.is_variadic() {
                break;
            } else {
                bound.push(Self::default_for(slot_ref)?);
            }
        }

        if let Some(index) = consumed.iter().position(|used| !used) {
            let leftover = &inputs[index];
            return Err(if leftover.is_named() {
                MatchError::UnresolvedNamedParam(leftover.name().unwrap_or_default().to_string())
            } else {
                MatchError::PositionalAfterNamed(index)
            });
        }

        Ok(ParamValue::array(bound).renamed(reference.name()))
    }

    fn default_for(slot_ref: &ReferenceParam) -> MatchResult<ParamValue> {
        match slot_ref.default_value() {
            Some(default) => Ok(default.clone().renamed(slot_ref.name())),
            None => Err(MatchError::UnresolvedNamedParam(
                slot_ref.name().map_or_else(|| slot_ref.to_string(), str::to_string),
            )),
        }
    }
}

/// Match with a one-off matcher
pub fn match_params(
    types: &TypeDefinitions,
    reference: Option<&ReferenceParam>,
    input: &ParamValue,
) -> MatchResult<ParamValue> {
    Matcher::new(types).match_param(reference, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDefinition;

    fn bind(reference: &ReferenceParam, input: &ParamValue) -> MatchResult<ParamValue> {
        match_params(&TypeDefinitions::new(), Some(reference), input)
    }

    fn ints(values: &[i64]) -> ParamValue {
        ParamValue::array(values.iter().copied().map(ParamValue::integer).collect())
    }

    #[test]
    fn test_no_reference_is_identity() {
        let input = ParamValue::array(vec![ParamValue::string("x").with_name("a")]);
        let result = match_params(&TypeDefinitions::new(), None, &input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_scalar_conversion() {
        let result = bind(&ReferenceParam::float("speed"), &ParamValue::integer(2)).unwrap();
        assert_eq!(result.as_scalar(), Some(&crate::value::Scalar::Float(2.0)));
        assert_eq!(result.name(), Some("speed"));

        let err = bind(&ReferenceParam::integer("n"), &ParamValue::float(2.5)).unwrap_err();
        assert_eq!(err, MatchError::type_mismatch(ParamType::Integer, ParamType::Float));
    }

    #[test]
    fn test_const_is_case_insensitive() {
        let reference = ReferenceParam::constant("loop");
        let result = bind(&reference, &ParamValue::constant("LOOP")).unwrap();
        assert_eq!(result.as_str(), Some("LOOP"));

        let err = bind(&reference, &ParamValue::constant("once")).unwrap_err();
        assert!(matches!(err, MatchError::ConstMismatch { .. }));

        let err = bind(&reference, &ParamValue::string("loop")).unwrap_err();
        assert!(matches!(err, MatchError::TypeMismatch { .. }));

        // Same ASCII-only folding as command words
        let err = bind(&ReferenceParam::constant("été"), &ParamValue::constant("ÉTÉ")).unwrap_err();
        assert!(matches!(err, MatchError::ConstMismatch { .. }));
    }

    #[test]
    fn test_any_passes_arrays_through() {
        let input = ParamValue::array(vec![ParamValue::string("a"), ints(&[1, 2])]).with_name("x");
        let result = bind(&ReferenceParam::any("data"), &input).unwrap();
        assert_eq!(result.name(), Some("data"));
        assert_eq!(result.children(), input.children());
    }

    #[test]
    fn test_scalar_reference_rejects_array() {
        let err = bind(&ReferenceParam::integer("x"), &ints(&[1])).unwrap_err();
        assert_eq!(err, MatchError::type_mismatch(ParamType::Integer, ParamType::Array));
    }

    #[test]
    fn test_array_reference_rejects_scalar() {
        let reference = ReferenceParam::array(vec![ReferenceParam::integer("x")]);
        let err = bind(&reference, &ParamValue::integer(1)).unwrap_err();
        assert_eq!(err, MatchError::type_mismatch(ParamType::Array, ParamType::Integer));
    }

    #[test]
    fn test_too_many_arguments() {
        let reference = ReferenceParam::array(vec![ReferenceParam::integer("x")]);
        let err = bind(&reference, &ints(&[1, 2])).unwrap_err();
        assert_eq!(err, MatchError::ArityError { expected: "1".into(), got: 2 });
    }

    #[test]
    fn test_required_after_optional_by_name() {
        let reference = ReferenceParam::array(vec![
            ReferenceParam::integer("a"),
            ReferenceParam::integer("b").with_default(ParamValue::integer(1)),
            ReferenceParam::integer("c"),
        ]);

        let input = ParamValue::array(vec![
            ParamValue::integer(5),
            ParamValue::integer(7).with_name("c"),
        ]);
        let result = bind(&reference, &input).unwrap();
        let values: Vec<_> = result.children().iter().filter_map(ParamValue::as_int).collect();
        assert_eq!(values, vec![5, 1, 7]);
        assert_eq!(result.child(2).and_then(ParamValue::name), Some("c"));

        let err = bind(&reference, &ints(&[5])).unwrap_err();
        assert_eq!(err, MatchError::UnresolvedNamedParam("c".into()));
    }

    #[test]
    fn test_duplicate_named_argument() {
        let reference = ReferenceParam::array(vec![
            ReferenceParam::integer("x").with_default(ParamValue::integer(0)),
        ]);
        let input = ParamValue::array(vec![
            ParamValue::integer(1).with_name("x"),
            ParamValue::integer(2).with_name("x"),
        ]);
        let err = bind(&reference, &input).unwrap_err();
        assert_eq!(err, MatchError::UnresolvedNamedParam("x".into()));
    }

    #[test]
    fn test_custom_type_first_error_reported() {
        let mut types = TypeDefinitions::new();
        types
            .define(TypeDefinition::new(
                "Flag",
                vec![ReferenceParam::constant("on"), ReferenceParam::boolean("")],
            ))
            .unwrap();

        let err = match_params(&types, Some(&ReferenceParam::custom("Flag")), &ParamValue::integer(1))
            .unwrap_err();
        assert_eq!(err, MatchError::type_mismatch(ParamType::Const, ParamType::Integer));
    }

    #[test]
    fn test_custom_type_without_overloads() {
        let mut types = TypeDefinitions::new();
        types.define(TypeDefinition::new("Nothing", Vec::new())).unwrap();

        let err = match_params(&types, Some(&ReferenceParam::custom("Nothing")), &ParamValue::integer(1))
            .unwrap_err();
        assert_eq!(err, MatchError::NoMatchingOverload("Nothing".into()));
    }

    #[test]
    fn test_unknown_custom_type() {
        let err = bind(&ReferenceParam::custom("Missing"), &ParamValue::integer(1)).unwrap_err();
        assert_eq!(err, MatchError::UnknownType("Missing".into()));
    }
}
