//! Registration-time validation
//!
//! Everything here runs once while a command set is built, so that
//! configuration mistakes surface at startup rather than as match failures:
//! - Custom type references must resolve
//! - Custom types may not alias themselves without an array in between
//! - Variadic parameters must be the last child of an array and have no default
//! - Default values must match their own declaration (and are normalized)

use std::collections::BTreeSet;

use crate::error::{DefinitionError, DefinitionResult};
use crate::matcher::Matcher;
use crate::reference::{ReferenceParam, ReferenceType};
use crate::types::TypeDefinitions;

/// Check one reference tree. `context` names the owner in error messages.
pub fn validate_reference(
    reference: &ReferenceParam,
    types: &TypeDefinitions,
    context: &str,
) -> DefinitionResult<()> {
    if reference.is_variadic() {
        return Err(DefinitionError::InvalidVariadic {
            context: context.to_string(),
            reason: format!("'{}' is not inside an array", reference),
        });
    }
    validate_node(reference, types, context)
}

fn validate_node(reference: &ReferenceParam, types: &TypeDefinitions, context: &str) -> DefinitionResult<()> {
    if let Some(name) = reference.custom_type_name() {
        if !types.contains(name) {
            return Err(DefinitionError::UnknownType {
                name: name.to_string(),
                context: context.to_string(),
            });
        }
    }

    let children = reference.children();
    for (index, child) in children.iter().enumerate() {
        if child.is_variadic() {
            let reason = if index + 1 != children.len() {
                Some(format!("'{}' is not the last parameter", child))
            } else if child.is_optional() {
                Some(format!("'{}' declares a default value", child))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(DefinitionError::InvalidVariadic {
                    context: context.to_string(),
                    reason,
                });
            }
        }
        validate_node(child, types, context)?;
    }
    Ok(())
}

/// Detect custom types that resolve to themselves through plain aliases.
///
/// Only root overloads count: recursion through an array child is bounded
/// by the depth of the input and is allowed.
pub fn check_type_cycles(types: &TypeDefinitions) -> DefinitionResult<()> {
    for definition in types.iter() {
        let mut visiting = BTreeSet::new();
        visit_aliases(definition.name(), types, &mut visiting)?;
    }
    Ok(())
}

fn visit_aliases<'a>(
    name: &'a str,
    types: &'a TypeDefinitions,
    visiting: &mut BTreeSet<&'a str>,
) -> DefinitionResult<()> {
    if !visiting.insert(name) {
        return Err(DefinitionError::CyclicType(name.to_string()));
    }
    if let Ok(definition) = types.get(name) {
        for overload in definition.overloads() {
            if let ReferenceType::Custom(target) = overload.reference_type() {
                visit_aliases(target, types, visiting)?;
            }
        }
    }
    visiting.remove(name);
    Ok(())
}

/// Replace every default in the tree with its own matched form.
///
/// A default of `0` declared for a float becomes `0.0`, so a bound default
/// always carries the declared type.
pub fn normalize_defaults(matcher: &Matcher<'_>, reference: &mut ReferenceParam) -> DefinitionResult<()> {
    for child in reference.children_mut() {
        normalize_defaults(matcher, child)?;
    }

    if let Some(default) = reference.default_value() {
        let normalized = matcher
            .match_param(Some(reference), default)
            .map_err(|source| DefinitionError::InvalidDefault {
                param: reference.name().map_or_else(|| reference.to_string(), str::to_string),
                source,
            })?;
        reference.set_default(normalized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDefinition;
    use crate::value::{ParamValue, Scalar};

    fn types_with(definitions: Vec<TypeDefinition>) -> TypeDefinitions {
        let mut types = TypeDefinitions::new();
        for definition in definitions {
            types.define(definition).unwrap();
        }
        types
    }

    #[test]
    fn test_unknown_type() {
        let reference = ReferenceParam::array(vec![ReferenceParam::custom("Color").named("c")]);
        let err = validate_reference(&reference, &TypeDefinitions::new(), "paint").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownType { name: "Color".into(), context: "paint".into() }
        );
    }

    #[test]
    fn test_variadic_must_be_last() {
        let reference = ReferenceParam::array(vec![
            ReferenceParam::string("names").variadic(),
            ReferenceParam::integer("count"),
        ]);
        let err = validate_reference(&reference, &TypeDefinitions::new(), "list").unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidVariadic { .. }));
    }

    #[test]
    fn test_variadic_without_default() {
        let reference = ReferenceParam::array(vec![
            ReferenceParam::string("names").variadic().with_default(ParamValue::string("a")),
        ]);
        assert!(validate_reference(&reference, &TypeDefinitions::new(), "list").is_err());

        let root = ReferenceParam::string("names").variadic();
        assert!(validate_reference(&root, &TypeDefinitions::new(), "list").is_err());
    }

    #[test]
    fn test_alias_cycle() {
        let types = types_with(vec![
            TypeDefinition::new("A", vec![ReferenceParam::custom("B")]),
            TypeDefinition::new("B", vec![ReferenceParam::integer("n"), ReferenceParam::custom("A")]),
        ]);
        assert!(matches!(check_type_cycles(&types), Err(DefinitionError::CyclicType(_))));
    }

    #[test]
    fn test_recursion_through_array_allowed() {
        let types = types_with(vec![TypeDefinition::new(
            "Tree",
            vec![
                ReferenceParam::integer("leaf"),
                ReferenceParam::array(vec![ReferenceParam::custom("Tree").variadic()]),
            ],
        )]);
        assert!(check_type_cycles(&types).is_ok());
    }

    #[test]
    fn test_normalize_defaults() {
        let types = TypeDefinitions::new();
        let matcher = Matcher::new(&types);
        let mut reference = ReferenceParam::array(vec![
            ReferenceParam::float("scale").with_default(ParamValue::integer(1)),
        ]);
        normalize_defaults(&matcher, &mut reference).unwrap();

        let default = reference.children()[0].default_value().unwrap();
        assert_eq!(default.as_scalar(), Some(&Scalar::Float(1.0)));
        assert_eq!(default.name(), Some("scale"));
    }

    #[test]
    fn test_invalid_default() {
        let types = TypeDefinitions::new();
        let matcher = Matcher::new(&types);
        let mut reference = ReferenceParam::array(vec![
            ReferenceParam::integer("count").with_default(ParamValue::string("many")),
        ]);
        let err = normalize_defaults(&matcher, &mut reference).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidDefault { param, .. } if param == "count"));
    }
}
