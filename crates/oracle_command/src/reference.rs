//! Reference parameters
//!
//! A [`ReferenceParam`] describes the shape a command accepts. References are
//! built once at startup and never mutated after the owning command set is
//! built, so they can be shared freely between concurrent match attempts.

use std::fmt;

use crate::value::{ParamType, ParamValue};

/// What a reference expects
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// A built-in type (scalar, `Any` or `Array`)
    Param(ParamType),
    /// A named type resolved through the type definitions
    Custom(String),
}

/// Expected parameter shape
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceParam {
    ty: ReferenceType,
    name: Option<String>,
    default: Option<ParamValue>,
    variadic: bool,
    children: Vec<ReferenceParam>,
}

impl ReferenceParam {
    /// Create an unnamed reference of a built-in type
    pub fn of(ty: ParamType) -> Self {
        Self {
            ty: ReferenceType::Param(ty),
            name: None,
            default: None,
            variadic: false,
            children: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::of(ParamType::String).named(name)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::of(ParamType::Integer).named(name)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::of(ParamType::Float).named(name)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::of(ParamType::Boolean).named(name)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::of(ParamType::Any).named(name)
    }

    /// A literal keyword; the name doubles as the expected text
    pub fn constant(literal: impl Into<String>) -> Self {
        Self::of(ParamType::Const).named(literal)
    }

    /// Create an unnamed array of child references
    pub fn array(children: Vec<ReferenceParam>) -> Self {
        Self {
            children,
            ..Self::of(ParamType::Array)
        }
    }

    /// Create an unnamed reference to a custom type
    pub fn custom(type_name: impl Into<String>) -> Self {
        Self {
            ty: ReferenceType::Custom(type_name.into()),
            ..Self::of(ParamType::Any)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Make this parameter optional
    pub fn with_default(mut self, default: ParamValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark as a variadic tail
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Append a child reference
    pub fn with_child(mut self, child: ReferenceParam) -> Self {
        self.children.push(child);
        self
    }

    pub fn reference_type(&self) -> &ReferenceType {
        &self.ty
    }

    /// Built-in type, or `None` for custom types
    pub fn param_type(&self) -> Option<ParamType> {
        match &self.ty {
            ReferenceType::Param(ty) => Some(*ty),
            ReferenceType::Custom(_) => None,
        }
    }

    pub fn has_custom_type(&self) -> bool {
        matches!(self.ty, ReferenceType::Custom(_))
    }

    pub fn custom_type_name(&self) -> Option<&str> {
        match &self.ty {
            ReferenceType::Custom(name) => Some(name),
            ReferenceType::Param(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.ty == ReferenceType::Param(ParamType::Array)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default.as_ref()
    }

    /// Whether the parameter declares a default
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Child references; empty unless this is an array
    pub fn children(&self) -> &[ReferenceParam] {
        if self.is_array() {
            &self.children
        } else {
            &[]
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ReferenceParam] {
        &mut self.children
    }

    pub(crate) fn set_default(&mut self, default: ParamValue) {
        self.default = Some(default);
    }
}

/// Formats in the signature syntax, e.g. `(int x, int y = 0) point`
impl fmt::Display for ReferenceParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            ReferenceType::Custom(name) => f.write_str(name)?,
            ReferenceType::Param(ParamType::Array) => {
                let items: Vec<String> = self.children.iter().map(ToString::to_string).collect();
                write!(f, "({})", items.join(", "))?;
            }
            ReferenceType::Param(ty) => f.write_str(keyword(*ty))?,
        }
        if self.variadic {
            f.write_str("...")?;
        }
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", DefaultDisplay(default))?;
        }
        Ok(())
    }
}

fn keyword(ty: ParamType) -> &'static str {
    match ty {
        ParamType::String => "string",
        ParamType::Integer => "int",
        ParamType::Float => "float",
        ParamType::Boolean => "bool",
        ParamType::Const => "const",
        ParamType::Any => "var",
        ParamType::Array => "array",
    }
}

/// Default values print without the slot name they get bound under
struct DefaultDisplay<'a>(&'a ParamValue);

impl fmt::Display for DefaultDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_scalar() {
            Some(scalar) => write!(f, "{}", scalar),
            None => {
                let items: Vec<String> = self.0.children().iter().map(ToString::to_string).collect();
                write!(f, "({})", items.join(", "))
            }
        }
    }
}
