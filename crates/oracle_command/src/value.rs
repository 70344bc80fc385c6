//! Parameter values
//!
//! A [`ParamValue`] is one node of a parsed argument tree: a typed scalar or
//! an ordered array of child values, optionally carrying a name.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::error::{MatchError, MatchResult};

/// Semantic type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    /// Bare identifier literal
    Const,
    /// Wildcard accepted by references, never produced by the parser
    Any,
    Array,
}

impl ParamType {
    /// Get type name
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Const => "const",
            Self::Any => "any",
            Self::Array => "array",
        }
    }

    /// Check if this is a scalar type
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array | Self::Any)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Const(String),
}

impl Scalar {
    /// Get the scalar's type
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::String(_) => ParamType::String,
            Self::Integer(_) => ParamType::Integer,
            Self::Float(_) => ParamType::Float,
            Self::Boolean(_) => ParamType::Boolean,
            Self::Const(_) => ParamType::Const,
        }
    }

    /// Raw textual form, suitable for [`Scalar::parse`]
    pub fn text(&self) -> String {
        match self {
            Self::String(s) | Self::Const(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => format!("{:?}", f),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Parse raw text as the given scalar type
    pub fn parse(ty: ParamType, text: &str) -> MatchResult<Self> {
        let format_error = || MatchError::FormatError { ty, text: text.to_string() };
        match ty {
            ParamType::String => Ok(Self::String(text.to_string())),
            ParamType::Const => Ok(Self::Const(text.to_string())),
            ParamType::Integer => text.trim().parse().map(Self::Integer).map_err(|_| format_error()),
            ParamType::Float => text.trim().parse().map(Self::Float).map_err(|_| format_error()),
            ParamType::Boolean => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Self::Boolean(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Self::Boolean(false))
                } else {
                    Err(format_error())
                }
            }
            ParamType::Any | ParamType::Array => Err(format_error()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{:?}", s),
            Self::Const(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            // Finite floats keep a '.' or exponent; inf and NaN have no literal form
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Node contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamKind {
    Scalar(Scalar),
    Array(Vec<ParamValue>),
}

/// A parsed or bound parameter
///
/// Cloning is always deep, so a bound tree never shares nodes with the
/// defaults it was filled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    kind: ParamKind,
}

impl ParamValue {
    /// Create an unnamed scalar
    pub fn scalar(value: Scalar) -> Self {
        Self { name: None, kind: ParamKind::Scalar(value) }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(Scalar::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::scalar(Scalar::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::scalar(Scalar::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::scalar(Scalar::Boolean(value))
    }

    pub fn constant(value: impl Into<String>) -> Self {
        Self::scalar(Scalar::Const(value.into()))
    }

    /// Create an unnamed array
    pub fn array(children: Vec<ParamValue>) -> Self {
        Self { name: None, kind: ParamKind::Array(children) }
    }

    /// Parse raw text into a scalar of the given type
    pub fn parse(ty: ParamType, text: &str) -> MatchResult<Self> {
        Scalar::parse(ty, text).map(Self::scalar)
    }

    /// Attach a name (builder style)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn renamed(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_string);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this node carries a non-empty name
    pub fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Get the node's type
    pub fn param_type(&self) -> ParamType {
        match &self.kind {
            ParamKind::Scalar(s) => s.param_type(),
            ParamKind::Array(_) => ParamType::Array,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ParamKind::Array(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            ParamKind::Scalar(s) => Some(s),
            ParamKind::Array(_) => None,
        }
    }

    /// Raw text of a scalar; `None` for arrays
    pub fn text(&self) -> Option<String> {
        self.as_scalar().map(Scalar::text)
    }

    /// Children of an array; empty for scalars
    pub fn children(&self) -> &[ParamValue] {
        match &self.kind {
            ParamKind::Array(children) => children,
            ParamKind::Scalar(_) => &[],
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child(&self, index: usize) -> Option<&ParamValue> {
        self.children().get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut ParamValue> {
        match &mut self.kind {
            ParamKind::Array(children) => children.get_mut(index),
            ParamKind::Scalar(_) => None,
        }
    }

    /// First immediate child with the given name (case-sensitive)
    pub fn named_param(&self, name: &str) -> Option<&ParamValue> {
        self.children().iter().find(|c| c.name() == Some(name))
    }

    /// Check if any immediate child is named
    pub fn has_named_params(&self) -> bool {
        self.children().iter().any(ParamValue::is_named)
    }

    /// Number of immediate children carrying a name
    pub fn named_child_count(&self) -> usize {
        self.children().iter().filter(|c| c.is_named()).count()
    }

    /// Whether this value may be bound to a parameter of type `ty`.
    ///
    /// Types must agree exactly, except that integers widen to floats and
    /// [`ParamType::Any`] accepts everything.
    pub fn is_valid_type(&self, ty: ParamType) -> bool {
        let own = self.param_type();
        ty == ParamType::Any || own == ty || (own == ParamType::Integer && ty == ParamType::Float)
    }

    /// Re-parse this scalar's value from text, keeping its declared type
    pub fn set_value_by_parse(&mut self, text: &str) -> MatchResult<()> {
        let ty = self.param_type();
        match &mut self.kind {
            ParamKind::Scalar(value) => {
                *value = Scalar::parse(ty, text)?;
                Ok(())
            }
            ParamKind::Array(_) => Err(MatchError::FormatError { ty, text: text.to_string() }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ParamKind::Scalar(Scalar::String(s) | Scalar::Const(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            ParamKind::Scalar(Scalar::Integer(n)) => Some(n),
            _ => None,
        }
    }

    /// Float value; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            ParamKind::Scalar(Scalar::Float(f)) => Some(f),
            ParamKind::Scalar(Scalar::Integer(n)) => Some(n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ParamKind::Scalar(Scalar::Boolean(b)) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            write!(f, "{}: ", name)?;
        }
        match &self.kind {
            ParamKind::Scalar(s) => write!(f, "{}", s),
            ParamKind::Array(children) => {
                let items: Vec<String> = children.iter().map(ToString::to_string).collect();
                write!(f, "({})", items.join(", "))
            }
        }
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::scalar(value)
    }
}
