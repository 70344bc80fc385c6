//! Script commands
//!
//! A [`ScriptCommand`] binds a (possibly multi-word) name and a list of
//! overloads to an action. Invocations carry the first word as their
//! keyword; any further name words are leading `Const` parameters.

use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;
use serde::{Serialize, Deserialize};

use crate::error::{MatchError, MatchResult};
use crate::matcher::Matcher;
use crate::reference::ReferenceParam;
use crate::types::TypeDefinitions;
use crate::value::{ParamType, ParamValue};

/// Execution contexts a command is legal in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandModes(u32);

impl CommandModes {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Create from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// A set holding the single mode `index`; empty when `index >= 32`
    pub const fn mode(index: u32) -> Self {
        match 1u32.checked_shl(index) {
            Some(bits) => Self(bits),
            None => Self::NONE,
        }
    }

    /// Get the raw bits
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check if every mode in `other` is in this set
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if the sets share a mode
    pub fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for CommandModes {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for CommandModes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A parsed command call: the keyword plus its parameter array
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub keyword: String,
    pub params: ParamValue,
}

impl Invocation {
    pub fn new(keyword: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            keyword: keyword.into(),
            params: ParamValue::array(params),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword)?;
        for param in self.params.children() {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

/// Command callback
pub type CommandAction<C> = Arc<dyn Fn(&mut C, &ParamValue) -> Result<(), String> + Send + Sync>;

/// A registered script command
pub struct ScriptCommand<C> {
    names: Vec<String>,
    overloads: Vec<ReferenceParam>,
    modes: CommandModes,
    action: CommandAction<C>,
}

impl<C> ScriptCommand<C> {
    /// Create a command. `name` is split on whitespace into its words.
    pub fn new<F>(name: &str, action: F) -> Self
    where
        F: Fn(&mut C, &ParamValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::with_action(name, Arc::new(action))
    }

    /// Create a command from a shared action
    pub fn with_action(name: &str, action: CommandAction<C>) -> Self {
        Self {
            names: name.split_whitespace().map(str::to_string).collect(),
            overloads: Vec::new(),
            modes: CommandModes::ALL,
            action,
        }
    }

    /// Add an accepted parameter shape (an array reference)
    pub fn with_overload(mut self, overload: ReferenceParam) -> Self {
        self.overloads.push(overload);
        self
    }

    pub fn with_modes(mut self, modes: CommandModes) -> Self {
        self.modes = modes;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All name words joined by spaces
    pub fn full_name(&self) -> String {
        self.names.join(" ")
    }

    pub fn overloads(&self) -> &[ReferenceParam] {
        &self.overloads
    }

    pub(crate) fn overloads_mut(&mut self) -> &mut [ReferenceParam] {
        &mut self.overloads
    }

    pub fn modes(&self) -> CommandModes {
        self.modes
    }

    /// Check the name words against an invocation, ignoring case.
    ///
    /// The first word must equal the keyword, the rest must equal the
    /// leading unnamed `Const` parameters.
    pub fn matches_name(&self, keyword: &str, params: &ParamValue) -> bool {
        let Some((first, rest)) = self.names.split_first() else {
            return false;
        };
        if !first.eq_ignore_ascii_case(keyword) {
            return false;
        }

        let children = params.children();
        if children.len() < rest.len() {
            return false;
        }
        rest.iter().zip(children).all(|(word, param)| {
            !param.is_named()
                && param.param_type() == ParamType::Const
                && param.as_str().is_some_and(|text| text.eq_ignore_ascii_case(word))
        })
    }

    /// Bind `params` to the first overload that accepts them.
    ///
    /// Trailing name words are skipped on a copy; `params` itself is never
    /// modified. A command without overloads accepts any parameters.
    pub fn try_bind(&self, types: &TypeDefinitions, params: &ParamValue) -> MatchResult<ParamValue> {
        let skip = self.names.len().saturating_sub(1);
        let params: Cow<'_, ParamValue> = if skip == 0 {
            Cow::Borrowed(params)
        } else {
            let children = params.children().get(skip..).unwrap_or_default();
            Cow::Owned(ParamValue::array(children.to_vec()))
        };

        let matcher = Matcher::new(types);
        if self.overloads.is_empty() {
            return matcher.match_param(None, &params);
        }

        for (index, overload) in self.overloads.iter().enumerate() {
            match matcher.match_param(Some(overload), &params) {
                Ok(bound) => return Ok(bound),
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => {
                    log::debug!(
                        "'{}' overload {} {} rejected {}: {}",
                        self.full_name(),
                        index,
                        overload,
                        params,
                        err
                    );
                }
            }
        }

        Err(MatchError::NoMatchingOverload(self.full_name()))
    }

    /// Run the action with bound parameters
    pub fn invoke(&self, context: &mut C, params: &ParamValue) -> Result<(), String> {
        (self.action)(context, params)
    }
}

impl<C> Clone for ScriptCommand<C> {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            overloads: self.overloads.clone(),
            modes: self.modes,
            action: Arc::clone(&self.action),
        }
    }
}

impl<C> fmt::Debug for ScriptCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCommand")
            .field("names", &self.names)
            .field("overloads", &self.overloads.len())
            .field("modes", &self.modes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut (), _: &ParamValue) -> Result<(), String> {
        Ok(())
    }

    fn set_color() -> ScriptCommand<()> {
        ScriptCommand::new("set color", noop).with_overload(ReferenceParam::array(vec![
            ReferenceParam::integer("r"),
            ReferenceParam::integer("g"),
            ReferenceParam::integer("b"),
        ]))
    }

    #[test]
    fn test_modes() {
        let modes = CommandModes::mode(0) | CommandModes::mode(2);
        assert_eq!(modes.bits(), 0b101);
        assert!(modes.contains(CommandModes::mode(2)));
        assert!(!modes.contains(CommandModes::mode(1)));
        assert!(modes.intersects(CommandModes::from_bits(0b110)));
        assert!(CommandModes::default().contains(modes));
        assert!(!CommandModes::NONE.intersects(modes));
    }

    #[test]
    fn test_mode_index_bounds() {
        assert_eq!(CommandModes::mode(31).bits(), 1 << 31);
        assert_eq!(CommandModes::mode(32), CommandModes::NONE);
        assert_eq!(CommandModes::mode(40), CommandModes::NONE);
    }

    #[test]
    fn test_matches_multi_word_name() {
        let command = set_color();
        let params = ParamValue::array(vec![
            ParamValue::constant("COLOR"),
            ParamValue::integer(1),
        ]);
        assert!(command.matches_name("Set", &params));
        assert!(!command.matches_name("get", &params));

        let wrong_word = ParamValue::array(vec![ParamValue::constant("size")]);
        assert!(!command.matches_name("set", &wrong_word));

        let quoted = ParamValue::array(vec![ParamValue::string("color")]);
        assert!(!command.matches_name("set", &quoted));

        assert!(!command.matches_name("set", &ParamValue::array(Vec::new())));
    }

    #[test]
    fn test_name_words_fold_ascii_only() {
        let command: ScriptCommand<()> = ScriptCommand::new("set été", noop);
        let folded = ParamValue::array(vec![ParamValue::constant("ÉTÉ")]);
        assert!(!command.matches_name("SET", &folded));
        let exact = ParamValue::array(vec![ParamValue::constant("été")]);
        assert!(command.matches_name("SET", &exact));
    }

    #[test]
    fn test_try_bind_strips_name_words() {
        let command = set_color();
        let params = ParamValue::array(vec![
            ParamValue::constant("color"),
            ParamValue::integer(1),
            ParamValue::integer(2),
            ParamValue::integer(3),
        ]);
        let bound = command.try_bind(&TypeDefinitions::new(), &params).unwrap();
        assert_eq!(bound.child_count(), 3);
        assert_eq!(bound.named_param("g").and_then(ParamValue::as_int), Some(2));
        assert_eq!(params.child_count(), 4);
    }

    #[test]
    fn test_try_bind_failure_leaves_input_untouched() {
        let command = set_color();
        let params = ParamValue::array(vec![ParamValue::constant("color"), ParamValue::integer(1)]);
        let before = params.clone();
        let err = command.try_bind(&TypeDefinitions::new(), &params).unwrap_err();
        assert_eq!(err, MatchError::NoMatchingOverload("set color".into()));
        assert_eq!(params, before);
    }

    #[test]
    fn test_zero_overloads_accept_anything() {
        let command: ScriptCommand<()> = ScriptCommand::new("log", noop);
        let params = ParamValue::array(vec![ParamValue::string("x"), ParamValue::integer(1).with_name("n")]);
        assert_eq!(command.try_bind(&TypeDefinitions::new(), &params).unwrap(), params);
    }

    #[test]
    fn test_overloads_tried_in_order() {
        let command: ScriptCommand<()> = ScriptCommand::new("play", noop)
            .with_overload(ReferenceParam::array(vec![ReferenceParam::integer("id")]))
            .with_overload(ReferenceParam::array(vec![ReferenceParam::any("anything")]));

        let params = ParamValue::array(vec![ParamValue::integer(4)]);
        let bound = command.try_bind(&TypeDefinitions::new(), &params).unwrap();
        assert_eq!(bound.child(0).and_then(ParamValue::name), Some("id"));

        let params = ParamValue::array(vec![ParamValue::string("song")]);
        let bound = command.try_bind(&TypeDefinitions::new(), &params).unwrap();
        assert_eq!(bound.child(0).and_then(ParamValue::name), Some("anything"));
    }

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new(
            "spawn",
            vec![ParamValue::constant("octorok"), ParamValue::integer(3).with_name("count")],
        );
        assert_eq!(invocation.to_string(), "spawn octorok count: 3");
    }
}
