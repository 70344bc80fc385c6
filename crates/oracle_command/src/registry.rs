//! Command sets
//!
//! A [`CommandSet`] owns the custom types and commands of a scripting
//! language. It is assembled once through [`CommandSetBuilder`], which
//! validates the whole configuration, and is read-only afterwards.

use std::collections::HashSet;
use std::fmt;

use crate::command::{CommandModes, Invocation, ScriptCommand};
use crate::error::{CommandError, CommandResult, DefinitionError, DefinitionResult};
use crate::matcher::Matcher;
use crate::reference::ReferenceParam;
use crate::types::{TypeDefinition, TypeDefinitions};
use crate::validation::{check_type_cycles, normalize_defaults, validate_reference};
use crate::value::ParamValue;

/// Collects types and commands before validation
pub struct CommandSetBuilder<C> {
    types: Vec<TypeDefinition>,
    commands: Vec<ScriptCommand<C>>,
}

impl<C> CommandSetBuilder<C> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Register a custom type
    pub fn define_type(&mut self, name: &str, overloads: Vec<ReferenceParam>) -> &mut Self {
        self.types.push(TypeDefinition::new(name, overloads));
        self
    }

    pub fn add_type(&mut self, definition: TypeDefinition) -> &mut Self {
        self.types.push(definition);
        self
    }

    /// Register a command. Earlier commands win when several match.
    pub fn add_command(&mut self, command: ScriptCommand<C>) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Validate everything and freeze the set
    pub fn build(self) -> DefinitionResult<CommandSet<C>> {
        let mut types = TypeDefinitions::new();
        for definition in self.types {
            types.define(definition)?;
        }

        for definition in types.iter() {
            if definition.overloads().is_empty() {
                return Err(DefinitionError::EmptyType(definition.name().to_string()));
            }
            let context = format!("type '{}'", definition.name());
            for overload in definition.overloads() {
                validate_reference(overload, &types, &context)?;
            }
        }
        check_type_cycles(&types)?;

        let mut seen = HashSet::new();
        for command in &self.commands {
            if command.names().is_empty() {
                return Err(DefinitionError::EmptyCommandName);
            }
            let name = command.full_name();
            let context = format!("command '{}'", name);
            for overload in command.overloads() {
                validate_reference(overload, &types, &context)?;
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                log::warn!("Command '{}' registered more than once; earlier entries match first", name);
            }
        }

        // A type default can reach other types, so passes repeat until no
        // default changes. Each pass reads a snapshot of the previous one.
        for pass in 0..=types.len() {
            let snapshot = types.clone();
            let matcher = Matcher::new(&snapshot);
            for definition in types.iter_mut() {
                for overload in definition.overloads_mut() {
                    normalize_defaults(&matcher, overload)?;
                }
            }
            if types == snapshot {
                break;
            }
            if pass == types.len() {
                log::warn!("Type defaults still changing after {} passes", pass + 1);
            }
        }

        let snapshot = types.clone();
        let matcher = Matcher::new(&snapshot);
        let mut commands = self.commands;
        for command in &mut commands {
            for overload in command.overloads_mut() {
                normalize_defaults(&matcher, overload)?;
            }
        }

        log::info!("Built command set with {} types and {} commands", types.len(), commands.len());
        Ok(CommandSet { types, commands })
    }
}

impl<C> Default for CommandSetBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A command resolved against an invocation
pub struct BoundCommand<'a, C> {
    pub command: &'a ScriptCommand<C>,
    pub params: ParamValue,
}

impl<C> fmt::Debug for BoundCommand<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCommand")
            .field("command", &self.command.full_name())
            .field("params", &self.params)
            .finish()
    }
}

/// Validated, immutable set of types and commands
pub struct CommandSet<C> {
    types: TypeDefinitions,
    commands: Vec<ScriptCommand<C>>,
}

impl<C> CommandSet<C> {
    /// Start building a command set
    pub fn builder() -> CommandSetBuilder<C> {
        CommandSetBuilder::new()
    }

    pub fn types(&self) -> &TypeDefinitions {
        &self.types
    }

    pub fn commands(&self) -> &[ScriptCommand<C>] {
        &self.commands
    }

    /// Find a command by its full name, ignoring case
    pub fn find(&self, name: &str) -> Option<&ScriptCommand<C>> {
        let words: Vec<&str> = name.split_whitespace().collect();
        self.commands.iter().find(|command| {
            command.names().len() == words.len()
                && command
                    .names()
                    .iter()
                    .zip(&words)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b))
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Find the first command that accepts `invocation` in `mode`
    pub fn resolve(&self, invocation: &Invocation, mode: CommandModes) -> CommandResult<BoundCommand<'_, C>> {
        let mut name_matched = false;
        let mut mode_matched = false;

        for command in &self.commands {
            if !command.matches_name(&invocation.keyword, &invocation.params) {
                continue;
            }
            name_matched = true;
            if !command.modes().intersects(mode) {
                log::debug!("'{}' skipped in mode {:#x}", command.full_name(), mode.bits());
                continue;
            }
            mode_matched = true;

            match command.try_bind(&self.types, &invocation.params) {
                Ok(params) => return Ok(BoundCommand { command, params }),
                Err(err) => log::debug!("'{}' rejected '{}': {}", command.full_name(), invocation, err),
            }
        }

        Err(if !name_matched {
            CommandError::UnknownCommand(invocation.keyword.clone())
        } else if !mode_matched {
            CommandError::ModeNotAllowed {
                command: invocation.keyword.clone(),
                mode: mode.bits(),
            }
        } else {
            CommandError::NoMatchingOverload(invocation.keyword.clone())
        })
    }

    /// Resolve `invocation` and run its action
    pub fn execute(&self, context: &mut C, invocation: &Invocation, mode: CommandModes) -> CommandResult<()> {
        let bound = self.resolve(invocation, mode)?;
        bound
            .command
            .invoke(context, &bound.params)
            .map_err(|message| CommandError::Action {
                command: bound.command.full_name(),
                message,
            })
    }
}

impl<C> fmt::Debug for CommandSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSet")
            .field("types", &self.types.len())
            .field("commands", &self.commands)
            .finish()
    }
}
