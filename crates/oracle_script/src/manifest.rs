//! Command manifest parser - TOML to command declarations
//!
//! Declares custom types and commands in a TOML file instead of code.
//! Overloads are written in the signature syntax; actions are looked up by
//! name when the manifest is registered.
//!
//! # Manifest Format
//!
//! ```toml
//! [[types]]
//! name = "Point"
//! overloads = ["(int x, int y)", "const origin"]
//!
//! [[commands]]
//! name = "move"
//! action = "move_to"
//! modes = 3
//! overloads = ["Point to, float speed = 1"]
//!
//! [[commands]]
//! name = "set color"
//! overloads = ["int r, int g, int b", "string name"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use oracle_command::{
    CommandAction, CommandModes, CommandSet, CommandSetBuilder, DefinitionError, ReferenceParam, ScriptCommand,
    TypeDefinition,
};

use crate::signature::{parse_reference, parse_signature};
use crate::ScriptError;

/// Errors from manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid signature in {context}: {source}")]
    Signature {
        context: String,
        #[source]
        source: ScriptError,
    },

    #[error("No action '{action}' for command '{command}'")]
    MissingAction { command: String, action: String },

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Raw TOML structure for a custom type
#[derive(Debug, Deserialize)]
struct TypeToml {
    name: String,
    #[serde(default)]
    overloads: Vec<String>,
}

/// Raw TOML structure for a command
#[derive(Debug, Deserialize)]
struct CommandToml {
    name: String,
    action: Option<String>,
    modes: Option<u32>,
    #[serde(default)]
    overloads: Vec<String>,
}

/// Root TOML structure
#[derive(Debug, Deserialize)]
struct ManifestToml {
    #[serde(default)]
    types: Vec<TypeToml>,
    #[serde(default)]
    commands: Vec<CommandToml>,
}

/// A command declared in a manifest, waiting for its action
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDeclaration {
    pub name: String,
    /// Action name passed to the lookup; defaults to the command name
    pub action: String,
    pub modes: CommandModes,
    pub overloads: Vec<ReferenceParam>,
}

/// Parsed manifest contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandManifest {
    pub types: Vec<TypeDefinition>,
    pub commands: Vec<CommandDeclaration>,
}

impl CommandManifest {
    /// Add the manifest's types and commands to a builder.
    ///
    /// `lookup` maps action names to callbacks; an unknown name fails the
    /// whole registration before anything is added.
    pub fn register<C, F>(&self, builder: &mut CommandSetBuilder<C>, mut lookup: F) -> ManifestResult<()>
    where
        F: FnMut(&str) -> Option<CommandAction<C>>,
    {
        let mut commands = Vec::with_capacity(self.commands.len());
        for declaration in &self.commands {
            let action = lookup(&declaration.action).ok_or_else(|| ManifestError::MissingAction {
                command: declaration.name.clone(),
                action: declaration.action.clone(),
            })?;

            let command = declaration
                .overloads
                .iter()
                .cloned()
                .fold(ScriptCommand::with_action(&declaration.name, action), ScriptCommand::with_overload)
                .with_modes(declaration.modes);
            commands.push(command);
        }

        for definition in &self.types {
            builder.add_type(definition.clone());
        }
        for command in commands {
            builder.add_command(command);
        }
        Ok(())
    }

    /// Register into a fresh builder and validate the result
    pub fn build<C, F>(&self, lookup: F) -> ManifestResult<CommandSet<C>>
    where
        F: FnMut(&str) -> Option<CommandAction<C>>,
    {
        let mut builder = CommandSet::builder();
        self.register(&mut builder, lookup)?;
        Ok(builder.build()?)
    }
}

fn signature_error(context: String) -> impl FnOnce(ScriptError) -> ManifestError {
    move |source| ManifestError::Signature { context, source }
}

/// Parse a manifest from TOML string
pub fn parse_manifest(content: &str) -> ManifestResult<CommandManifest> {
    let raw: ManifestToml = toml::from_str(content)?;

    // Convert types; each overload is a single parameter declaration
    let types = raw
        .types
        .into_iter()
        .map(|t| {
            let overloads = t
                .overloads
                .iter()
                .map(|text| parse_reference(text).map_err(signature_error(format!("type '{}'", t.name))))
                .collect::<ManifestResult<Vec<_>>>()?;
            Ok(TypeDefinition::new(t.name, overloads))
        })
        .collect::<ManifestResult<Vec<_>>>()?;

    // Convert commands; each overload is a parameter list
    let commands = raw
        .commands
        .into_iter()
        .map(|c| {
            let overloads = c
                .overloads
                .iter()
                .map(|text| parse_signature(text).map_err(signature_error(format!("command '{}'", c.name))))
                .collect::<ManifestResult<Vec<_>>>()?;
            Ok(CommandDeclaration {
                action: c.action.unwrap_or_else(|| c.name.clone()),
                modes: c.modes.map(CommandModes::from_bits).unwrap_or_default(),
                name: c.name,
                overloads,
            })
        })
        .collect::<ManifestResult<Vec<_>>>()?;

    log::info!("Parsed command manifest: {} types, {} commands", types.len(), commands.len());
    Ok(CommandManifest { types, commands })
}

/// Load and parse a manifest from a file
pub fn load_manifest(path: impl AsRef<Path>) -> ManifestResult<CommandManifest> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use oracle_command::{Invocation, ParamValue};

    fn record() -> CommandAction<Vec<String>> {
        Arc::new(|log: &mut Vec<String>, params: &ParamValue| -> Result<(), String> {
            log.push(params.to_string());
            Ok(())
        })
    }

    fn noop() -> CommandAction<()> {
        Arc::new(|_: &mut (), _: &ParamValue| -> Result<(), String> { Ok(()) })
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = parse_manifest("").unwrap();
        assert!(manifest.types.is_empty());
        assert!(manifest.commands.is_empty());
    }

    #[test]
    fn test_parse_full_manifest() {
        let content = r#"
[[types]]
name = "Point"
overloads = ["(int x, int y)", "const origin"]

[[commands]]
name = "move"
action = "move_to"
modes = 3
overloads = ["Point to, float speed = 1"]

[[commands]]
name = "set color"
overloads = ["int r, int g, int b", "string name"]
"#;

        let manifest = parse_manifest(content).unwrap();

        assert_eq!(manifest.types.len(), 1);
        assert_eq!(manifest.types[0].name(), "Point");
        assert_eq!(manifest.types[0].overloads()[1], ReferenceParam::constant("origin"));

        let mv = &manifest.commands[0];
        assert_eq!(mv.action, "move_to");
        assert_eq!(mv.modes, CommandModes::from_bits(3));
        assert_eq!(mv.overloads[0].children()[0], ReferenceParam::custom("Point").named("to"));

        let set = &manifest.commands[1];
        assert_eq!(set.action, "set color");
        assert_eq!(set.modes, CommandModes::ALL);
        assert_eq!(set.overloads.len(), 2);
        assert_eq!(set.overloads[0].child_count(), 3);
    }

    #[test]
    fn test_signature_error_names_context() {
        let content = r#"
[[commands]]
name = "jump"
overloads = ["int height,"]
"#;
        let err = parse_manifest(content).unwrap_err();
        assert!(matches!(err, ManifestError::Signature { ref context, .. } if context == "command 'jump'"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(parse_manifest("[[commands]]\nname = 3"), Err(ManifestError::Parse(_))));
    }

    #[test]
    fn test_missing_action() {
        let manifest = parse_manifest("[[commands]]\nname = \"jump\"\naction = \"leap\"").unwrap();
        let result = manifest.build::<(), _>(|_| None);
        assert!(matches!(result, Err(ManifestError::MissingAction { ref action, .. }) if action == "leap"));
    }

    #[test]
    fn test_build_and_execute() {
        let content = r#"
[[types]]
name = "Point"
overloads = ["(int x, int y)"]

[[commands]]
name = "move"
overloads = ["Point to"]
"#;
        let manifest = parse_manifest(content).unwrap();
        let commands = manifest
            .build(|name| match name {
                "move" => Some(record()),
                _ => None,
            })
            .unwrap();

        let mut log = Vec::new();
        let call = Invocation::new(
            "move",
            vec![ParamValue::array(vec![ParamValue::integer(1), ParamValue::integer(2)])],
        );
        commands.execute(&mut log, &call, CommandModes::ALL).unwrap();
        assert_eq!(log, vec!["(to: (x: 1, y: 2))".to_string()]);
    }

    #[test]
    fn test_unknown_type_fails_build() {
        let manifest = parse_manifest("[[commands]]\nname = \"paint\"\noverloads = [\"Color c\"]").unwrap();
        let result = manifest.build(|_| Some(noop()));
        assert!(matches!(result, Err(ManifestError::Definition(DefinitionError::UnknownType { .. }))));
    }
}
