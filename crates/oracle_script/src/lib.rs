//! # Oracle Script
//!
//! Text front-ends for Oracle Engine commands:
//! - Invocation lines (`spawn octorok 3 at: (4, 5)`)
//! - Signature declarations (`string name, int count = 1, Item... items`)
//! - TOML command manifests
//!
//! ## Syntax Overview
//!
//! ```text
//! // One command per line
//! spawn octorok 3
//! move (4, 5) speed: 2.5
//! say "Hello, Link"
//! set color 255, 0, 0
//! ```
//!
//! Bare words are constants and select multi-word commands; `name: value`
//! passes a parameter by name; parentheses group an array.
//!
//! ## Example
//!
//! ```
//! use oracle_command::prelude::*;
//! use oracle_script::{execute_script, parse_signature};
//!
//! let mut builder = CommandSet::<Vec<String>>::builder();
//! builder.add_command(
//!     ScriptCommand::new("say", |log: &mut Vec<String>, params: &ParamValue| {
//!         log.push(params.to_string());
//!         Ok(())
//!     })
//!     .with_overload(parse_signature("string text, int times = 1").unwrap()),
//! );
//! let commands = builder.build().unwrap();
//!
//! let mut log = Vec::new();
//! execute_script(&commands, &mut log, "say \"hi\"\n", CommandModes::ALL).unwrap();
//! assert_eq!(log, vec!["(text: \"hi\", times: 1)".to_string()]);
//! ```

pub mod lexer;
pub mod manifest;
pub mod parser;
pub mod signature;

pub use lexer::{Lexer, Token, TokenKind};
pub use manifest::{load_manifest, parse_manifest, CommandDeclaration, CommandManifest, ManifestError, ManifestResult};
pub use parser::{parse_invocation, parse_script, parse_value, ParseError, Parser, ScriptLine, MAX_NESTING};
pub use signature::{parse_reference, parse_signature};

use oracle_command::{CommandError, CommandModes, CommandSet};
use thiserror::Error;

/// Script errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("Lexer error at {line}:{column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Line {line}: {source}")]
    Command {
        line: usize,
        #[source]
        source: CommandError,
    },
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Parse `source` and execute each line in order.
///
/// Stops at the first failing line. Returns the number of commands run.
pub fn execute_script<C>(
    commands: &CommandSet<C>,
    context: &mut C,
    source: &str,
    mode: CommandModes,
) -> ScriptResult<usize> {
    let lines = parse_script(source)?;
    for script_line in &lines {
        log::debug!("Executing line {}: {}", script_line.line, script_line.invocation);
        commands
            .execute(context, &script_line.invocation, mode)
            .map_err(|source| ScriptError::Command {
                line: script_line.line,
                source,
            })?;
    }
    Ok(lines.len())
}
