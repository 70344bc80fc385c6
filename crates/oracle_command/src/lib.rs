//! # Oracle Command
//!
//! Command signatures and parameter matching for Oracle Engine scripts.
//!
//! - [`ParamValue`]: a parsed argument tree (scalars, arrays, named values)
//! - [`ReferenceParam`]: the shape a command accepts, with defaults,
//!   variadic tails and custom types
//! - [`TypeDefinitions`]: named custom types with ordered overloads
//! - [`Matcher`]: binds an argument tree to a reference
//! - [`ScriptCommand`] / [`CommandSet`]: commands with overloads and actions
//!
//! ## Example
//!
//! ```
//! use oracle_command::prelude::*;
//!
//! let mut builder = CommandSet::<Vec<i64>>::builder();
//! builder.add_command(
//!     ScriptCommand::new("add", |total: &mut Vec<i64>, params: &ParamValue| {
//!         total.extend(params.children().iter().filter_map(ParamValue::as_int));
//!         Ok(())
//!     })
//!     .with_overload(ReferenceParam::array(vec![
//!         ReferenceParam::integer("x"),
//!         ReferenceParam::integer("y").with_default(ParamValue::integer(0)),
//!     ])),
//! );
//! let commands = builder.build().unwrap();
//!
//! let mut total = Vec::new();
//! let call = Invocation::new("add", vec![ParamValue::integer(3)]);
//! commands.execute(&mut total, &call, CommandModes::ALL).unwrap();
//! assert_eq!(total, vec![3, 0]);
//! ```

pub mod command;
pub mod error;
pub mod matcher;
pub mod reference;
pub mod registry;
pub mod types;
pub mod validation;
pub mod value;

pub mod prelude {
    pub use crate::command::{CommandAction, CommandModes, Invocation, ScriptCommand};
    pub use crate::error::{CommandError, DefinitionError, MatchError};
    pub use crate::matcher::{match_params, Matcher};
    pub use crate::reference::{ReferenceParam, ReferenceType};
    pub use crate::registry::{BoundCommand, CommandSet, CommandSetBuilder};
    pub use crate::types::{TypeDefinition, TypeDefinitions};
    pub use crate::value::{ParamKind, ParamType, ParamValue, Scalar};
}

pub use prelude::*;
pub use error::{CommandResult, DefinitionResult, MatchResult};
