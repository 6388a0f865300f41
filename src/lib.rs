//! cmdtree: an engine for interactive, hierarchical command-line consoles.
//!
//! A consumer describes its command language as a nested [`CliDef`] tree of
//! `keyword:help` entries, registers the argument types the tree references
//! as [`ArgumentDef`] contracts, and binds action names to typed handlers.
//! [`Console::new`] compiles that into an executable command tree;
//! [`Console::run`] drives the read-eval loop with tab completion,
//! hierarchical `?`/`help` output, and `|` piping of command output into
//! external shell commands.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use cmdtree::{Actions, ArgDefs, CliDef, Console, ConsoleOptions};
//!
//! let def = CliDef::map([
//!     ("status:Show system status", CliDef::action("status")),
//!     ("exit:Leave the console", CliDef::action("exit")),
//! ]);
//!
//! let mut actions: Actions<()> = Actions::default();
//! actions.insert("status".into(), Rc::new(|ctx| {
//!     writeln!(ctx.out(), "all good")?;
//!     Ok(())
//! }));
//! actions.insert("exit".into(), Rc::new(|ctx| {
//!     ctx.request_end();
//!     Ok(())
//! }));
//!
//! let arg_defs: ArgDefs<()> = ArgDefs::default();
//! let console = Console::new(&def, &arg_defs, &actions, ConsoleOptions::default())?;
//! console.run()?;
//! # use std::io::Write;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Crate structure
//!
//! - [`compile`]: declarative definition and the tree compiler
//! - [`tree`]: the compiled tree and the execute/complete walks
//! - [`args`]: the argument contract and token-splitting helpers
//! - [`context`]: per-line execution state handed to handlers
//! - [`console`]: the read-eval loop
//! - [`error`]: the error tiers (definition, command, console)

pub mod args;
pub mod compile;
pub mod console;
pub mod context;
pub mod error;
pub mod tree;

mod editor;
mod output;
mod pipe;

pub use args::{ArgDefs, ArgumentDef, HelpOptions, quote, split_quoted, split_space, unquote};
pub use compile::{ABSENT, Actions, CliDef, compile};
pub use console::{Console, ConsoleOptions};
pub use context::{ArgValue, Context};
pub use error::{ArgumentError, CommandError, ConsoleError, DefinitionError};
pub use pipe::SHELL_CMD;
pub use tree::{ActionFn, Node};
