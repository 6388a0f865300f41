use std::io;
use thiserror::Error;

/// Fatal configuration errors raised while compiling a declarative tree
/// definition. The tree is validated once at startup and trusted afterwards,
/// so none of these can occur at dispatch time.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Missing help string for {key} in {parent}")]
    MissingHelp { key: String, parent: String },
    #[error("No argument definition registered for {0}")]
    UnknownArgType(String),
    #[error("Cannot find action handler {0}")]
    UnknownAction(String),
    #[error("Duplicate keyword {keyword} in {parent}")]
    DuplicateKeyword { keyword: String, parent: String },
    #[error("Argument reference {key} mixed into keyword list {parent}")]
    MisplacedArgument { key: String, parent: String },
    #[error("Empty command list in {0}")]
    EmptyList(String),
}

/// Recoverable, user-visible failures while dispatching one line. The read
/// loop prints these and re-prompts; no console state is corrupted.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),
    #[error("Ambiguous keyword: {0}")]
    AmbiguousKeyword(String),
    #[error("Missing keyword")]
    MissingKeyword,
    #[error("Missing <{0}> argument")]
    MissingArgument(String),
    #[error("Invalid {name} argument '{value}': {reason}")]
    InvalidArgument {
        name: String,
        value: String,
        reason: String,
    },
    #[error("Unexpected input: {0}")]
    UnexpectedInput(String),
    #[error("Shell command '{0}' not found")]
    ShellCommandNotFound(String),
    /// A failure raised by an action handler or the pipe worker.
    #[error("{0}")]
    Failed(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures constructing or driving the read loop itself, as opposed to
/// failures dispatching one line.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Detail for a failed argument validation. The optional canonical value
/// replaces the raw token in the user-facing message when the contract can
/// report something more specific than what was typed.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ArgumentError {
    message: String,
    value: Option<String>,
}

impl ArgumentError {
    pub fn new(message: impl Into<String>) -> Self {
        ArgumentError {
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(message: impl Into<String>, value: impl Into<String>) -> Self {
        ArgumentError {
            message: message.into(),
            value: Some(value.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
