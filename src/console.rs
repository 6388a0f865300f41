//! The console: compiles a tree definition, owns the line editor, and runs
//! the read-eval loop until an action requests termination or the user sends
//! end-of-file.
//!
//! Command errors are printed and the loop re-prompts; only editor failures
//! and definition errors escape [`Console::run`].

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Once;

use colored::Colorize;
use log::debug;
use rustyline::error::ReadlineError;

use crate::args::ArgDefs;
use crate::compile::{self, Actions, CliDef};
use crate::context::Context;
use crate::editor::LineEditor;
use crate::error::{CommandError, ConsoleError};
use crate::tree::{ActionNode, Node};

static SIGINT_GUARD: Once = Once::new();

pub struct ConsoleOptions {
    /// Prompt shown before every line.
    pub prompt: String,
    /// Banner printed once when the loop starts. Not repeated after Ctrl-C.
    pub intro: Option<String>,
    /// Where to persist line-editor history, if anywhere.
    pub history_file: Option<PathBuf>,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        ConsoleOptions {
            prompt: "> ".to_string(),
            intro: None,
            history_file: None,
        }
    }
}

pub struct Console<V> {
    root: Rc<Node<V>>,
    options: ConsoleOptions,
}

impl<V> Console<V> {
    /// Compile `def` and build a console around the resulting tree. A
    /// synthetic `help` keyword is added to the root so it shows up in
    /// completion and the root option listing.
    pub fn new(
        def: &CliDef,
        arg_defs: &ArgDefs<V>,
        actions: &Actions<V>,
        options: ConsoleOptions,
    ) -> Result<Self, ConsoleError> {
        let mut root = compile::compile(def, arg_defs, actions)?;
        if let Node::List(list) = &mut root {
            list.add_keyword(
                "help",
                Node::Action(ActionNode {
                    help: "Show the list of commands".to_string(),
                    handler: Rc::new(|ctx| {
                        ctx.request_help();
                        Ok(())
                    }),
                }),
            );
        }
        Ok(Console {
            root: Rc::new(root),
            options,
        })
    }

    /// Dispatch one line against the tree with an explicit context. Used by
    /// the read loop and by embedders that drive the console without a
    /// terminal.
    pub fn run_line(&self, ctx: &mut Context<V>, line: &str) -> Result<(), CommandError> {
        let line = rewrite_help(line.trim());
        self.root.execute(ctx, Some(&line))?;
        if ctx.help_requested() {
            self.root.execute(ctx, Some("?"))?;
        }
        Ok(())
    }

    /// Completion candidates for a partial line, relative to its last space.
    pub fn complete_line(&self, line: &str) -> Vec<String> {
        let mut ctx = Context::buffered();
        let query = line.strip_prefix("help ").unwrap_or(line);
        self.root.complete(&mut ctx, query)
    }

    /// Run the interactive loop until an action requests termination or the
    /// user sends end-of-file.
    pub fn run(&self) -> Result<(), ConsoleError> {
        // The console itself ignores SIGINT so that a Ctrl-C during a piped
        // command reaches only the child; during line editing rustyline
        // reports it as an Interrupted read instead.
        SIGINT_GUARD.call_once(|| {
            if let Err(err) = ctrlc::set_handler(|| {}) {
                debug!("could not install SIGINT handler: {}", err);
            }
        });

        let mut editor = LineEditor::new(Rc::clone(&self.root), self.options.history_file.clone())?;
        if let Some(intro) = &self.options.intro {
            println!("{}", intro);
        }
        loop {
            match editor.readline(&self.options.prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let mut ctx = Context::new();
                    if let Err(err) = self.run_line(&mut ctx, &line) {
                        println!("{} {}", "!!".red().bold(), err);
                    }
                    if ctx.should_end() {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// `help` and `help some command` are sugar for the `?` forms the tree
/// understands.
fn rewrite_help(line: &str) -> String {
    if line == "help" {
        return "?".to_string();
    }
    match line.strip_prefix("help ") {
        Some(rest) => format!("{} ?", rest.trim()),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_rewrites_to_question_mark_forms() {
        assert_eq!(rewrite_help("help"), "?");
        assert_eq!(rewrite_help("help show lights"), "show lights ?");
        assert_eq!(rewrite_help("show lights"), "show lights");
    }
}
