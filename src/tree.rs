//! The compiled command tree and the two symmetric tree walks over it:
//! `execute` (dispatch one line) and `complete` (suggest continuations for a
//! partial line).
//!
//! A tree is built once by the definition compiler and immutable afterwards,
//! with one exception: the console inserts the synthetic `help` keyword into
//! the root list at construction time. Nodes form a strict hierarchy; the
//! only mutable state during a walk lives in the [`Context`].

use std::io::Write;
use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::args::{ArgumentDef, HelpOptions};
use crate::context::{ArgValue, Context};
use crate::error::CommandError;
use crate::output;
use crate::pipe;

/// A bound action handler. Runs with the fully populated context and owns
/// all further output and domain side effects.
pub type ActionFn<V> = Rc<dyn Fn(&mut Context<V>) -> Result<(), CommandError>>;

/// One node of the compiled command tree.
pub enum Node<V> {
    /// Keyword branching point.
    List(ListNode<V>),
    /// Consume one validated variable token, then continue into the child.
    Argument(ArgumentNode<V>),
    /// Terminal handler invocation point.
    Action(ActionNode<V>),
    /// Output-redirecting terminal wrapper: consumes the whole remaining
    /// line as one opaque shell command and pipes the inner subtree's
    /// captured output into it.
    Pipe(PipeNode<V>),
}

pub struct ListNode<V> {
    pub(crate) help: String,
    pub(crate) elems: FxHashMap<String, Rc<Node<V>>>,
    /// Child taken when no keyword is typed at this position.
    pub(crate) absent: Option<Rc<Node<V>>>,
}

pub struct ArgumentNode<V> {
    pub(crate) help: String,
    pub(crate) def: Rc<dyn ArgumentDef<V>>,
    pub(crate) child: Rc<Node<V>>,
}

pub struct ActionNode<V> {
    pub(crate) help: String,
    pub(crate) handler: ActionFn<V>,
}

pub struct PipeNode<V> {
    pub(crate) help: String,
    pub(crate) inner: Rc<Node<V>>,
}

impl<V> Node<V> {
    pub fn help(&self) -> &str {
        match self {
            Node::List(n) => &n.help,
            Node::Argument(n) => &n.help,
            Node::Action(n) => &n.help,
            Node::Pipe(n) => &n.help,
        }
    }

    /// Dispatch `line` against this node, consuming tokens left to right.
    /// `None` means nothing remains of the line.
    pub fn execute(&self, ctx: &mut Context<V>, line: Option<&str>) -> Result<(), CommandError> {
        match self {
            Node::List(n) => n.execute(ctx, line),
            Node::Argument(n) => n.execute(ctx, line),
            Node::Action(n) => n.execute(ctx, line),
            Node::Pipe(n) => n.execute(ctx, line),
        }
    }

    /// Produce completions for a partial line. Mirrors `execute` but never
    /// mutates domain state and never reports errors: a malformed earlier
    /// token simply leaves its binding out and completion continues, since
    /// later arguments may still be completable independently.
    pub fn complete(&self, ctx: &mut Context<V>, line: &str) -> Vec<String> {
        match self {
            Node::List(n) => n.complete(ctx, line),
            Node::Argument(n) => n.complete(ctx, line),
            // Terminals have nothing left to complete.
            Node::Action(_) | Node::Pipe(_) => Vec::new(),
        }
    }
}

/// Split the next keyword off a line. An empty candidate is normalized to
/// the absence sentinel; the remainder loses its leading spaces.
fn split_keyword(line: &str) -> (Option<&str>, Option<&str>) {
    match line.split_once(' ') {
        Some((kw, rest)) => (non_empty(kw), Some(rest.trim_start())),
        None => (non_empty(line), None),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

impl<V> ListNode<V> {
    pub(crate) fn add_keyword(&mut self, keyword: &str, node: Node<V>) {
        self.elems.insert(keyword.to_string(), Rc::new(node));
    }

    /// Keywords starting with `text`, sorted for deterministic dispatch
    /// messages and completion order.
    fn prefix_matches(&self, text: &str) -> Vec<&str> {
        let mut matches: Vec<&str> = self
            .elems
            .keys()
            .filter(|k| k.starts_with(text))
            .map(String::as_str)
            .collect();
        matches.sort_unstable();
        matches
    }

    fn execute(&self, ctx: &mut Context<V>, line: Option<&str>) -> Result<(), CommandError> {
        let (kw, remainder) = match line {
            Some(l) => split_keyword(l),
            None => (None, None),
        };

        if kw == Some("?") {
            return self.render_help(ctx);
        }

        let Some(kw) = kw else {
            return match &self.absent {
                Some(child) => child.execute(ctx, remainder),
                None => Err(CommandError::MissingKeyword),
            };
        };

        if let Some(child) = self.elems.get(kw) {
            ctx.push_keyword(kw);
            return child.execute(ctx, remainder);
        }

        let matches = self.prefix_matches(kw);
        match matches.as_slice() {
            [] => Err(CommandError::UnknownKeyword(kw.to_string())),
            [full] => {
                ctx.push_keyword(full);
                match self.elems.get(*full) {
                    Some(child) => child.execute(ctx, remainder),
                    None => Err(CommandError::UnknownKeyword(kw.to_string())),
                }
            }
            _ => Err(CommandError::AmbiguousKeyword(kw.to_string())),
        }
    }

    fn complete(&self, ctx: &mut Context<V>, line: &str) -> Vec<String> {
        let (kw, remainder) = split_keyword(line);
        let typed = kw.unwrap_or("");

        if let Some(rest) = remainder {
            // A later token is being completed; only recurse through a
            // unique prefix match.
            let matches = self.prefix_matches(typed);
            if let [full] = matches.as_slice() {
                let full = full.to_string();
                ctx.push_keyword(&full);
                if let Some(child) = self.elems.get(&full) {
                    return child.complete(ctx, rest);
                }
            }
            return Vec::new();
        }

        let mut results: Vec<String> = self
            .prefix_matches(typed)
            .into_iter()
            .map(|k| format!("{} ", k))
            .collect();
        // An empty completion marks "stop here, the line is already
        // complete" when this position may be left empty.
        if typed.is_empty() && self.absent.is_some() {
            results.push(String::new());
        }
        results
    }

    fn render_help(&self, ctx: &mut Context<V>) -> Result<(), CommandError> {
        let mut width = self.elems.keys().map(String::len).max().unwrap_or(0);
        if self.absent.is_some() {
            width = width.max("<br>".len());
        }

        writeln!(ctx.out(), "{}", self.help)?;
        writeln!(ctx.out(), "\nOptions:")?;
        if let Some(child) = &self.absent {
            writeln!(
                ctx.out(),
                "  {:<width$} - {}",
                "<br>",
                child.help(),
                width = width
            )?;
        }
        let mut entries: Vec<(&str, &Rc<Node<V>>)> = self
            .elems
            .iter()
            .map(|(k, node)| (k.as_str(), node))
            .collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        for (keyword, child) in entries {
            writeln!(
                ctx.out(),
                "  {:<width$} - {}",
                keyword,
                child.help(),
                width = width
            )?;
        }
        Ok(())
    }
}

impl<V> ArgumentNode<V> {
    fn execute(&self, ctx: &mut Context<V>, line: Option<&str>) -> Result<(), CommandError> {
        let line = match line {
            Some(l) if !l.is_empty() => l,
            _ => return Err(CommandError::MissingArgument(self.def.name().to_string())),
        };

        if line.trim() == "?" {
            return self.render_help(ctx);
        }

        let (token, remainder) = self.def.split(ctx, line);
        match self.def.validate(ctx, token) {
            Ok(value) => {
                let name = self.def.ctx_name().to_string();
                ctx.bind(name, value);
            }
            Err(err) => {
                return Err(CommandError::InvalidArgument {
                    name: self.def.name().to_string(),
                    value: err.value().unwrap_or(token).to_string(),
                    reason: err.message().to_string(),
                });
            }
        }
        self.child.execute(ctx, remainder)
    }

    fn complete(&self, ctx: &mut Context<V>, line: &str) -> Vec<String> {
        let (token, remainder) = self.def.split(ctx, line);
        if let Some(rest) = remainder {
            // Best effort: bind the token in case a later argument depends
            // on it, but never surface a validation failure from here.
            match self.def.validate(ctx, token) {
                Ok(value) => {
                    let name = self.def.ctx_name().to_string();
                    ctx.bind(name, value);
                }
                Err(err) => {
                    debug!(
                        "ignoring {} validation failure during completion: {}",
                        self.def.name(),
                        err
                    );
                }
            }
            return self.child.complete(ctx, rest);
        }

        // Candidates are rewritten to the text after the last space already
        // typed, so the line editor can splice them in directly.
        let candidates = self.def.complete(ctx, line);
        match line.rfind(' ') {
            Some(idx) => candidates
                .iter()
                .map(|c| format!("{} ", c.get(idx + 1..).unwrap_or("")))
                .collect(),
            None => candidates.into_iter().map(|c| format!("{} ", c)).collect(),
        }
    }

    fn render_help(&self, ctx: &mut Context<V>) -> Result<(), CommandError> {
        writeln!(
            ctx.out(),
            "<{}> - {}",
            self.def.name(),
            self.child.help()
        )?;
        match self.def.help_options(ctx) {
            HelpOptions::Plain(values) if !values.is_empty() => {
                writeln!(ctx.out(), "\nOptions:")?;
                output::columnize(ctx.out(), &values)?;
            }
            HelpOptions::Described(pairs) if !pairs.is_empty() => {
                writeln!(ctx.out(), "\nOptions:")?;
                let width = pairs.iter().map(|(v, _)| v.len()).max().unwrap_or(0);
                for (value, help) in &pairs {
                    writeln!(ctx.out(), "  {:<width$} - {}", value, help, width = width)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl<V> ActionNode<V> {
    fn execute(&self, ctx: &mut Context<V>, line: Option<&str>) -> Result<(), CommandError> {
        match line {
            Some(l) if l.trim() == "?" => {
                writeln!(ctx.out(), "{}", self.help)?;
                Ok(())
            }
            Some(l) if !l.is_empty() => Err(CommandError::UnexpectedInput(l.to_string())),
            _ => (self.handler)(ctx),
        }
    }
}

impl<V> PipeNode<V> {
    fn execute(&self, ctx: &mut Context<V>, line: Option<&str>) -> Result<(), CommandError> {
        let line = match line {
            Some(l) if !l.is_empty() => l,
            _ => return Err(CommandError::MissingArgument(pipe::SHELL_CMD.to_string())),
        };

        if line.trim() == "?" {
            writeln!(ctx.out(), "<{}> - {}", pipe::SHELL_CMD, self.help)?;
            return Ok(());
        }

        // The whole remaining line is one opaque shell command string.
        ctx.bind(pipe::SHELL_CMD.to_string(), ArgValue::Text(line.to_string()));
        pipe::run(&self.inner, ctx, line)
    }
}
