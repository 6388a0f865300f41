//! Line editing: a rustyline editor owning the history file and a completion
//! helper that walks the command tree.
//!
//! History is loaded when the editor is created and flushed back when it is
//! dropped, so one console session appends exactly once no matter how the
//! read loop ends.

use std::path::PathBuf;
use std::rc::Rc;

use log::debug;
use rustyline::completion::{Completer, Pair};
use rustyline::config::{CompletionType, Config};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use crate::context::Context;
use crate::tree::Node;

pub(crate) struct LineEditor<V> {
    rl: Editor<TreeCompleter<V>, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl<V> LineEditor<V> {
    pub(crate) fn new(
        root: Rc<Node<V>>,
        history_path: Option<PathBuf>,
    ) -> rustyline::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .build();
        let mut rl: Editor<TreeCompleter<V>, DefaultHistory> = Editor::with_config(config)?;
        rl.set_helper(Some(TreeCompleter { root }));
        if let Some(path) = &history_path {
            // Missing history is the normal first-run case.
            if let Err(err) = rl.load_history(path) {
                debug!("no history loaded from {}: {}", path.display(), err);
            }
        }
        Ok(LineEditor { rl, history_path })
    }

    pub(crate) fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
        let line = self.rl.readline(prompt)?;
        if !line.trim().is_empty() {
            let _ = self.rl.add_history_entry(line.as_str());
        }
        Ok(line)
    }
}

impl<V> Drop for LineEditor<V> {
    fn drop(&mut self) {
        if let Some(path) = &self.history_path {
            if let Err(err) = self.rl.save_history(path) {
                debug!("failed to save history to {}: {}", path.display(), err);
            }
        }
    }
}

/// Completion helper walking the command tree. Candidates come back relative
/// to the last space already typed, so replacement always starts there.
pub(crate) struct TreeCompleter<V> {
    pub(crate) root: Rc<Node<V>>,
}

impl<V> TreeCompleter<V> {
    fn candidates(&self, text: &str) -> Vec<String> {
        // "help foo" completes like "foo" itself.
        let query = text.strip_prefix("help ").unwrap_or(text);
        let mut ctx = Context::buffered();
        self.root.complete(&mut ctx, query)
    }
}

impl<V> Completer for TreeCompleter<V> {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let text = &line[..pos];
        let start = text.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let pairs = self
            .candidates(text)
            .into_iter()
            .map(|c| Pair {
                display: c.trim_end().to_string(),
                replacement: c,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl<V> Hinter for TreeCompleter<V> {
    type Hint = String;
}

impl<V> Highlighter for TreeCompleter<V> {}
impl<V> Validator for TreeCompleter<V> {}
impl<V> Helper for TreeCompleter<V> {}
