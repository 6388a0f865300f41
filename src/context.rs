//! Per-line execution context.
//!
//! A [`Context`] is created fresh for every line the console dispatches and
//! destroyed when the line finishes. It records the keyword trail, the
//! argument bindings accumulated on the way down the tree, the termination
//! flag, and the output sink that actions write through (swapped to an
//! in-memory buffer for the duration of a piped execution).

use std::io::{self, Write};
use std::mem;

use rustc_hash::FxHashMap;

/// A value bound by an argument contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue<V> {
    /// Raw text consumed without domain resolution (e.g. the pipe subsystem's
    /// shell command string).
    Text(String),
    /// A value resolved against the contract's domain accessor.
    Domain(V),
}

impl<V> ArgValue<V> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            ArgValue::Domain(_) => None,
        }
    }

    pub fn as_domain(&self) -> Option<&V> {
        match self {
            ArgValue::Text(_) => None,
            ArgValue::Domain(v) => Some(v),
        }
    }
}

pub struct Context<V> {
    kws: Vec<String>,
    args: FxHashMap<String, ArgValue<V>>,
    end: bool,
    help_requested: bool,
    out: OutputSink,
}

impl<V> Context<V> {
    /// Context whose output goes to the process stdout.
    pub fn new() -> Self {
        Context {
            kws: Vec::new(),
            args: FxHashMap::default(),
            end: false,
            help_requested: false,
            out: OutputSink::Stdout,
        }
    }

    /// Context that collects output in memory, retrievable with
    /// [`Context::take_output`]. Useful in tests and embedding scenarios.
    pub fn buffered() -> Self {
        Context {
            out: OutputSink::Capture(Vec::new()),
            ..Context::new()
        }
    }

    /// The keywords consumed so far, in dispatch order. Absence-sentinel
    /// steps contribute nothing.
    pub fn keywords(&self) -> &[String] {
        &self.kws
    }

    pub(crate) fn push_keyword(&mut self, kw: &str) {
        self.kws.push(kw.to_string());
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue<V>> {
        self.args.get(name)
    }

    /// The domain value bound under `name`, if any.
    pub fn domain_arg(&self, name: &str) -> Option<&V> {
        self.args.get(name).and_then(ArgValue::as_domain)
    }

    /// The raw-text value bound under `name`, if any.
    pub fn text_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(ArgValue::as_text)
    }

    /// Bind a validated value. Last write for a given name wins.
    pub(crate) fn bind(&mut self, name: String, value: ArgValue<V>) {
        self.args.insert(name, value);
    }

    /// Ask the read loop to stop after this line.
    pub fn request_end(&mut self) {
        self.end = true;
    }

    pub fn should_end(&self) -> bool {
        self.end
    }

    pub(crate) fn request_help(&mut self) {
        self.help_requested = true;
    }

    pub(crate) fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// Where command output goes. Actions and help rendering write here
    /// rather than to stdout directly so the pipe subsystem can capture one
    /// execution's output.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut self.out
    }

    /// Drain captured output. Empty for a stdout-backed context.
    pub fn take_output(&mut self) -> Vec<u8> {
        match &mut self.out {
            OutputSink::Stdout => Vec::new(),
            OutputSink::Capture(buf) => mem::take(buf),
        }
    }

    pub(crate) fn begin_capture(&mut self) -> OutputSink {
        mem::replace(&mut self.out, OutputSink::Capture(Vec::new()))
    }

    pub(crate) fn end_capture(&mut self, saved: OutputSink) -> Vec<u8> {
        match mem::replace(&mut self.out, saved) {
            OutputSink::Capture(buf) => buf,
            OutputSink::Stdout => Vec::new(),
        }
    }
}

impl<V> Default for Context<V> {
    fn default() -> Self {
        Context::new()
    }
}

pub(crate) enum OutputSink {
    Stdout,
    Capture(Vec<u8>),
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Stdout => io::stdout().write(buf),
            OutputSink::Capture(out) => {
                out.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout => io::stdout().flush(),
            OutputSink::Capture(_) => Ok(()),
        }
    }
}
