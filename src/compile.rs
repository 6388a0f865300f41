//! Definition compiler: turns a declarative, nested tree description into an
//! executable command tree, resolving argument-type references against the
//! contract registry and action names against the bound handler table.
//!
//! Every structural problem is a [`DefinitionError`] raised here, at
//! startup; nothing is deferred to first use.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::args::ArgDefs;
use crate::error::DefinitionError;
use crate::tree::{ActionFn, ActionNode, ArgumentNode, ListNode, Node, PipeNode};

/// Key meaning "this position may be left empty".
pub const ABSENT: &str = "<none>";

pub(crate) const PIPE_KEYWORD: &str = "|";
const PIPE_HELP_SUFFIX: &str = " (pipe output to shell command)";

/// Handler table: action name used in the tree description to its bound,
/// typed callable. Built by the consumer before the console starts.
pub type Actions<V> = FxHashMap<String, ActionFn<V>>;

/// Declarative description of a command (sub)tree.
///
/// Map keys are `"keyword:help"`, `"keyword|:help"` (the trailing `|` marks
/// the subtree pipe-eligible), `"<type>:help"` for a registered argument
/// type, or `"<none>:help"` for the branch taken when no keyword is typed.
/// A map whose single key is an argument-type reference compiles to an
/// argument node; any other map compiles to a keyword list. An action names
/// a handler in the [`Actions`] table.
pub enum CliDef {
    Map(Vec<(String, CliDef)>),
    Action(String),
}

impl CliDef {
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CliDef)>,
        K: Into<String>,
    {
        CliDef::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn action(name: impl Into<String>) -> Self {
        CliDef::Action(name.into())
    }
}

impl From<&str> for CliDef {
    fn from(name: &str) -> Self {
        CliDef::Action(name.to_string())
    }
}

/// Compile a full tree description. The root carries the standard top-level
/// help string.
pub fn compile<V>(
    def: &CliDef,
    arg_defs: &ArgDefs<V>,
    actions: &Actions<V>,
) -> Result<Node<V>, DefinitionError> {
    compile_elem("<root>", "Main commands", def, arg_defs, actions, false)
}

fn split_key<'k>(key: &'k str, parent: &str) -> Result<(&'k str, &'k str), DefinitionError> {
    key.split_once(':')
        .ok_or_else(|| DefinitionError::MissingHelp {
            key: key.to_string(),
            parent: parent.to_string(),
        })
}

fn compile_elem<V>(
    parent: &str,
    help: &str,
    def: &CliDef,
    arg_defs: &ArgDefs<V>,
    actions: &Actions<V>,
    pipe: bool,
) -> Result<Node<V>, DefinitionError> {
    match def {
        CliDef::Action(name) => {
            let handler = actions
                .get(name)
                .cloned()
                .ok_or_else(|| DefinitionError::UnknownAction(name.clone()))?;
            let action = Node::Action(ActionNode {
                help: help.to_string(),
                handler,
            });
            if pipe {
                // Offer the caller a choice between direct execution and
                // execution with piped output.
                Ok(wrap_pipe(help, Rc::new(action)))
            } else {
                Ok(action)
            }
        }
        CliDef::Map(entries) => {
            if entries.is_empty() {
                return Err(DefinitionError::EmptyList(parent.to_string()));
            }

            // A single bracketed key is a variable argument.
            if let [(key, child)] = entries.as_slice() {
                let (name, ch_help) = split_key(key, parent)?;
                if name.starts_with('<') && name != ABSENT {
                    let contract = arg_defs
                        .get(name)
                        .cloned()
                        .ok_or_else(|| DefinitionError::UnknownArgType(name.to_string()))?;
                    let child_node =
                        compile_elem(name, ch_help, child, arg_defs, actions, pipe)?;
                    return Ok(Node::Argument(ArgumentNode {
                        help: help.to_string(),
                        def: contract,
                        child: Rc::new(child_node),
                    }));
                }
            }

            compile_list(parent, help, entries, arg_defs, actions, pipe)
        }
    }
}

fn compile_list<V>(
    parent: &str,
    help: &str,
    entries: &[(String, CliDef)],
    arg_defs: &ArgDefs<V>,
    actions: &Actions<V>,
    pipe: bool,
) -> Result<Node<V>, DefinitionError> {
    let mut elems: FxHashMap<String, Rc<Node<V>>> = FxHashMap::default();
    let mut absent: Option<Rc<Node<V>>> = None;
    let mut absent_pipe = false;

    for (key, value) in entries {
        let (raw_name, ch_help) = split_key(key, parent)?;
        let (name, marked) = match raw_name.strip_suffix('|') {
            Some(stripped) => (stripped, true),
            None => (raw_name, false),
        };
        let ch_pipe = pipe || marked;

        if name == ABSENT {
            if absent.is_some() {
                return Err(DefinitionError::DuplicateKeyword {
                    keyword: ABSENT.to_string(),
                    parent: parent.to_string(),
                });
            }
            // The pipe branch is hoisted next to the absence child below, so
            // the child itself compiles unwrapped.
            let node = compile_elem(name, ch_help, value, arg_defs, actions, false)?;
            absent = Some(Rc::new(node));
            absent_pipe = ch_pipe;
        } else {
            if name.starts_with('<') {
                return Err(DefinitionError::MisplacedArgument {
                    key: key.clone(),
                    parent: parent.to_string(),
                });
            }
            let node = compile_elem(name, ch_help, value, arg_defs, actions, ch_pipe)?;
            if elems.insert(name.to_string(), Rc::new(node)).is_some() {
                return Err(DefinitionError::DuplicateKeyword {
                    keyword: name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
    }

    if absent_pipe {
        if let Some(inner) = &absent {
            let pipe_node = Node::Pipe(PipeNode {
                help: format!("{}{}", inner.help(), PIPE_HELP_SUFFIX),
                inner: Rc::clone(inner),
            });
            elems.insert(PIPE_KEYWORD.to_string(), Rc::new(pipe_node));
        }
    }

    Ok(Node::List(ListNode {
        help: help.to_string(),
        elems,
        absent,
    }))
}

/// Synthesize the list offering `action` both directly (absence branch) and
/// behind the `|` pipe branch.
fn wrap_pipe<V>(help: &str, inner: Rc<Node<V>>) -> Node<V> {
    let pipe_node = Node::Pipe(PipeNode {
        help: format!("{}{}", help, PIPE_HELP_SUFFIX),
        inner: Rc::clone(&inner),
    });
    let mut elems: FxHashMap<String, Rc<Node<V>>> = FxHashMap::default();
    elems.insert(PIPE_KEYWORD.to_string(), Rc::new(pipe_node));
    Node::List(ListNode {
        help: help.to_string(),
        elems,
        absent: Some(inner),
    })
}
