//! The argument contract: the pluggable behavior every variable-argument
//! type plugs into the command tree with.
//!
//! An [`ArgumentDef`] is an immutable configuration object supplied at
//! tree-compile time, typically parameterized by a domain accessor such as
//! "enumerate the currently valid names". Every method is a pure function of
//! the accessor's current results and the text supplied.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::context::{ArgValue, Context};
use crate::error::ArgumentError;

/// Registry mapping the bracketed type name used in a tree definition
/// (e.g. `"<light>"`) to its contract.
pub type ArgDefs<V> = FxHashMap<String, Rc<dyn ArgumentDef<V>>>;

/// Legal values of an argument, for help rendering.
pub enum HelpOptions {
    /// Plain values, rendered columnized.
    Plain(Vec<String>),
    /// `(value, description)` pairs, rendered as an aligned table.
    Described(Vec<(String, String)>),
}

pub trait ArgumentDef<V> {
    /// The argument's name, used in help and error messages.
    fn name(&self) -> &str;

    /// The name the validated value is bound under in the context. Defaults
    /// to [`ArgumentDef::name`].
    fn ctx_name(&self) -> &str {
        self.name()
    }

    /// Split one line into this argument's token and the remainder handed to
    /// the child node. Defaults to splitting on the first space; quoted-name
    /// contracts override this with [`split_quoted`].
    fn split<'l>(&self, ctx: &Context<V>, line: &'l str) -> (&'l str, Option<&'l str>) {
        let _ = ctx;
        split_space(line)
    }

    /// Resolve one token against the live domain accessor.
    fn validate(&self, ctx: &Context<V>, token: &str) -> Result<ArgValue<V>, ArgumentError>;

    /// Candidate completions for a partially typed token. Quoted-name
    /// contracts pre-quote each candidate.
    fn complete(&self, ctx: &Context<V>, partial: &str) -> Vec<String>;

    /// Legal values for help rendering; by default derived from completing
    /// the empty string.
    fn help_options(&self, ctx: &Context<V>) -> HelpOptions {
        HelpOptions::Plain(self.complete(ctx, ""))
    }
}

/// Split on the first space. The remainder keeps whatever spacing follows.
pub fn split_space(line: &str) -> (&str, Option<&str>) {
    match line.split_once(' ') {
        Some((token, rest)) => (token, Some(rest)),
        None => (line, None),
    }
}

/// Split a token that may be a quoted display name containing spaces:
/// scan for the closing quote followed by a space, so `"Living Room" on`
/// yields token `"Living Room"` (quotes retained) and remainder `on`.
/// Without an opening quote this behaves like [`split_space`]; without a
/// closing quote the whole line is the token.
pub fn split_quoted(line: &str) -> (&str, Option<&str>) {
    let Some(body) = line.strip_prefix('"') else {
        return split_space(line);
    };
    match body.find('"') {
        Some(close) => {
            // Opening quote, body, closing quote.
            let end = close + 2;
            let rest = line[end..].trim_start();
            if rest.is_empty() {
                (&line[..end], None)
            } else {
                (&line[..end], Some(rest))
            }
        }
        None => (line, None),
    }
}

/// Strip the surrounding quotes of a (possibly partial) quoted token.
pub fn unquote(token: &str) -> &str {
    match token.strip_prefix('"') {
        Some(body) => body.strip_suffix('"').unwrap_or(body),
        None => token,
    }
}

/// Quote a display name for use as a completion candidate.
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_split_keeps_remainder() {
        assert_eq!(split_space("a b c"), ("a", Some("b c")));
        assert_eq!(split_space("alone"), ("alone", None));
        assert_eq!(split_space(""), ("", None));
    }

    #[test]
    fn quoted_split_consumes_whole_display_name() {
        assert_eq!(
            split_quoted("\"Living Room\" on"),
            ("\"Living Room\"", Some("on"))
        );
        assert_eq!(split_quoted("\"Living Room\""), ("\"Living Room\"", None));
    }

    #[test]
    fn quoted_split_without_quote_falls_back() {
        assert_eq!(split_quoted("porch on"), ("porch", Some("on")));
    }

    #[test]
    fn quoted_split_unterminated_takes_everything() {
        assert_eq!(split_quoted("\"Living Ro"), ("\"Living Ro", None));
    }

    #[test]
    fn unquote_handles_partial_tokens() {
        assert_eq!(unquote("\"Living Room\""), "Living Room");
        assert_eq!(unquote("\"Living"), "Living");
        assert_eq!(unquote("porch"), "porch");
    }
}
