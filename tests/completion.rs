//! Completion engine: keyword candidates, the absence marker, argument
//! candidates and their rewriting relative to the last typed space.

use std::io::Write;
use std::rc::Rc;

use cmdtree::{
    Actions, ArgDefs, ArgValue, ArgumentDef, ArgumentError, CliDef, CommandError, Console,
    ConsoleOptions, Context, quote, split_quoted, unquote,
};

const LIGHTS: [&str; 3] = ["kitchen", "porch", "Living Room"];

struct LightArg;

impl ArgumentDef<String> for LightArg {
    fn name(&self) -> &str {
        "light"
    }

    fn split<'l>(&self, _ctx: &Context<String>, line: &'l str) -> (&'l str, Option<&'l str>) {
        split_quoted(line)
    }

    fn validate(
        &self,
        _ctx: &Context<String>,
        token: &str,
    ) -> Result<ArgValue<String>, ArgumentError> {
        let wanted = unquote(token);
        if LIGHTS.contains(&wanted) {
            Ok(ArgValue::Domain(wanted.to_string()))
        } else {
            Err(ArgumentError::new("no such light"))
        }
    }

    fn complete(&self, _ctx: &Context<String>, partial: &str) -> Vec<String> {
        let typed = unquote(partial);
        LIGHTS
            .iter()
            .filter(|name| name.starts_with(typed))
            .map(|name| {
                if name.contains(' ') {
                    quote(name)
                } else {
                    name.to_string()
                }
            })
            .collect()
    }
}

fn fixture() -> Console<String> {
    let mut actions: Actions<String> = Actions::default();
    let noop: cmdtree::ActionFn<String> = Rc::new(|ctx: &mut Context<String>| {
        writeln!(ctx.out(), "ok")?;
        Ok(())
    });
    actions.insert("show_all".to_string(), Rc::clone(&noop));
    actions.insert("set".to_string(), Rc::clone(&noop));
    actions.insert("exit".to_string(), noop);

    let def = CliDef::map([
        (
            "show:Show system state",
            CliDef::map([
                ("<none>:Show all lights", CliDef::action("show_all")),
                (
                    "light:Show one light",
                    CliDef::map([("<light>:Show the selected light", CliDef::action("set"))]),
                ),
            ]),
        ),
        ("shutdown:Leave the console", CliDef::action("exit")),
        (
            "light:Operate a light",
            CliDef::map([(
                "<light>:Select the light to operate",
                CliDef::map([
                    ("on:Turn the light on", CliDef::action("set")),
                    ("off:Turn the light off", CliDef::action("set")),
                ]),
            )]),
        ),
    ]);

    let mut arg_defs: ArgDefs<String> = ArgDefs::default();
    arg_defs.insert("<light>".to_string(), Rc::new(LightArg));
    Console::new(&def, &arg_defs, &actions, ConsoleOptions::default()).unwrap()
}

#[test]
fn root_candidates_are_sorted_keywords_with_trailing_space() {
    let console = fixture();
    assert_eq!(
        console.complete_line(""),
        ["help ", "light ", "show ", "shutdown "]
    );
}

#[test]
fn partial_keyword_narrows_the_candidates() {
    let console = fixture();
    assert_eq!(console.complete_line("sh"), ["show ", "shutdown "]);
    assert_eq!(console.complete_line("li"), ["light "]);
}

#[test]
fn absence_branch_adds_an_empty_candidate() {
    let console = fixture();
    // The line is already executable as typed; the empty candidate says so.
    assert_eq!(console.complete_line("show "), ["light ", ""]);
}

#[test]
fn ambiguous_prefix_yields_nothing_deeper() {
    let console = fixture();
    assert!(console.complete_line("sh light ").is_empty());
}

#[test]
fn argument_candidates_complete_the_partial_token() {
    let console = fixture();
    assert_eq!(console.complete_line("light k"), ["kitchen "]);
    assert_eq!(console.complete_line("light po"), ["porch "]);
}

#[test]
fn quoted_candidate_is_rewritten_relative_to_the_last_space() {
    let console = fixture();
    assert_eq!(console.complete_line("light \"Liv"), ["\"Living Room\" "]);
    assert_eq!(console.complete_line("light \"Living R"), ["Room\" "]);
}

#[test]
fn invalid_earlier_token_stays_silent_and_completion_continues() {
    let console = fixture();
    assert_eq!(console.complete_line("light attic o"), ["off ", "on "]);
}

#[test]
fn terminal_nodes_offer_no_candidates() {
    let console = fixture();
    assert!(console.complete_line("shutdown ").is_empty());
}

#[test]
fn every_completion_splices_back_into_an_acceptable_line() {
    let console = fixture();
    let partials = ["", "sh", "show ", "light k", "light \"Liv", "light kitchen o"];
    for partial in partials {
        for candidate in console.complete_line(partial) {
            let start = partial.rfind(' ').map(|i| i + 1).unwrap_or(0);
            let spliced = format!("{}{}", &partial[..start], candidate);
            let mut ctx = Context::buffered();
            match console.run_line(&mut ctx, &spliced) {
                // A spliced line may still be incomplete, but never wrong.
                Ok(())
                | Err(CommandError::MissingKeyword)
                | Err(CommandError::MissingArgument(_)) => {}
                Err(err) => panic!(
                    "completion '{}' of '{}' was rejected: {}",
                    candidate, partial, err
                ),
            }
        }
    }
}

#[test]
fn help_prefix_completes_like_the_bare_command() {
    let console = fixture();
    assert_eq!(
        console.complete_line("help sh"),
        console.complete_line("sh")
    );
}
