//! Demo console: a small home-automation command language over an in-memory
//! set of switches. Exercises keyword dispatch, a quoted-name argument type,
//! piped output and the termination action.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use cmdtree::{
    Actions, ArgDefs, ArgValue, ArgumentDef, ArgumentError, CliDef, Console, ConsoleOptions,
    Context, quote, split_quoted, unquote,
};

#[derive(Parser, Debug)]
#[clap(
    name = "cmdtree-demo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive demo console for the cmdtree engine"
)]
struct Cli {
    /// File to persist line-editor history in.
    #[clap(long)]
    history_file: Option<PathBuf>,
}

type Switches = Rc<RefCell<BTreeMap<String, bool>>>;

/// Argument type resolving a (possibly quoted) switch name against the live
/// switch table. Completion pre-quotes names containing spaces.
struct SwitchArg {
    switches: Switches,
}

impl ArgumentDef<String> for SwitchArg {
    fn name(&self) -> &str {
        "switch"
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
        let switches = self.switches.borrow();
        if switches.contains_key(wanted) {
            return Ok(ArgValue::Domain(wanted.to_string()));
        }
        Err(ArgumentError::new("no such switch"))
    }

    fn complete(&self, _ctx: &Context<String>, partial: &str) -> Vec<String> {
        let typed = unquote(partial);
        self.switches
            .borrow()
            .keys()
            .filter(|name| name.starts_with(typed))
            .map(|name| {
                if name.contains(' ') {
                    quote(name)
                } else {
                    name.clone()
                }
            })
            .collect()
    }
}

fn build_actions(switches: &Switches) -> Actions<String> {
    let mut actions: Actions<String> = Actions::default();

    let state = Rc::clone(switches);
    actions.insert(
        "show_switches".to_string(),
        Rc::new(move |ctx: &mut Context<String>| {
            for (name, on) in state.borrow().iter() {
                writeln!(ctx.out(), "{:<12} {}", name, if *on { "on" } else { "off" })?;
            }
            Ok(())
        }),
    );

    let state = Rc::clone(switches);
    actions.insert(
        "show_switch".to_string(),
        Rc::new(move |ctx: &mut Context<String>| {
            let name = ctx.domain_arg("switch").cloned().unwrap_or_default();
            let on = state.borrow().get(&name).copied().unwrap_or(false);
            writeln!(ctx.out(), "{} is {}", name, if on { "on" } else { "off" })?;
            Ok(())
        }),
    );

    for (action, value) in [("switch_on", true), ("switch_off", false)] {
        let state = Rc::clone(switches);
        actions.insert(
            action.to_string(),
            Rc::new(move |ctx: &mut Context<String>| {
                let name = ctx.domain_arg("switch").cloned().unwrap_or_default();
                state.borrow_mut().insert(name, value);
                Ok(())
            }),
        );
    }

    actions.insert(
        "exit".to_string(),
        Rc::new(|ctx: &mut Context<String>| {
            ctx.request_end();
            Ok(())
        }),
    );

    actions
}

fn definition() -> CliDef {
    CliDef::map([
        (
            "show|:Show system state",
            CliDef::map([
                ("<none>:Show all switches", CliDef::action("show_switches")),
                (
                    "switch:Show one switch",
                    CliDef::map([(
                        "<switch>:Show the selected switch",
                        CliDef::action("show_switch"),
                    )]),
                ),
            ]),
        ),
        (
            "switch:Operate a switch",
            CliDef::map([(
                "<switch>:Select the switch to operate",
                CliDef::map([
                    ("on:Turn the switch on", CliDef::action("switch_on")),
                    ("off:Turn the switch off", CliDef::action("switch_off")),
                ]),
            )]),
        ),
        ("exit:Leave the console", CliDef::action("exit")),
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let switches: Switches = Rc::new(RefCell::new(BTreeMap::from([
        ("porch".to_string(), false),
        ("kitchen".to_string(), true),
        ("Living Room".to_string(), false),
    ])));

    let mut arg_defs: ArgDefs<String> = ArgDefs::default();
    arg_defs.insert(
        "<switch>".to_string(),
        Rc::new(SwitchArg {
            switches: Rc::clone(&switches),
        }),
    );

    let actions = build_actions(&switches);
    let console = Console::new(
        &definition(),
        &arg_defs,
        &actions,
        ConsoleOptions {
            prompt: "home> ".to_string(),
            intro: Some("cmdtree demo console. Type 'help' or '?' for commands.".to_string()),
            history_file: cli.history_file,
        },
    )?;
    console.run()?;
    Ok(())
}
