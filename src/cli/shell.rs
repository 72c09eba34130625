//! Line driver for the rent ledger shell. Terminal and script sessions share
//! one loop and differ only in where lines come from.

use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Cmd, Context, Editor, Helper, Highlighter, Hinter, KeyEvent, Validator,
};

use crate::cli::commands::CommandRegistry;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io as cli_io;

const SCRIPT_ENV: &str = "RENT_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    if mode == CliMode::Script {
        colored::control::set_override(false);
    }

    let mut context = ShellContext::new(mode)?;
    let mut source = match mode {
        CliMode::Script => LineSource::Script(io::stdin().lock().lines()),
        CliMode::Interactive => {
            cli_io::print_info("Type `help` to list commands.");
            LineSource::terminal(context.registry)?
        }
    };

    while context.running {
        let prompt = context.prompt();
        match source.next_line(&prompt)? {
            Input::Line(line) => match handle_line(&mut context, &line) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => break,
                Err(err) => context.report_error(err)?,
            },
            Input::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Input::Closed => break,
        }
    }
    Ok(())
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

enum LineSource {
    Terminal(Box<Editor<CommandCompleter, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

impl LineSource {
    fn terminal(registry: &'static CommandRegistry) -> Result<Self, CliError> {
        let mut editor: Editor<CommandCompleter, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(CommandCompleter { registry }));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self::Terminal(Box::new(editor)))
    }

    fn next_line(&mut self, prompt: &str) -> Result<Input, CliError> {
        match self {
            Self::Script(lines) => match lines.next() {
                Some(line) => Ok(Input::Line(line?)),
                None => Ok(Input::Closed),
            },
            Self::Terminal(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    let entry = line.trim();
                    if !entry.is_empty() {
                        editor.add_history_entry(entry).ok();
                    }
                    Ok(Input::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
                Err(ReadlineError::Eof) => {
                    cli_io::print_info("Exiting shell.");
                    Ok(Input::Closed)
                }
                Err(err) => Err(err.into()),
            },
        }
    }
}

/// Runs one shell line. Blank lines and `#` comments are ignored.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            cli_io::print_warning(format!("Could not read `{}`: {}", line, err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((name, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());
    let control = context.dispatch(&name.to_lowercase(), name, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(input)
}

/// Completes the command word from the registry; arguments are left alone.
#[derive(Helper, Highlighter, Hinter, Validator)]
struct CommandCompleter {
    registry: &'static CommandRegistry,
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let word = head.trim_start();
        if word.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }

        let typed = word.to_ascii_lowercase();
        let mut matches: Vec<Pair> = self
            .registry
            .names()
            .filter(|name| name.starts_with(typed.as_str()))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        matches.sort_by(|a, b| a.display.cmp(&b.display));
        Ok((head.len() - word.len(), matches))
    }
}
