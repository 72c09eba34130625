//! Shell context, dispatch and the error types shared by command handlers.

use std::{io, path::PathBuf};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::ledger_manager::{LedgerManager, LoadMetadata},
    core::utils::PathResolver,
    errors::LedgerError,
    ledger::Money,
    storage::JsonFileStore,
    utils::dates::{format_date, parse_date_input},
};

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::io as cli_io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: &'static CommandRegistry,
    pub manager: LedgerManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir())
    }

    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let data_dir = config.data_dir(config_manager.base_dir());
        let store = JsonFileStore::with_retention(
            data_dir,
            &config.document_prefix,
            config.backup_retention,
        )?;
        let (manager, metadata) = LedgerManager::open(Box::new(store))?;

        let context = Self {
            mode,
            registry: commands::registry(),
            manager,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        };
        context.report_load(&metadata);
        Ok(context)
    }

    fn report_load(&self, metadata: &LoadMetadata) {
        for key in &metadata.legacy_documents {
            cli_io::print_info(format!(
                "Loaded `{}` from an unversioned document; it will be upgraded on the next save.",
                key
            ));
        }
        for issue in &metadata.audit.issues {
            cli_io::print_warning(issue);
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&'static CommandDefinition> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        format!("rent-ledger ({} renters)> ", self.manager.book().renter_count())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(definition) = self.command(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match (definition.handler)(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        super::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_hint(format!("Did you mean `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        Ok(self.confirm("Exit shell?")?)
    }

    /// Asks before destructive actions. Script mode never prompts.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(LedgerError::Io(err)) => Err(CliError::Io(err)),
            other => {
                cli_io::print_error(other);
                Ok(())
            }
        }
    }

    pub(crate) fn resolve_renter(&self, key: &str) -> Result<Uuid, CommandError> {
        Ok(self.manager.book().find_renter(key)?.id)
    }

    pub(crate) fn resolve_invoice(&self, key: &str) -> Result<Uuid, CommandError> {
        Ok(self.manager.book().find_transaction(key)?.id)
    }

    pub(crate) fn money(&self, amount: Money) -> String {
        format!("{}{}", self.config.currency_symbol, amount)
    }

    pub(crate) fn date(&self, date: NaiveDate) -> String {
        format_date(date, self.config.date_display)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.manager.today()
    }
}

pub(crate) fn parse_money(raw: &str, label: &str) -> Result<Money, CommandError> {
    raw.parse::<Money>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid {} `{}`", label, raw)))
}

pub(crate) fn parse_non_negative(raw: &str, label: &str) -> Result<Money, CommandError> {
    let amount = parse_money(raw, label)?;
    if amount.is_negative() {
        return Err(CommandError::InvalidArguments(format!(
            "{} cannot be negative",
            label
        )));
    }
    Ok(amount)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    parse_date_input(raw).map_err(|err| match err {
        LedgerError::InvalidInput(message) => CommandError::InvalidArguments(message),
        other => CommandError::Core(other),
    })
}

/// User-facing shell failure that ends the session.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            CommandError::Dialoguer(inner) => CliError::Dialoguer(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_base_dir(CliMode::Script, base)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
