use std::collections::HashMap;

use once_cell::sync::Lazy;

pub mod invoice;
pub mod renter;
pub mod report;
pub mod system;

use crate::cli::core::{CommandResult, ShellContext};

static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| CommandRegistry::new(all_definitions()));

pub(crate) fn registry() -> &'static CommandRegistry {
    &REGISTRY
}

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(renter::definitions());
    commands.extend(invoice::definitions());
    commands.extend(report::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_every_shell_command() {
        let names: Vec<&str> = registry().names().collect();
        for expected in [
            "help",
            "renters",
            "add-renter",
            "edit-renter",
            "toggle-renter",
            "delete-renter",
            "invoices",
            "invoice",
            "pay",
            "edit-invoice",
            "delete-invoice",
            "statement",
            "stats",
            "month",
            "audit",
            "exit",
        ] {
            assert!(names.contains(&expected), "missing `{expected}`");
        }
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }
}
