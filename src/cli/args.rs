use std::collections::HashMap;

use crate::cli::core::CommandError;

/// Positional arguments plus `--name value` options and `--switch` flags.
#[derive(Debug, Default)]
pub(crate) struct CommandArgs<'a> {
    positional: Vec<&'a str>,
    values: HashMap<&'a str, &'a str>,
    switches: Vec<&'a str>,
}

impl<'a> CommandArgs<'a> {
    /// Splits `args`, rejecting options that are neither in `value_options`
    /// nor in `switches`.
    pub(crate) fn parse(
        args: &[&'a str],
        value_options: &[&str],
        switches: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = CommandArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if switches.contains(&name) {
                parsed.switches.push(name);
            } else if value_options.contains(&name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{}` needs a value", name))
                })?;
                parsed.values.insert(name, value);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{}`",
                    name
                )));
            }
        }
        Ok(parsed)
    }

    pub(crate) fn required(&self, index: usize, label: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("missing <{}>", label)))
    }

    pub(crate) fn optional(&self, index: usize) -> Option<&'a str> {
        self.positional.get(index).copied()
    }

    pub(crate) fn value(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).copied()
    }

    pub(crate) fn switch(&self, name: &str) -> bool {
        self.switches.contains(&name)
    }

    pub(crate) fn at_most(&self, count: usize) -> Result<(), CommandError> {
        if self.positional.len() > count {
            return Err(CommandError::InvalidArguments(format!(
                "unexpected argument `{}`",
                self.positional[count]
            )));
        }
        Ok(())
    }
}
