use std::fmt::Write as _;

use crate::argument::Argument;
use crate::parser::ArgParser;

fn format_names(argument: &Argument) -> String {
    match argument.short_name() {
        Some(c) => format!("-{c}, --{}", argument.long_name()),
        None => format!("--{}", argument.long_name()),
    }
}

fn format_qualifiers(argument: &Argument) -> String {
    let mut out = String::new();
    if argument.is_multi_value() {
        out.push_str(" [MultiValue");
        if let Some(min) = argument.min_values().filter(|&min| min > 0) {
            let _ = write!(out, ", min args = {min}");
        }
        out.push(']');
    }
    if argument.is_positional() {
        out.push_str(" [Positional]");
    }
    if let Some(default_value) = argument.default_value() {
        let _ = write!(out, " [default = {default_value}]");
    }
    out
}

impl ArgParser {
    /// Render help text: the program name, the help trigger's description,
    /// then one line per argument in registration order.
    ///
    /// The output depends only on the configuration, never on parsed values.
    pub fn render_help(&self) -> String {
        let mut out = String::new();
        out.push_str(self.name());
        out.push('\n');

        if let Some(help) = self.help_trigger() {
            if !help.description.is_empty() {
                out.push_str(&help.description);
                out.push_str("\n\n");
            }
        }

        for argument in self.arguments() {
            let _ = writeln!(
                out,
                "{},  {}{}",
                format_names(argument),
                argument.description(),
                format_qualifiers(argument)
            );
        }

        out
    }
}
