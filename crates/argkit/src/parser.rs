//! Argument registry and token parser.
//!
//! Arguments are configured through a fluent chain on [`ArgParser`]: every
//! `add_*` call registers a new argument and makes it the target of the
//! modifiers that follow (`default`, `positional`, `multi_value`,
//! `store_value`, ...).
//!
//! ```
//! use argkit::ArgParser;
//!
//! let mut parser = ArgParser::new("copy");
//! parser
//!     .add_string_argument(('i', "input"), "file to read")?
//!     .positional()?
//!     .add_int_argument("count", "copies to make")?
//!     .default(1)?
//!     .add_flag(('v', "verbose"), "print progress")?;
//!
//! let outcome = parser.parse(["notes.txt", "-v"])?;
//! assert!(outcome.success());
//! assert_eq!(parser.get_string("input")?, "notes.txt");
//! assert_eq!(parser.get_int("count")?, 1);
//! assert!(parser.get_flag('v')?);
//! # Ok::<(), argkit::ArgError>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::argument::Argument;
use crate::error::{ArgError, Result};
use crate::value::{ArgKind, ArgValue, Sequence, Slot, Value};

/// Names an argument is registered under: a long name, optionally paired
/// with a short name.
pub trait ArgNames {
    fn into_names(self) -> (Option<char>, String);
}

impl ArgNames for &str {
    fn into_names(self) -> (Option<char>, String) {
        (None, self.to_string())
    }
}

impl ArgNames for String {
    fn into_names(self) -> (Option<char>, String) {
        (None, self)
    }
}

impl ArgNames for (char, &str) {
    fn into_names(self) -> (Option<char>, String) {
        (Some(self.0), self.1.to_string())
    }
}

impl ArgNames for (char, String) {
    fn into_names(self) -> (Option<char>, String) {
        (Some(self.0), self.1)
    }
}

impl ArgNames for (Option<char>, String) {
    fn into_names(self) -> (Option<char>, String) {
        self
    }
}

/// Lookup key: a long name or a short name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Long(&'a str),
    Short(char),
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Self::Long(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Self::Long(name.as_str())
    }
}

impl From<char> for Key<'_> {
    fn from(name: char) -> Self {
        Self::Short(name)
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(name) => write!(f, "--{name}"),
            Self::Short(c) => write!(f, "-{c}"),
        }
    }
}

/// Why a parse that ran to completion is not valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("argument '--{name}' expects at least {min} values, got {actual}")]
    TooFewValues {
        name: String,
        min: usize,
        actual: usize,
    },

    #[error("argument '--{name}' requires a value")]
    MissingValue { name: String },
}

impl ValidationFailure {
    pub fn name(&self) -> &str {
        match self {
            Self::TooFewValues { name, .. } | Self::MissingValue { name } => name,
        }
    }
}

/// Result of a parse that did not abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every argument satisfied its constraints.
    Valid,
    /// The help trigger was seen; parsing stopped and nothing was validated.
    Help,
    /// Parsing finished but some arguments are missing values. Parsed values
    /// remain readable.
    Invalid(Vec<ValidationFailure>),
}

impl ParseOutcome {
    /// `true` for [`Valid`](Self::Valid) and [`Help`](Self::Help).
    pub fn success(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Invalid(failures) => failures,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HelpTrigger {
    pub(crate) short: char,
    pub(crate) long: String,
    pub(crate) description: String,
}

enum LongStep {
    Help,
    Await(usize),
    Done,
}

enum ClusterStep {
    Help,
    Done { consumed_next: bool },
}

/// Registry of declared arguments and the parser that fills them.
#[derive(Debug)]
pub struct ArgParser {
    name: String,
    arguments: IndexMap<String, Argument>,
    short_names: HashMap<char, usize>,
    last_added: Option<usize>,
    help: Option<HelpTrigger>,
    help_requested: bool,
    rest: Vec<String>,
}

impl ArgParser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
            short_names: HashMap::new(),
            last_added: None,
            help: None,
            help_requested: false,
            rest: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an argument of element type `T`.
    ///
    /// Long and short names must be unique across the registry; a repeated
    /// name is rejected with [`ArgError::DuplicateName`] and nothing is
    /// registered.
    pub fn add_argument<T: ArgValue>(
        &mut self,
        names: impl ArgNames,
        description: &str,
    ) -> Result<&mut Self> {
        self.add_argument_of_kind(T::KIND, names, description)
    }

    /// Register an argument whose kind is only known at run time.
    pub fn add_argument_of_kind(
        &mut self,
        kind: ArgKind,
        names: impl ArgNames,
        description: &str,
    ) -> Result<&mut Self> {
        let (short, long) = names.into_names();
        if long.is_empty() {
            return Err(ArgError::Configuration(
                "argument long name must not be empty".to_string(),
            ));
        }
        if self.arguments.contains_key(&long) {
            return Err(ArgError::DuplicateName(format!("--{long}")));
        }
        if let Some(c) = short {
            if c == '-' || c == '=' || c.is_whitespace() {
                return Err(ArgError::Configuration(format!(
                    "'{c}' cannot be used as a short name"
                )));
            }
            if self.short_names.contains_key(&c) {
                return Err(ArgError::DuplicateName(format!("-{c}")));
            }
        }

        let argument = Argument::new(kind, long.clone(), short, description.to_string());
        let (index, _) = self.arguments.insert_full(long, argument);
        if let Some(c) = short {
            self.short_names.insert(c, index);
        }
        self.last_added = Some(index);
        Ok(self)
    }

    pub fn add_string_argument(
        &mut self,
        names: impl ArgNames,
        description: &str,
    ) -> Result<&mut Self> {
        self.add_argument::<String>(names, description)
    }

    pub fn add_int_argument(&mut self, names: impl ArgNames, description: &str) -> Result<&mut Self> {
        self.add_argument::<i32>(names, description)
    }

    pub fn add_flag(&mut self, names: impl ArgNames, description: &str) -> Result<&mut Self> {
        self.add_argument::<bool>(names, description)
    }

    /// Designate `-short`/`--long` as the help trigger.
    ///
    /// Seeing either one during a parse stops it immediately with
    /// [`ParseOutcome::Help`].
    pub fn add_help(&mut self, short: char, long: &str, description: &str) -> Result<&mut Self> {
        self.add_string_argument((short, long), description)?;
        self.help = Some(HelpTrigger {
            short,
            long: long.to_string(),
            description: description.to_string(),
        });
        Ok(self)
    }

    fn last_configured(&mut self) -> Result<&mut Argument> {
        let index = self.last_added.ok_or_else(ArgError::no_argument_configured)?;
        Ok(&mut self.arguments[index])
    }

    /// Give the last added argument a default and store it right away.
    pub fn default(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.last_configured()?.set_default(value.into())?;
        Ok(self)
    }

    pub fn positional(&mut self) -> Result<&mut Self> {
        self.set_positional(true)
    }

    pub fn set_positional(&mut self, positional: bool) -> Result<&mut Self> {
        self.last_configured()?.set_positional(positional);
        Ok(self)
    }

    /// Let the last added argument collect any number of values.
    pub fn multi_value(&mut self) -> Result<&mut Self> {
        self.last_configured()?.set_multi_value(None);
        Ok(self)
    }

    /// Let the last added argument collect values, requiring at least `min`.
    pub fn multi_value_min(&mut self, min: usize) -> Result<&mut Self> {
        self.last_configured()?.set_multi_value(Some(min));
        Ok(self)
    }

    /// Bind caller storage for the last added argument's single value.
    pub fn store_value<T: ArgValue>(&mut self, slot: &Slot<T>) -> Result<&mut Self> {
        self.last_configured()?.store_value(slot)?;
        Ok(self)
    }

    /// Bind caller storage for the last added argument's value sequence.
    pub fn store_values<T: ArgValue>(&mut self, sequence: &Sequence<T>) -> Result<&mut Self> {
        self.last_configured()?.store_values(sequence)?;
        Ok(self)
    }

    fn index_of(&self, key: Key<'_>) -> Result<usize> {
        let index = match key {
            Key::Long(name) => self.arguments.get_index_of(name),
            Key::Short(c) => self.short_names.get(&c).copied(),
        };
        index.ok_or_else(|| ArgError::NotFound(key.to_string()))
    }

    /// Store a value for an argument outside of parsing, marking it
    /// initialized.
    pub fn set_value<'k, T: ArgValue>(&mut self, key: impl Into<Key<'k>>, value: T) -> Result<()> {
        let index = self.index_of(key.into())?;
        self.arguments[index].seed(value)
    }

    pub fn argument<'k>(&self, key: impl Into<Key<'k>>) -> Result<&Argument> {
        let index = self.index_of(key.into())?;
        Ok(&self.arguments[index])
    }

    /// All arguments in registration order.
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.values()
    }

    pub fn get_value<'k, T: ArgValue>(&self, key: impl Into<Key<'k>>) -> Result<T> {
        self.get_value_at(key, 0)
    }

    pub fn get_value_at<'k, T: ArgValue>(&self, key: impl Into<Key<'k>>, index: usize) -> Result<T> {
        self.argument(key)?.get(index)
    }

    /// Every value held by a multi-value argument.
    pub fn values<'k, T: ArgValue>(&self, key: impl Into<Key<'k>>) -> Result<Vec<T>> {
        Ok(self.argument(key)?.typed::<T>()?.values())
    }

    pub fn get_int<'k>(&self, key: impl Into<Key<'k>>) -> Result<i32> {
        self.get_value(key)
    }

    pub fn get_int_at<'k>(&self, key: impl Into<Key<'k>>, index: usize) -> Result<i32> {
        self.get_value_at(key, index)
    }

    pub fn get_string<'k>(&self, key: impl Into<Key<'k>>) -> Result<String> {
        self.get_value(key)
    }

    pub fn get_string_at<'k>(&self, key: impl Into<Key<'k>>, index: usize) -> Result<String> {
        self.get_value_at(key, index)
    }

    pub fn get_flag<'k>(&self, key: impl Into<Key<'k>>) -> Result<bool> {
        self.get_value(key)
    }

    pub fn get_flag_at<'k>(&self, key: impl Into<Key<'k>>, index: usize) -> Result<bool> {
        self.get_value_at(key, index)
    }

    /// Whether the last parse stopped on the help trigger.
    pub fn is_help_requested(&self) -> bool {
        self.help_requested
    }

    pub(crate) fn help_trigger(&self) -> Option<&HelpTrigger> {
        self.help.as_ref()
    }

    /// Bare tokens from the last parse that had no positional slot left.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Parse a process argument vector; element 0 (the program name) is skipped.
    pub fn parse_args<I, S>(&mut self, argv: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse(argv.into_iter().skip(1))
    }

    /// Parse `tokens` into the registered arguments.
    ///
    /// Unknown names and malformed values abort with an error. Missing
    /// values and short multi-value sequences are reported through
    /// [`ParseOutcome::Invalid`]. Repeated parses overwrite single values
    /// and keep appending to multi-value sequences.
    pub fn parse<I, S>(&mut self, tokens: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        self.help_requested = false;
        self.rest.clear();

        let positionals: Vec<usize> = self
            .arguments
            .values()
            .enumerate()
            .filter(|(_, arg)| arg.is_positional())
            .map(|(index, _)| index)
            .collect();
        let mut next_positional = 0usize;
        let mut awaiting: Option<usize> = None;

        let mut i = 0usize;
        while i < tokens.len() {
            let token = tokens[i].as_ref();

            if let Some(body) = token.strip_prefix("--") {
                trace!(token, "long option");
                match self.parse_long(body)? {
                    LongStep::Help => return Ok(self.stop_for_help(token)),
                    LongStep::Await(index) => awaiting = Some(index),
                    LongStep::Done => awaiting = None,
                }
            } else if token.len() > 1 && token.starts_with('-') {
                trace!(token, "short option cluster");
                let next = tokens.get(i + 1).map(|t| t.as_ref());
                match self.parse_cluster(&token[1..], next)? {
                    ClusterStep::Help => return Ok(self.stop_for_help(token)),
                    ClusterStep::Done { consumed_next } => {
                        if consumed_next {
                            i += 1;
                        }
                    }
                }
                awaiting = None;
            } else if let Some(index) = awaiting.take() {
                trace!(token, argument = %self.arguments[index].long_name(), "option value");
                self.arguments[index].parse_value(token)?;
            } else if let Some(&index) = positionals.get(next_positional) {
                trace!(token, argument = %self.arguments[index].long_name(), "positional value");
                let argument = &mut self.arguments[index];
                argument.parse_value(token)?;
                if !argument.is_multi_value() {
                    next_positional += 1;
                }
            } else {
                debug!(token, "no positional argument left for token");
                self.rest.push(token.to_string());
            }

            i += 1;
        }

        Ok(self.validate())
    }

    fn stop_for_help(&mut self, token: &str) -> ParseOutcome {
        debug!(token, "help requested, skipping validation");
        self.help_requested = true;
        ParseOutcome::Help
    }

    fn is_help_long(&self, name: &str) -> bool {
        self.help.as_ref().is_some_and(|h| h.long == name)
    }

    fn is_help_short(&self, c: char) -> bool {
        self.help.as_ref().is_some_and(|h| h.short == c)
    }

    /// `body` is the token without its leading `--`.
    fn parse_long(&mut self, body: &str) -> Result<LongStep> {
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if self.is_help_long(name) {
            return Ok(LongStep::Help);
        }

        let index = self
            .arguments
            .get_index_of(name)
            .ok_or_else(|| ArgError::UnknownArgument(format!("--{name}")))?;
        let argument = &mut self.arguments[index];

        if let Some(value) = value {
            argument.parse_value(value)?;
            Ok(LongStep::Done)
        } else if argument.kind() == ArgKind::Bool {
            argument.set_present()?;
            Ok(LongStep::Done)
        } else {
            Ok(LongStep::Await(index))
        }
    }

    /// `body` is the token without its leading `-`. Flags in a cluster are
    /// set in order. A value-taking option takes the rest of the token after
    /// `=` (`-o=file`), or the next token when it ends the cluster (`-o file`).
    /// Anywhere else it gets no value and the cluster continues.
    fn parse_cluster(&mut self, body: &str, next: Option<&str>) -> Result<ClusterStep> {
        for (offset, c) in body.char_indices() {
            if self.is_help_short(c) {
                return Ok(ClusterStep::Help);
            }

            let index = *self
                .short_names
                .get(&c)
                .ok_or_else(|| ArgError::UnknownArgument(format!("-{c}")))?;
            let argument = &mut self.arguments[index];

            if argument.kind() == ArgKind::Bool {
                argument.set_present()?;
                continue;
            }

            let remainder = &body[offset + c.len_utf8()..];
            if let Some(value) = remainder.strip_prefix('=') {
                argument.parse_value(value)?;
                return Ok(ClusterStep::Done {
                    consumed_next: false,
                });
            }
            if !remainder.is_empty() {
                trace!(option = %c, "value-taking option inside cluster left without value");
                continue;
            }
            return match next {
                Some(value) => {
                    argument.parse_value(value)?;
                    Ok(ClusterStep::Done {
                        consumed_next: true,
                    })
                }
                None => Ok(ClusterStep::Done {
                    consumed_next: false,
                }),
            };
        }
        Ok(ClusterStep::Done {
            consumed_next: false,
        })
    }

    fn validate(&self) -> ParseOutcome {
        let mut failures = Vec::new();

        for argument in self.arguments.values() {
            if !argument.has_enough_values() {
                failures.push(ValidationFailure::TooFewValues {
                    name: argument.long_name().to_string(),
                    min: argument.min_values().unwrap_or(0),
                    actual: argument.count(),
                });
            }
        }

        for argument in self.arguments.values() {
            if argument.is_initialized()
                || argument.kind() == ArgKind::Bool
                || self.is_help_long(argument.long_name())
            {
                continue;
            }
            failures.push(ValidationFailure::MissingValue {
                name: argument.long_name().to_string(),
            });
        }

        if failures.is_empty() {
            return ParseOutcome::Valid;
        }
        let names: Vec<&str> = failures.iter().map(ValidationFailure::name).collect();
        debug!(?names, "validation failed");
        ParseOutcome::Invalid(failures)
    }
}
