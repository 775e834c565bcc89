//! Typed command-line argument declaration and parsing.
//!
//! A host program declares its arguments on an [`ArgParser`] (string, int
//! or bool; optionally positional, multi-value, defaulted or bound to caller
//! storage), parses a token list, and reads typed values back by long or
//! short name.
//!
//! Grammar, left to right:
//! - `--name=value`, `--name value`, `--flag`
//! - `-abc` (a cluster of flags), `-o value`, `-o=value`; a value-taking
//!   option only takes the next token when it ends its cluster
//! - bare tokens fill positional arguments in registration order; a
//!   multi-value positional absorbs every remaining bare token.

mod argument;
mod error;
mod help;
mod parser;
mod value;

pub use argument::Argument;
pub use error::{ArgError, Result};
pub use parser::{ArgNames, ArgParser, Key, ParseOutcome, ValidationFailure};
pub use value::{ArgKind, ArgValue, Sequence, Slot, TypedCell, Value, ValueCell};
