use thiserror::Error;

use crate::value::ArgKind;

/// Errors raised while configuring a parser, parsing tokens or reading values.
///
/// Configuration and retrieval errors surface at the call that caused them.
/// `UnknownArgument` and `ValueFormat` abort a parse; values stored before the
/// failing token stay in place but should not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// Builder misuse: a modifier with no argument configured, or a modifier
    /// whose value type does not match the argument's kind.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A long or short name was registered twice.
    #[error("configuration error: argument name '{0}' is already registered")]
    DuplicateName(String),

    /// A token named an option that was never registered.
    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    /// A token could not be converted to the argument's kind.
    #[error("invalid value '{value}' for '--{name}': expected {kind}")]
    ValueFormat {
        name: String,
        value: String,
        kind: ArgKind,
    },

    /// A lookup named an argument that was never registered.
    #[error("argument not found: {0}")]
    NotFound(String),

    /// A typed read or modifier used a type other than the argument's kind.
    #[error("type mismatch for '--{name}': declared {declared}, requested {requested}")]
    TypeMismatch {
        name: String,
        declared: ArgKind,
        requested: ArgKind,
    },

    /// An indexed read went past the end of a multi-value sequence.
    #[error("index {index} out of range for '--{name}' ({len} values)")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

impl ArgError {
    pub(crate) fn no_argument_configured() -> Self {
        Self::Configuration("no argument configured".to_string())
    }

    /// Whether this error belongs to the configuration class (builder misuse).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::DuplicateName(_))
    }

    /// Whether this error aborts a parse.
    pub fn is_fatal_parse_error(&self) -> bool {
        matches!(self, Self::UnknownArgument(_) | Self::ValueFormat { .. })
    }
}

pub type Result<T> = std::result::Result<T, ArgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_argument() {
        let err = ArgError::ValueFormat {
            name: "count".to_string(),
            value: "ten".to_string(),
            kind: ArgKind::Int,
        };
        assert_eq!(err.to_string(), "invalid value 'ten' for '--count': expected int");
        assert!(err.is_fatal_parse_error());

        let err = ArgError::no_argument_configured();
        assert_eq!(err.to_string(), "configuration error: no argument configured");
        assert!(err.is_configuration());
        assert!(!err.is_fatal_parse_error());
    }
}
