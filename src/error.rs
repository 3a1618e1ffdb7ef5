//! Error types for parsing and execution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::{floor_char_boundary, Location, Span};

/// A diagnostic produced while parsing a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The scanner rejected the input
    #[error("{location}: Lexical Error - {message}")]
    Lexical { location: Location, message: String },

    /// The tokens do not fit the grammar, or block tags are unbalanced
    #[error("{location}: {message}")]
    Syntax { location: Location, message: String },
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::Lexical { location, .. } | ParseError::Syntax { location, .. } => location,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Lexical { message, .. } | ParseError::Syntax { message, .. } => message,
        }
    }

    /// Byte range of the offending char within `source`
    pub fn span(&self, source: &str) -> Span {
        let start = floor_char_boundary(source, self.location().offset);
        let width = source[start..].chars().next().map_or(0, char::len_utf8);
        start..start + width
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str) -> String {
        let filename = self.location().source_name.as_str();
        let bytes = self.span(source);
        // ariadne counts in chars
        let start = source[..bytes.start].chars().count();
        let span = start..start + source[bytes].chars().count();

        let title = match self {
            ParseError::Lexical { message, .. } => format!("Lexical Error - {}", message),
            ParseError::Syntax { message, .. } => message.clone(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&title)
            .with_label(
                Label::new((filename, span))
                    .with_message(self.message())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Errors that abort the execution of a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// No handler for a plain tag, and no default handler
    #[error("{location}: Exec error - Handler not defined for tag: {tag}")]
    HandlerNotDefined { tag: String, location: Location },

    #[error("Block Handler not defined for tag: {tag}")]
    BlockHandlerNotDefined { tag: String },

    /// A bound method table has no method for the first dot command
    #[error("Undefined method '{method}' for {tag} handler")]
    UndefinedMethod { method: String, tag: String },

    /// A method was called with the wrong number of arguments
    #[error("Method '{method}' takes {expected} argument(s), got {given}")]
    MethodArity {
        method: String,
        expected: usize,
        given: usize,
    },

    /// Failure reported by a caller-supplied handler
    #[error("{message}")]
    Handler { message: String },
}

impl ExecError {
    /// Create a handler failure
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}
