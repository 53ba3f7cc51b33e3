use std::{fmt::Display, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{get_line_at_position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A problem found in a source text, positioned by byte range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    severity: Severity,
    span: Span,
    file: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, file: &str) -> Self {
        Diagnostic {
            severity: kind.default_severity(),
            kind,
            span,
            file: file.to_string(),
        }
    }

    pub fn get_kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    pub fn get_span(&self) -> Span {
        self.span
    }

    /// `(start offset, length)` of the offending text.
    pub fn get_range(&self) -> (u32, u32) {
        (self.span.start, self.span.len())
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_file(&self) -> &str {
        &self.file
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::UnrecognisedToken { .. }
                | DiagnosticKind::UnterminatedString
                | DiagnosticKind::UnterminatedComment
                | DiagnosticKind::UnexpectedToken { .. }
                | DiagnosticKind::UnexpectedTokenDetailed { .. }
                | DiagnosticKind::UnexpectedEof { .. }
                | DiagnosticKind::NumberParseError { .. }
                | DiagnosticKind::MissingSeparator { .. }
                | DiagnosticKind::NestingTooDeep { .. }
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.kind {
            DiagnosticKind::UnrecognisedToken { .. } => "UnrecognisedToken",
            DiagnosticKind::UnterminatedString => "UnterminatedString",
            DiagnosticKind::UnterminatedComment => "UnterminatedComment",
            DiagnosticKind::UnexpectedToken { .. } => "UnexpectedToken",
            DiagnosticKind::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            DiagnosticKind::UnexpectedEof { .. } => "UnexpectedEof",
            DiagnosticKind::NumberParseError { .. } => "NumberParseError",
            DiagnosticKind::MissingSeparator { .. } => "MissingSeparator",
            DiagnosticKind::NestingTooDeep { .. } => "NestingTooDeep",
            DiagnosticKind::UnknownCommand { .. } => "UnknownCommand",
            DiagnosticKind::UnsupportedArity { .. } => "UnsupportedArity",
            DiagnosticKind::NoApplicableOverload { .. } => "NoApplicableOverload",
            DiagnosticKind::TypeMatchError { .. } => "TypeMatchError",
            DiagnosticKind::MissingCondition { .. } => "MissingCondition",
            DiagnosticKind::MissingBody { .. } => "MissingBody",
            DiagnosticKind::UndefinedVariable { .. } => "UndefinedVariable",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.kind {
            DiagnosticKind::UnrecognisedToken { .. } => ErrorTip::None,
            DiagnosticKind::UnterminatedString => {
                ErrorTip::Suggestion(String::from("Close the string with a matching quote"))
            }
            DiagnosticKind::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("Close the comment with `*/`"))
            }
            DiagnosticKind::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            DiagnosticKind::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            DiagnosticKind::UnexpectedEof { expected } => {
                ErrorTip::Suggestion(format!("Input ended while expecting {}", expected))
            }
            DiagnosticKind::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it a malformed hex literal?",
                token
            )),
            DiagnosticKind::MissingSeparator { .. } => ErrorTip::Suggestion(String::from(
                "Statements must be separated by `;` or `,`",
            )),
            DiagnosticKind::NestingTooDeep { .. } => ErrorTip::Suggestion(String::from(
                "Move inner parts into variables to flatten the nesting",
            )),
            DiagnosticKind::UnknownCommand { command } => ErrorTip::Suggestion(format!(
                "`{}` is not a known command; globals cannot take operands",
                command
            )),
            DiagnosticKind::UnsupportedArity { command, arity } => ErrorTip::Suggestion(format!(
                "`{}` exists but cannot be used as a {} command",
                command, arity
            )),
            DiagnosticKind::NoApplicableOverload {
                argument: Some(index),
                expected,
                received,
                ..
            } => ErrorTip::Suggestion(format!(
                "Argument {} should be `{}`, received `{}`",
                index, expected, received
            )),
            DiagnosticKind::NoApplicableOverload { .. } => ErrorTip::None,
            DiagnosticKind::TypeMatchError { expected, received } => ErrorTip::Suggestion(
                format!("Expected type `{}`, received `{}`", expected, received),
            ),
            DiagnosticKind::MissingCondition { construct } => {
                ErrorTip::Suggestion(format!("Add a condition to the `{}`", construct))
            }
            DiagnosticKind::MissingBody { construct } => {
                ErrorTip::Suggestion(format!("Add a `{{ }}` body to the `{}`", construct))
            }
            DiagnosticKind::UndefinedVariable { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` with `private` before reading it",
                variable
            )),
        }
    }

    /// Renders the diagnostic with the offending line and a caret marker.
    ///
    /// ```text
    /// error: unknown command "foobar" (UnknownCommand)
    /// -> init.sqf
    ///   |
    /// 1 | foobar 5;
    ///   | ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let (line, line_text, line_pos) = get_line_at_position(source, self.span.start);

        let line_str = line.to_string();
        let padding = line_str.len() + 2;

        let mut out = String::new();
        out.push_str(&format!(
            "{}: {} ({})\n",
            self.severity,
            self.message(),
            self.get_error_name()
        ));
        if let ErrorTip::Suggestion(tip) = self.get_tip() {
            out.push_str(&format!("{:>padding$} {}\n", "=", tip));
        }
        out.push_str(&format!("-> {}\n", self.file));
        out.push_str(&format!("{:>padding$}\n", "|"));

        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
        out.push_str(&format!("{} | {}\n", line_str, line_text_removed.trim_end()));

        // Columns count characters, not bytes
        let column = line_text
            .get(..line_pos)
            .map_or(line_pos, |prefix| prefix.chars().count());
        let marked = source
            .get(self.span.start as usize..self.span.end as usize)
            .map_or(self.span.len() as usize, |text| text.chars().count());

        let arrows = column.saturating_sub(removed_whitespace) + 1;
        let carets = "^".repeat(marked.max(1));
        let width = arrows + marked.max(1) - 1;
        out.push_str(&format!("{:>padding$} {:>width$}", "|", carets));

        out
    }
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file,
            self.span.start,
            self.span.len(),
            self.severity,
            self.kind
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name")]
pub enum DiagnosticKind {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("missing statement separator before {token:?}")]
    MissingSeparator { token: String },
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("unknown command {command:?}")]
    UnknownCommand { command: String },
    #[error("command {command:?} has no {arity} form")]
    UnsupportedArity { command: String, arity: String },
    #[error("no applicable overload for {command:?}{}", describe_argument(.argument, .expected, .received))]
    NoApplicableOverload {
        command: String,
        argument: Option<usize>,
        expected: String,
        received: String,
    },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("malformed {construct}: missing condition")]
    MissingCondition { construct: String },
    #[error("malformed {construct}: missing body")]
    MissingBody { construct: String },
    #[error("local variable {variable:?} is not defined")]
    UndefinedVariable { variable: String },
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::UndefinedVariable { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

fn describe_argument(argument: &Option<usize>, expected: &str, received: &str) -> String {
    match argument {
        Some(index) => format!(
            ": argument {} expected {}, received {}",
            index, expected, received
        ),
        None => String::new(),
    }
}

/// Rejected construction of a value type. Signals a defect in the caller,
/// never a problem with user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueTypeError {
    #[error("invalid argument: numOptionalValues is {0}, must be >= 0")]
    InvalidArgument(i64),
}

#[derive(Error, Debug)]
pub enum CommandTableError {
    #[error("malformed command descriptors: {0}")]
    Json(#[from] serde_json::Error),
    #[error("command {command:?}: unknown value type {type_name:?}")]
    UnknownType { command: String, type_name: String },
    #[error("command {command:?}: a syntax with a left operand needs a right operand")]
    MissingRightOperand { command: String },
    #[error("command {command:?}: optional value followed by a required one")]
    RequiredAfterOptional { command: String },
    #[error("command {command:?}: only the last array element may be unbounded")]
    UnboundedNotLast { command: String },
    #[error("command {command:?}: {source}")]
    ValueType {
        command: String,
        #[source]
        source: ValueTypeError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("module {module} has no root config (description.ext or config.cpp)")]
    RootConfigNotDefined { module: String },
    #[error("timed out after {waited:?} waiting for the source of module {module}")]
    Timeout { module: String, waited: Duration },
    #[error("failed to load module {module}: {message}")]
    Provider { module: String, message: String },
    #[error("module cache lock poisoned")]
    Poisoned,
}
