//! Fatal-error reporting: a single `KnightError` enum covering parse, name,
//! type, domain and I/O failures, plus source-line+caret rendering for the
//! ones that carry a position.
//!
//! Grounded on the teacher's `error.rs` (`ParseError`/`display_with_source`/
//! `find_context`), with the ANSI `Style` layer dropped — that module was
//! filtered out of the retrieved pack, so diagnostics render as plain text.

use std::fmt;

use crate::suggest::find_similar;

/// The binary/unary operation an error occurred inside, used for the
/// op-type-error constructor so each opcode only has to name itself once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Cmp,
    Head,
    Tail,
    Get,
    Set,
    Ascii,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::Pow => "^",
            Op::Cmp => "<=>",
            Op::Head => "HEAD",
            Op::Tail => "TAIL",
            Op::Get => "GET",
            Op::Set => "SET",
            Op::Ascii => "ASCII",
        }
    }
}

/// A zero-width position in the source stream, used to anchor diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub line: usize,
}

impl Span {
    pub fn new(offset: usize, line: usize) -> Self {
        Span { offset, line }
    }
}

#[derive(Debug)]
pub enum KnightError {
    /// Stream exhausted or malformed syntax while parsing.
    Parse { message: String, span: Option<Span> },
    /// `UNKNOWN_OPCODE` with no registry entry; carries a "did you mean" hint
    /// when a close match exists.
    UnknownFunction { opcode: String, suggestion: Option<String>, span: Option<Span> },
    /// Reading an unbound identifier.
    Undefined { name: String },
    /// An operation applied to a value of the wrong kind.
    TypeError { context: String, kind: &'static str },
    DivideByZero,
    ModuloByZero,
    NegativeIndex,
    EmptyContainer { op: &'static str },
    /// A `Host` I/O capability failed (file read, shell spawn, ...).
    Io(String),
    /// `QUIT` was evaluated; carries the process exit code.
    Quit(i32),
}

impl KnightError {
    pub fn type_error(context: &str, kind: &'static str) -> Self {
        KnightError::TypeError { context: context.to_string(), kind }
    }

    pub fn op_type_error(op: Op, kind: &'static str) -> Self {
        KnightError::TypeError { context: op.name().to_string(), kind }
    }

    pub fn unknown_function(opcode: &str, span: Option<Span>) -> Self {
        let suggestion = find_similar(opcode, crate::suggest::KNOWN_WORDS, 2).map(str::to_string);
        KnightError::UnknownFunction { opcode: opcode.to_string(), suggestion, span }
    }

    /// Render with the offending source line and a caret, when a span is
    /// available; falls back to the bare message otherwise.
    pub fn display_with_source(&self, source: &str) -> String {
        let (header, span) = match self {
            KnightError::Parse { message, span } => (message.clone(), *span),
            KnightError::UnknownFunction { opcode, suggestion, span } => {
                let mut msg = format!("unknown function '{opcode}'");
                if let Some(s) = suggestion {
                    msg.push_str(&format!(" (did you mean '{s}'?)"));
                }
                (msg, *span)
            }
            other => return other.to_string(),
        };
        match span {
            Some(span) => format!("{header}\n{}", render_context(source, span)),
            None => header,
        }
    }
}

fn render_context(source: &str, span: Span) -> String {
    let line_content = source.lines().nth(span.line).unwrap_or("");
    let col = span.offset.saturating_sub(line_offset(source, span.line));
    let mut out = format!(" {:>4} | {}\n", span.line + 1, line_content);
    out.push_str(&format!("      | {}^", " ".repeat(col)));
    out
}

fn line_offset(source: &str, line: usize) -> usize {
    source.lines().take(line).map(|l| l.len() + 1).sum()
}

impl fmt::Display for KnightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnightError::Parse { message, .. } => write!(f, "parse error: {message}"),
            KnightError::UnknownFunction { opcode, suggestion, .. } => {
                write!(f, "unknown function '{opcode}'")?;
                if let Some(s) = suggestion {
                    write!(f, " (did you mean '{s}'?)")?;
                }
                Ok(())
            }
            KnightError::Undefined { name } => write!(f, "undefined identifier '{name}'"),
            KnightError::TypeError { context, kind } => {
                write!(f, "type error: '{context}' does not accept {kind}")
            }
            KnightError::DivideByZero => write!(f, "division by zero"),
            KnightError::ModuloByZero => write!(f, "modulo by zero"),
            KnightError::NegativeIndex => write!(f, "negative index or length"),
            KnightError::EmptyContainer { op } => write!(f, "{op} of an empty container"),
            KnightError::Io(msg) => write!(f, "io error: {msg}"),
            KnightError::Quit(code) => write!(f, "quit({code})"),
        }
    }
}

impl std::error::Error for KnightError {}
