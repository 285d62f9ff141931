//! `parse(&mut Stream) -> Value`: one `strip()` then the seven parse rules of
//! §4.4, tried in a fixed order until one succeeds.
//!
//! Grounded on the teacher's general recursive-descent shape (the former
//! `lexer.rs`/`src/parser/*`, since removed as NLP-grammar-specific); arity-
//! driven recursive argument collection follows §4.4/§4.5 directly.

use std::rc::Rc;

use crate::error::KnightError;
use crate::ident::Environment;
use crate::registry;
use crate::stream::Stream;
use crate::value::{FuncNode, Value};

/// Parses one top-level value from `stream`, interning any identifiers it
/// encounters into `env`. Returns `Ok(None)` when the stream holds nothing
/// but whitespace/comments (an empty program, per §4.4's closing note).
pub fn parse(stream: &mut Stream, env: &mut Environment) -> Result<Option<Value>, KnightError> {
    stream.strip();
    if stream.is_empty() {
        return Ok(None);
    }
    parse_value(stream, env).map(Some)
}

fn parse_value(stream: &mut Stream, env: &mut Environment) -> Result<Value, KnightError> {
    stream.strip();
    let span = stream.span();

    if let Some(name) = stream.match_identifier() {
        let ident = env.intern(name);
        return Ok(Value::Ident(ident));
    }

    if let Some(digits) = stream.match_integer() {
        let n: i64 = digits.parse().map_err(|_| KnightError::Parse {
            message: format!("integer literal '{digits}' out of range"),
            span: Some(span),
        })?;
        return Ok(Value::Integer(n));
    }

    if let Some(body) = stream.match_string() {
        let body = body.map_err(|_| KnightError::Parse {
            message: "unterminated string literal".to_string(),
            span: Some(span),
        })?;
        return Ok(Value::str(body));
    }

    if let Some(b) = stream.match_boolean() {
        return Ok(Value::Boolean(b));
    }

    if stream.match_null().is_some() {
        return Ok(Value::Null);
    }

    if stream.match_list_literal().is_some() {
        return Ok(Value::list(Vec::new()));
    }

    if let Some(opcode) = stream.match_function_opcode() {
        let entry = registry::lookup(opcode).ok_or_else(|| {
            KnightError::unknown_function(&opcode.to_string(), Some(span))
        })?;
        let mut args = Vec::with_capacity(entry.arity);
        for _ in 0..entry.arity {
            stream.strip();
            if stream.is_empty() {
                return Err(KnightError::Parse {
                    message: format!(
                        "missing argument for '{}' (expected {})",
                        entry.name, entry.arity
                    ),
                    span: Some(stream.span()),
                });
            }
            args.push(parse_value(stream, env)?);
        }
        return Ok(Value::Func(Rc::new(FuncNode { op: opcode, args })));
    }

    Err(KnightError::Parse { message: "unexpected end of input".to_string(), span: Some(span) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(src: &str) -> Value {
        let mut env = Environment::new();
        let mut stream = Stream::new(src);
        parse(&mut stream, &mut env).unwrap().unwrap()
    }

    #[test]
    fn empty_program_parses_to_none() {
        let mut env = Environment::new();
        let mut stream = Stream::new("  # just a comment\n");
        assert!(parse(&mut stream, &mut env).unwrap().is_none());
    }

    #[test]
    fn integer_literal() {
        match parsed("123") {
            Value::Integer(123) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn identifier_interns_through_environment() {
        let mut env = Environment::new();
        let mut s1 = Stream::new("x");
        let mut s2 = Stream::new("x");
        let v1 = parse(&mut s1, &mut env).unwrap().unwrap();
        let v2 = parse(&mut s2, &mut env).unwrap().unwrap();
        match (v1, v2) {
            (Value::Ident(a), Value::Ident(b)) => assert!(Rc::ptr_eq(&a, &b)),
            _ => panic!("expected identifiers"),
        }
    }

    #[test]
    fn boolean_keyword_with_trailing_letters() {
        match parsed("TRUE") {
            Value::Boolean(true) => {}
            other => panic!("unexpected {other:?}"),
        }
        match parsed("FALS") {
            Value::Boolean(false) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn function_node_collects_arity_many_args() {
        match parsed("+ 1 2") {
            Value::Func(f) => {
                assert_eq!(f.op, '+');
                assert_eq!(f.args.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_opcode_errors() {
        let mut env = Environment::new();
        let mut stream = Stream::new("Z 1");
        let err = parse(&mut stream, &mut env).unwrap_err();
        assert!(matches!(err, KnightError::UnknownFunction { .. }));
    }

    #[test]
    fn missing_argument_errors() {
        let mut env = Environment::new();
        let mut stream = Stream::new("+ 1");
        let err = parse(&mut stream, &mut env).unwrap_err();
        assert!(matches!(err, KnightError::Parse { .. }));
    }

    #[test]
    fn unterminated_string_errors() {
        let mut env = Environment::new();
        let mut stream = Stream::new("\"oops");
        let err = parse(&mut stream, &mut env).unwrap_err();
        assert!(matches!(err, KnightError::Parse { .. }));
    }
}
