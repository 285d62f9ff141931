//! The Knight value model: a closed, seven-variant sum type with cross-kind
//! coercions and the arithmetic/comparison/container operations the function
//! registry dispatches to.
//!
//! Mirrors the shape of the teacher's `RuntimeValue` (plain owned data, one
//! `type_name`-style tag method, one conversion method per target kind) rather
//! than an arena-allocated AST: Knight's `Value` is both the parsed program
//! tree and the runtime value produced by evaluating it, so it lives outside
//! any single arena's lifetime.
//!
//! `String` is stored as a raw byte buffer (`Rc<[u8]>`), not `Rc<str>`: §3
//! calls it "an immutable byte sequence", and both `PROMPT` and `` ` `` can
//! hand the evaluator bytes that aren't a clean run of single-byte ASCII
//! (multi-byte UTF-8 text is a single Knight "String" but several Knight
//! "characters"). Every container/indexing op below (`head`/`tail`/`get`/
//! `set`/`to_list`) walks that buffer byte-by-byte so `LENGTH` and the valid
//! index range `GET`/`SET` honor always agree. Producing a `Rc<str>` (for
//! display, concatenation targets, coercion to Integer) happens only at the
//! edges, via lossy UTF-8 decoding.

use std::fmt;
use std::rc::Rc;

use crate::error::{KnightError, Op};
use crate::ident::Identifier;

/// A single function-application node: an opcode character plus its fixed-arity
/// argument subtrees. Immutable after construction (Invariant 2).
#[derive(Debug, Clone)]
pub struct FuncNode {
    pub op: char,
    pub args: Vec<Value>,
}

/// The uniform Knight value. Cloning is cheap: `String`/`List` payloads are
/// `Rc`-shared, so "producing a fresh instance" (Invariant 3) never implies a
/// deep copy on the read side — only constructors that actually change content
/// allocate a new `Rc`.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Str(Rc<[u8]>),
    Boolean(bool),
    Null,
    List(Rc<Vec<Value>>),
    Ident(Rc<Identifier>),
    Func(Rc<FuncNode>),
}

impl Value {
    pub fn str(s: impl AsRef<[u8]>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Str(_) => "String",
            Value::Boolean(_) => "Boolean",
            Value::Null => "Null",
            Value::List(_) => "List",
            Value::Ident(_) => "Identifier",
            Value::Func(_) => "Function",
        }
    }

    /// Whether this value is inert under `run` (everything but Identifier and
    /// Function node — see GLOSSARY).
    pub fn is_inert(&self) -> bool {
        !matches!(self, Value::Ident(_) | Value::Func(_))
    }

    // -- coercions -----------------------------------------------------

    pub fn to_integer(&self) -> Result<i64, KnightError> {
        Ok(match self {
            Value::Integer(n) => *n,
            Value::Str(s) => parse_leading_integer(s),
            Value::Boolean(b) => *b as i64,
            Value::Null => 0,
            Value::List(items) => items.len() as i64,
            Value::Ident(_) | Value::Func(_) => {
                return Err(KnightError::type_error("to_integer", self.type_name()))
            }
        })
    }

    pub fn to_boolean(&self) -> Result<bool, KnightError> {
        Ok(match self {
            Value::Integer(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null => false,
            Value::List(items) => !items.is_empty(),
            Value::Ident(_) | Value::Func(_) => {
                return Err(KnightError::type_error("to_boolean", self.type_name()))
            }
        })
    }

    /// Displayable string coercion. For `String` this lossily decodes the raw
    /// bytes (identity for the common case of valid UTF-8); for `List` it
    /// byte-joins elements via [`Value::string_coerce_bytes`] first and
    /// decodes once, so intermediate elements never round-trip through a
    /// lossy step more than necessary.
    pub fn to_knight_string(&self) -> Result<Rc<str>, KnightError> {
        Ok(match self {
            Value::Integer(n) => n.to_string().into(),
            Value::Str(s) => bytes_to_rc_str_lossy(s),
            Value::Boolean(b) => if *b { "true" } else { "false" }.into(),
            Value::Null => "".into(),
            Value::List(_) => bytes_to_rc_str_lossy(&self.string_coerce_bytes()?),
            Value::Ident(_) | Value::Func(_) => {
                return Err(KnightError::type_error("to_string", self.type_name()))
            }
        })
    }

    /// Raw-byte string coercion used internally by `add`/`pow`/`set` so that
    /// concatenating or joining `String`/`List` values never forces a lossy
    /// UTF-8 round trip on bytes that were never invalid to begin with.
    fn string_coerce_bytes(&self) -> Result<Vec<u8>, KnightError> {
        match self {
            Value::Str(s) => Ok(s.to_vec()),
            Value::List(items) => {
                let mut out = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b'\n');
                    }
                    out.extend(item.string_coerce_bytes()?);
                }
                Ok(out)
            }
            Value::Integer(_) | Value::Boolean(_) | Value::Null => {
                Ok(self.to_knight_string()?.as_bytes().to_vec())
            }
            Value::Ident(_) | Value::Func(_) => {
                Err(KnightError::type_error("to_string", self.type_name()))
            }
        }
    }

    pub fn to_knight_list(&self) -> Result<Rc<Vec<Value>>, KnightError> {
        Ok(match self {
            Value::Integer(n) => Rc::new(integer_to_digit_list(*n)),
            Value::Str(s) => Rc::new(s.iter().map(|&b| Value::Str(Rc::from(&[b][..]))).collect()),
            Value::Boolean(b) => {
                if *b {
                    Rc::new(vec![Value::Boolean(true)])
                } else {
                    Rc::new(Vec::new())
                }
            }
            Value::Null => Rc::new(Vec::new()),
            Value::List(items) => items.clone(),
            Value::Ident(_) | Value::Func(_) => {
                return Err(KnightError::type_error("to_list", self.type_name()))
            }
        })
    }

    /// The §6 `dump` representation — always terminal, never fails on any
    /// inert kind.
    pub fn dump(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Str(s) => dump_bytes(s),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::dump).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Ident(id) => format!("<identifier {}>", id.name),
            Value::Func(f) => format!("<function {}>", f.op),
        }
    }

    // -- arithmetic ------------------------------------------------------

    pub fn add(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer(a.wrapping_add(rhs.to_integer()?))),
            Value::Str(a) => {
                let mut bytes = a.to_vec();
                bytes.extend(rhs.string_coerce_bytes()?);
                Ok(Value::Str(Rc::from(bytes.as_slice())))
            }
            Value::List(a) => {
                let b = rhs.to_knight_list()?;
                let mut out = Vec::with_capacity(a.len() + b.len());
                out.extend(a.iter().cloned());
                out.extend(b.iter().cloned());
                Ok(Value::list(out))
            }
            _ => Err(KnightError::op_type_error(Op::Add, self.type_name())),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer(a.wrapping_sub(rhs.to_integer()?))),
            _ => Err(KnightError::op_type_error(Op::Sub, self.type_name())),
        }
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer(a.wrapping_mul(rhs.to_integer()?))),
            Value::Str(a) => {
                let n = rhs.to_integer()?;
                if n <= 0 {
                    return Ok(Value::str(""));
                }
                let mut bytes = Vec::with_capacity(a.len() * n as usize);
                for _ in 0..n {
                    bytes.extend_from_slice(a);
                }
                Ok(Value::Str(Rc::from(bytes.as_slice())))
            }
            Value::List(a) => {
                let n = rhs.to_integer()?;
                if n <= 0 {
                    return Ok(Value::list(Vec::new()));
                }
                let mut out = Vec::with_capacity(a.len() * n as usize);
                for _ in 0..n {
                    out.extend(a.iter().cloned());
                }
                Ok(Value::list(out))
            }
            _ => Err(KnightError::op_type_error(Op::Mul, self.type_name())),
        }
    }

    pub fn div(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => {
                let b = rhs.to_integer()?;
                if b == 0 {
                    return Err(KnightError::DivideByZero);
                }
                Ok(Value::Integer(a.wrapping_div(b)))
            }
            _ => Err(KnightError::op_type_error(Op::Div, self.type_name())),
        }
    }

    pub fn modulo(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => {
                let b = rhs.to_integer()?;
                if b == 0 {
                    return Err(KnightError::ModuloByZero);
                }
                Ok(Value::Integer(a.wrapping_rem(b)))
            }
            _ => Err(KnightError::op_type_error(Op::Mod, self.type_name())),
        }
    }

    pub fn pow(&self, rhs: &Value) -> Result<Value, KnightError> {
        match self {
            Value::Integer(a) => {
                let b = rhs.to_integer()?;
                Ok(Value::Integer(integer_pow(*a, b)))
            }
            Value::List(a) => {
                let sep = rhs.string_coerce_bytes()?;
                let mut out = Vec::new();
                for (i, item) in a.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(&sep);
                    }
                    out.extend(item.string_coerce_bytes()?);
                }
                Ok(Value::Str(Rc::from(out.as_slice())))
            }
            _ => Err(KnightError::op_type_error(Op::Pow, self.type_name())),
        }
    }

    /// Total order within `self`'s kind; `other` is coerced to that kind first.
    pub fn cmp(&self, other: &Value) -> Result<std::cmp::Ordering, KnightError> {
        use std::cmp::Ordering;
        match self {
            Value::Integer(a) => Ok(a.cmp(&other.to_integer()?)),
            Value::Str(a) => Ok(a.as_ref().cmp(other.string_coerce_bytes()?.as_slice())),
            Value::Boolean(a) => Ok(a.cmp(&other.to_boolean()?)),
            Value::List(a) => {
                let b = other.to_knight_list()?;
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.cmp(y)? {
                        Ordering::Equal => continue,
                        ord => return Ok(ord),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(KnightError::op_type_error(Op::Cmp, self.type_name())),
        }
    }

    /// Structural equality (§4.2): same kind and same contents; Identifier and
    /// Function nodes use identity equality.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Ident(a), Value::Ident(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // -- container ops ---------------------------------------------------
    //
    // `String`'s ops all index `s` as raw bytes, matching `to_knight_list`'s
    // one-byte-per-element split and the length `LENGTH` reports — never
    // `chars()`, which would count and cut at Unicode scalar boundaries
    // instead.

    pub fn head(&self) -> Result<Value, KnightError> {
        match self {
            Value::Str(s) => s
                .first()
                .map(|&b| Value::Str(Rc::from(&[b][..])))
                .ok_or(KnightError::EmptyContainer { op: "HEAD" }),
            Value::List(items) => items
                .first()
                .cloned()
                .ok_or(KnightError::EmptyContainer { op: "HEAD" }),
            _ => Err(KnightError::op_type_error(Op::Head, self.type_name())),
        }
    }

    pub fn tail(&self) -> Result<Value, KnightError> {
        match self {
            Value::Str(s) => {
                if s.is_empty() {
                    return Err(KnightError::EmptyContainer { op: "TAIL" });
                }
                Ok(Value::Str(Rc::from(&s[1..])))
            }
            Value::List(items) => {
                if items.is_empty() {
                    return Err(KnightError::EmptyContainer { op: "TAIL" });
                }
                Ok(Value::list(items[1..].to_vec()))
            }
            _ => Err(KnightError::op_type_error(Op::Tail, self.type_name())),
        }
    }

    pub fn get(&self, start: i64, len: i64) -> Result<Value, KnightError> {
        let (start, len) = nonneg_range(start, len)?;
        match self {
            Value::Str(s) => {
                let end = (start + len).min(s.len());
                let start = start.min(s.len());
                Ok(Value::Str(Rc::from(&s[start..end])))
            }
            Value::List(items) => {
                let end = (start + len).min(items.len());
                let start = start.min(items.len());
                Ok(Value::list(items[start..end].to_vec()))
            }
            _ => Err(KnightError::op_type_error(Op::Get, self.type_name())),
        }
    }

    pub fn set(&self, start: i64, len: i64, replacement: &Value) -> Result<Value, KnightError> {
        let (start, len) = nonneg_range(start, len)?;
        match self {
            Value::Str(s) => {
                let start = start.min(s.len());
                let end = (start + len).min(s.len());
                let mid = replacement.string_coerce_bytes()?;
                let mut out = Vec::with_capacity(start + mid.len() + (s.len() - end));
                out.extend_from_slice(&s[..start]);
                out.extend(mid);
                out.extend_from_slice(&s[end..]);
                Ok(Value::Str(Rc::from(out.as_slice())))
            }
            Value::List(items) => {
                let start = start.min(items.len());
                let end = (start + len).min(items.len());
                let mid = replacement.to_knight_list()?;
                let mut out = Vec::with_capacity(start + mid.len() + (items.len() - end));
                out.extend(items[..start].iter().cloned());
                out.extend(mid.iter().cloned());
                out.extend(items[end..].iter().cloned());
                Ok(Value::list(out))
            }
            _ => Err(KnightError::op_type_error(Op::Set, self.type_name())),
        }
    }

    pub fn ascii(&self) -> Result<Value, KnightError> {
        match self {
            Value::Integer(n) => {
                let byte = (*n & 0xFF) as u8;
                Ok(Value::Str(Rc::from(&[byte][..])))
            }
            Value::Str(s) => s
                .first()
                .map(|&b| Value::Integer(b as i64))
                .ok_or(KnightError::EmptyContainer { op: "ASCII" }),
            _ => Err(KnightError::op_type_error(Op::Ascii, self.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_knight_string() {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

/// `start > length` clamps to append rather than erroring (§4.2).
fn nonneg_range(start: i64, len: i64) -> Result<(usize, usize), KnightError> {
    if start < 0 || len < 0 {
        return Err(KnightError::NegativeIndex);
    }
    Ok((start as usize, len as usize))
}

fn integer_pow(base: i64, exp: i64) -> i64 {
    if exp < 0 {
        return 0;
    }
    let mut result: i64 = 1;
    let mut base = base;
    let mut exp = exp as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    result
}

fn integer_to_digit_list(n: i64) -> Vec<Value> {
    if n == 0 {
        return vec![Value::Integer(0)];
    }
    let mut digits = Vec::new();
    let mut n = n.unsigned_abs();
    while n > 0 {
        digits.push(Value::Integer((n % 10) as i64));
        n /= 10;
    }
    digits.reverse();
    digits
}

/// §3 String→Integer: leading whitespace, optional sign, greedy decimal digits;
/// otherwise 0. Scientific notation is explicitly not recognized. Operates
/// directly on raw bytes so it never needs the buffer to be valid UTF-8.
fn parse_leading_integer(bytes: &[u8]) -> i64 {
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let neg = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };
    let digit_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if digit_start == i {
        return 0;
    }
    // Only ASCII digit bytes fall in this range, so the slice is always valid UTF-8.
    let digits = std::str::from_utf8(&bytes[digit_start..i]).expect("ascii digits are valid utf-8");
    let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
    if neg {
        -magnitude
    } else {
        magnitude
    }
}

fn bytes_to_rc_str_lossy(bytes: &[u8]) -> Rc<str> {
    Rc::from(String::from_utf8_lossy(bytes).as_ref())
}

fn dump_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'\r' => out.push_str("\\r"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b => out.push(b as char),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_to_list_zero() {
        let v = Value::Integer(0);
        let list = v.to_knight_list().unwrap();
        assert_eq!(list.len(), 1);
        assert!(matches!(list[0], Value::Integer(0)));
    }

    #[test]
    fn integer_to_list_multi_digit() {
        let v = Value::Integer(4321);
        let list = v.to_knight_list().unwrap();
        let digits: Vec<i64> = list
            .iter()
            .map(|d| match d {
                Value::Integer(n) => *n,
                _ => panic!("expected integer digit"),
            })
            .collect();
        assert_eq!(digits, vec![4, 3, 2, 1]);
    }

    #[test]
    fn string_to_integer_parses_leading_digits() {
        assert_eq!(Value::str("  -42abc").to_integer().unwrap(), -42);
        assert_eq!(Value::str("junk").to_integer().unwrap(), 0);
        assert_eq!(Value::str("3.14").to_integer().unwrap(), 3);
        assert_eq!(Value::str("1e10").to_integer().unwrap(), 1);
    }

    #[test]
    fn boolean_coercions() {
        assert_eq!(Value::Boolean(true).to_knight_string().unwrap().as_ref(), "true");
        assert_eq!(Value::Boolean(false).to_integer().unwrap(), 0);
        assert!(Value::Boolean(true).to_knight_list().unwrap().len() == 1);
        assert!(Value::Boolean(false).to_knight_list().unwrap().is_empty());
    }

    #[test]
    fn null_coercions() {
        assert_eq!(Value::Null.to_integer().unwrap(), 0);
        assert!(!Value::Null.to_boolean().unwrap());
        assert_eq!(Value::Null.to_knight_string().unwrap().as_ref(), "");
        assert!(Value::Null.to_knight_list().unwrap().is_empty());
        assert_eq!(Value::Null.dump(), "null");
    }

    #[test]
    fn list_join_via_pow() {
        let list = Value::list(vec![Value::str("a"), Value::str("b"), Value::str("c")]);
        let joined = list.pow(&Value::str(",")).unwrap();
        assert_eq!(joined.to_knight_string().unwrap().as_ref(), "a,b,c");
    }

    #[test]
    fn division_and_modulo_by_zero_error() {
        assert!(Value::Integer(4).div(&Value::Integer(0)).is_err());
        assert!(Value::Integer(4).modulo(&Value::Integer(0)).is_err());
    }

    #[test]
    fn negative_exponent_truncates_to_zero() {
        assert_eq!(
            Value::Integer(2).pow(&Value::Integer(-1)).unwrap().to_integer().unwrap(),
            0
        );
    }

    #[test]
    fn equals_is_structural_for_lists() {
        let a = Value::list(vec![Value::Integer(1), Value::Integer(2)]);
        let b = Value::list(vec![Value::Integer(1), Value::Integer(2)]);
        assert!(a.equals(&b));
    }

    #[test]
    fn comparison_totality_holds_for_integers() {
        for (a, b) in [(1, 2), (5, 5), (-3, 7)] {
            let va = Value::Integer(a);
            let vb = Value::Integer(b);
            let lt = va.cmp(&vb).unwrap() == std::cmp::Ordering::Less;
            let eq = va.equals(&vb);
            let gt = vb.cmp(&va).unwrap() == std::cmp::Ordering::Less;
            assert_eq!([lt, eq, gt].iter().filter(|x| **x).count(), 1);
        }
    }

    #[test]
    fn ascii_masks_to_low_byte() {
        let v = Value::Integer(-1);
        assert_eq!(v.ascii().unwrap().to_knight_string().unwrap().as_ref(), "\u{ff}");
    }

    #[test]
    fn set_clamps_out_of_range_start_to_append() {
        let s = Value::str("abc");
        let out = s.set(10, 0, &Value::str("xyz")).unwrap();
        assert_eq!(out.to_knight_string().unwrap().as_ref(), "abcxyz");
    }

    #[test]
    fn dump_string_escapes_special_characters() {
        let v = Value::str("a\n\"b\\c");
        assert_eq!(v.dump(), "\"a\\n\\\"b\\\\c\"");
    }

    #[test]
    fn string_to_list_is_byte_indexed_not_char_indexed() {
        // "é" is one Unicode scalar but two UTF-8 bytes (0xC3 0xA9); §3 calls
        // String a byte sequence, so to_list must yield two elements, and
        // LENGTH must agree with that split.
        let s = Value::str("é");
        let list = s.to_knight_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(s.to_integer().is_ok(), true);
        assert_eq!(Value::str("é").to_knight_list().unwrap().len(), "é".len());
    }

    #[test]
    fn string_to_list_round_trips_multibyte_utf8_via_pow() {
        let original = "héllo wörld";
        let list = Value::str(original).to_knight_list().unwrap();
        let joined = Value::list((*list).clone()).pow(&Value::str("")).unwrap();
        assert_eq!(joined.to_knight_string().unwrap().as_ref(), original);
    }

    #[test]
    fn head_of_multibyte_string_returns_first_byte_not_first_char() {
        let s = Value::str("é"); // 0xC3 0xA9
        match s.head().unwrap() {
            Value::Str(bytes) => assert_eq!(bytes.as_ref(), &[0xC3]),
            other => panic!("expected Str, got {other:?}"),
        }
    }

    #[test]
    fn length_agrees_with_get_and_set_index_range_for_multibyte_strings() {
        let s = Value::str("café"); // 5 bytes, 4 chars
        let len = s.to_integer().unwrap();
        assert_eq!(len, 5);
        // GET of the full byte range returns the whole string unchanged.
        let whole = s.get(0, len).unwrap();
        assert_eq!(whole.to_knight_string().unwrap().as_ref(), "café");
    }
}
