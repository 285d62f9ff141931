//! The evaluator: `run` is the identity on inert values, resolves Identifier
//! bindings, and for Function nodes dispatches on the opcode, running
//! whichever argument subtrees the operation's semantics call for.
//!
//! Grounded on the teacher's `execute_stmt`/`evaluate_expr` dispatch shape in
//! `interpreter.rs` — one large match over the node kind, with per-operation
//! helper methods for the binary arithmetic/comparison cases.

use tracing::trace;

use crate::error::KnightError;
use crate::host::Host;
use crate::ident::Environment;
use crate::parser;
use crate::stream::Stream;
use crate::value::Value;

/// Evaluates `value` against `env`, routing any effectful opcode through
/// `host`. Inert values return themselves; Identifier reads the bound value;
/// Function nodes invoke their registered operation.
pub fn run(value: &Value, env: &mut Environment, host: &mut dyn Host) -> Result<Value, KnightError> {
    match value {
        Value::Integer(_)
        | Value::Str(_)
        | Value::Boolean(_)
        | Value::Null
        | Value::List(_) => Ok(value.clone()),
        Value::Ident(id) => id.get(),
        Value::Func(f) => {
            trace!(opcode = %f.op, arity = f.args.len(), "dispatch");
            dispatch(f.op, &f.args, env, host)
        }
    }
}

fn dispatch(
    op: char,
    args: &[Value],
    env: &mut Environment,
    host: &mut dyn Host,
) -> Result<Value, KnightError> {
    match op {
        'P' => match host.prompt_line().map_err(|e| KnightError::Io(e.to_string()))? {
            Some(line) => Ok(Value::str(line)),
            None => Ok(Value::Null),
        },
        'R' => Ok(Value::Integer(host.random_u32() as i64)),

        'E' => {
            let src = run(&args[0], env, host)?.to_knight_string()?;
            let mut stream = Stream::new(&src);
            let parsed = parser::parse(&mut stream, env)?
                .ok_or_else(|| KnightError::Parse { message: "EVAL of empty source".into(), span: None })?;
            run(&parsed, env, host)
        }
        'B' => Ok(args[0].clone()),
        'C' => {
            let once = run(&args[0], env, host)?;
            run(&once, env, host)
        }
        '`' => {
            let cmd = run(&args[0], env, host)?.to_knight_string()?;
            let out = host.run_shell(&cmd).map_err(|e| KnightError::Io(e.to_string()))?;
            Ok(Value::str(out))
        }
        'Q' => {
            let code = run(&args[0], env, host)?.to_integer()?;
            Err(KnightError::Quit(code as i32))
        }
        '!' => {
            let b = run(&args[0], env, host)?.to_boolean()?;
            Ok(Value::Boolean(!b))
        }
        '~' => {
            let n = run(&args[0], env, host)?.to_integer()?;
            Ok(Value::Integer(n.wrapping_neg()))
        }
        'A' => run(&args[0], env, host)?.ascii(),
        'L' => {
            let list = run(&args[0], env, host)?.to_knight_list()?;
            Ok(Value::Integer(list.len() as i64))
        }
        'D' => {
            let v = run(&args[0], env, host)?;
            host.write_out(&v.dump()).map_err(|e| KnightError::Io(e.to_string()))?;
            Ok(v)
        }
        'O' => {
            let s = run(&args[0], env, host)?.to_knight_string()?;
            if let Some(stripped) = s.strip_suffix('\\') {
                host.write_out(stripped).map_err(|e| KnightError::Io(e.to_string()))?;
            } else {
                host.write_out(&s).map_err(|e| KnightError::Io(e.to_string()))?;
                host.write_out("\n").map_err(|e| KnightError::Io(e.to_string()))?;
            }
            Ok(Value::Null)
        }
        ',' => {
            let v = run(&args[0], env, host)?;
            Ok(Value::list(vec![v]))
        }
        '[' => run(&args[0], env, host)?.head(),
        ']' => run(&args[0], env, host)?.tail(),

        '+' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.add(&rhs)
        }
        '-' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.sub(&rhs)
        }
        '*' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.mul(&rhs)
        }
        '/' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.div(&rhs)
        }
        '%' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.modulo(&rhs)
        }
        '^' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            lhs.pow(&rhs)
        }
        '<' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            Ok(Value::Boolean(lhs.cmp(&rhs)? == std::cmp::Ordering::Less))
        }
        '>' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            Ok(Value::Boolean(lhs.cmp(&rhs)? == std::cmp::Ordering::Greater))
        }
        '?' => {
            let lhs = run(&args[0], env, host)?;
            let rhs = run(&args[1], env, host)?;
            Ok(Value::Boolean(lhs.equals(&rhs)))
        }
        '&' => {
            let lhs = run(&args[0], env, host)?;
            if !lhs.to_boolean()? {
                Ok(lhs)
            } else {
                run(&args[1], env, host)
            }
        }
        '|' => {
            let lhs = run(&args[0], env, host)?;
            if lhs.to_boolean()? {
                Ok(lhs)
            } else {
                run(&args[1], env, host)
            }
        }
        ';' => {
            run(&args[0], env, host)?;
            run(&args[1], env, host)
        }
        'W' => {
            while run(&args[0], env, host)?.to_boolean()? {
                run(&args[1], env, host)?;
            }
            Ok(Value::Null)
        }
        '=' => {
            let ident = match &args[0] {
                Value::Ident(id) => id.clone(),
                other => {
                    let name = run(other, env, host)?.to_knight_string()?;
                    env.intern(&name)
                }
            };
            let value = run(&args[1], env, host)?;
            ident.set(value.clone());
            Ok(value)
        }

        'I' => {
            let cond = run(&args[0], env, host)?.to_boolean()?;
            if cond {
                run(&args[1], env, host)
            } else {
                run(&args[2], env, host)
            }
        }
        'G' => {
            let container = run(&args[0], env, host)?;
            let start = run(&args[1], env, host)?.to_integer()?;
            let len = run(&args[2], env, host)?.to_integer()?;
            container.get(start, len)
        }
        'S' => {
            let container = run(&args[0], env, host)?;
            let start = run(&args[1], env, host)?.to_integer()?;
            let len = run(&args[2], env, host)?.to_integer()?;
            let replacement = run(&args[3], env, host)?;
            container.set(start, len, &replacement)
        }

        // The parser only ever builds a Function node for an opcode that
        // `registry::lookup` accepted, so every reachable opcode is handled
        // above; this arm exists solely to keep the match exhaustive.
        other => Err(KnightError::unknown_function(&other.to_string(), None)),
    }
}
