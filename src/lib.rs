//! A tree-walking interpreter for Knight: every construct is a literal, a
//! global variable reference, or a fixed-arity prefix-form function
//! application. See each module for its piece of the pipeline: source text
//! → [`stream`] → [`parser`] → value tree → [`eval`] → side effects + value.

pub mod cli;
pub mod error;
pub mod eval;
pub mod host;
pub mod ident;
pub mod parser;
pub mod registry;
pub mod stream;
pub mod suggest;
pub mod value;

pub use error::KnightError;
pub use eval::run;
pub use host::{Host, SystemHost, TestHost};
pub use ident::{Environment, Identifier};
pub use value::Value;

/// Parses and runs a whole Knight program from source text, using a fresh
/// `Environment`. The entry point integration tests drive to exercise the
/// end-to-end scenarios against a scripted `Host`.
pub fn run_program(source: &str, host: &mut dyn Host) -> Result<Value, KnightError> {
    let mut env = Environment::new();
    let mut stream = stream::Stream::new(source);
    match parser::parse(&mut stream, &mut env)? {
        Some(value) => eval::run(&value, &mut env, host),
        None => Ok(Value::Null),
    }
}
