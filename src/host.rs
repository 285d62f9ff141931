//! The injected capability boundary: `PROMPT`, `RANDOM`, `` ` `` and `OUTPUT`/
//! `DUMP` reach the outside world through this trait rather than touching
//! `std::io`/`rand`/`std::process` directly from the evaluator, so tests can
//! substitute a scripted double.
//!
//! The teacher has no direct analogue for this seam (it calls `io::stdin`
//! inline in a couple of places); this module is an enrichment grounded in
//! the spec's own "injected capabilities" framing (§1, §10.4).

use std::io::{self, BufRead, Write};
use std::process::Command;

use rand::Rng;

pub trait Host {
    fn prompt_line(&mut self) -> io::Result<Option<String>>;
    fn random_u32(&mut self) -> u32;
    fn run_shell(&mut self, command: &str) -> io::Result<String>;
    fn write_out(&mut self, s: &str) -> io::Result<()>;
}

/// Production `Host`: buffered real stdin, the thread-local RNG, the
/// platform shell, and locked stdout.
pub struct SystemHost {
    stdin: io::BufReader<io::Stdin>,
}

impl SystemHost {
    pub fn new() -> Self {
        SystemHost { stdin: io::BufReader::new(io::stdin()) }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for SystemHost {
    fn prompt_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.stdin.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn random_u32(&mut self) -> u32 {
        rand::thread_rng().gen()
    }

    fn run_shell(&mut self, command: &str) -> io::Result<String> {
        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").arg("/C").arg(command).output()?
        } else {
            Command::new("sh").arg("-c").arg(command).output()?
        };
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn write_out(&mut self, s: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(s.as_bytes())?;
        stdout.flush()
    }
}

/// A scripted `Host` double: lines to hand back from `PROMPT`, a fixed RNG
/// sequence for `RANDOM`, a canned shell reply, and a captured output buffer.
/// Used by the integration tests to exercise §8's end-to-end scenarios
/// deterministically.
#[derive(Default)]
pub struct TestHost {
    pub input_lines: std::collections::VecDeque<String>,
    pub random_values: std::collections::VecDeque<u32>,
    pub shell_reply: String,
    pub output: String,
}

impl TestHost {
    pub fn with_lines(lines: &[&str]) -> Self {
        TestHost {
            input_lines: lines.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Host for TestHost {
    fn prompt_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input_lines.pop_front())
    }

    fn random_u32(&mut self) -> u32 {
        self.random_values.pop_front().unwrap_or(0)
    }

    fn run_shell(&mut self, _command: &str) -> io::Result<String> {
        Ok(self.shell_reply.clone())
    }

    fn write_out(&mut self, s: &str) -> io::Result<()> {
        self.output.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_feeds_scripted_lines() {
        let mut host = TestHost::with_lines(&["first", "second"]);
        assert_eq!(host.prompt_line().unwrap().as_deref(), Some("first"));
        assert_eq!(host.prompt_line().unwrap().as_deref(), Some("second"));
        assert_eq!(host.prompt_line().unwrap(), None);
    }

    #[test]
    fn test_host_captures_output() {
        let mut host = TestHost::default();
        host.write_out("hello").unwrap();
        host.write_out(" world").unwrap();
        assert_eq!(host.output, "hello world");
    }

    #[test]
    fn test_host_random_falls_back_to_zero() {
        let mut host = TestHost::default();
        assert_eq!(host.random_u32(), 0);
    }
}
