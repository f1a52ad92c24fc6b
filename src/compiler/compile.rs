/*!
  Functions to produce a compilation artifact from source code input. The
  pipeline is short: the text goes through the parser exactly once, and the
  instructions fall out the other side already in execution order.

  ```text
  text -> [`Parser::parse`] -> `Program`
  ```
*/

use std::time::Instant;

use tracing::debug;

use crate::bytecode::Program;
use crate::errors::SyntaxError;
use super::parser::Parser;

/// A `Compilation` is the result of `Compilation::compile(source)`: the
/// emitted instruction sequence plus bookkeeping about the register space it
/// uses.
pub struct Compilation {
  pub program        : Program,
  /// Number of virtual registers the program allocates. Register ids run
  /// from 1 through this count.
  pub registers_used : usize
}

impl Compilation {

  /// Compiles a complete tinyL program. The first malformed symbol aborts
  /// the compilation; no partial instruction sequence survives the error.
  pub fn compile(text: &str) -> Result<Compilation, SyntaxError> {
    let compilation_time = Instant::now();

    let (program, registers_used) = Parser::new(text).parse()?;

    debug!(
      instructions = program.len(),
      registers    = registers_used,
      elapsed      = ?compilation_time.elapsed(),
      "compiled tinyL program"
    );

    Ok(Compilation { program, registers_used })
  }
}
