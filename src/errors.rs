/*!
  The error taxonomy. Every failure class is a distinct enum so the caller
  can tell a malformed source program from a malformed instruction file from
  a runtime fault; all of them compose into the top-level [`Error`] the
  command line driver reports. Nothing is retried anywhere: the system is
  batch and fail-fast.
*/

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::address::{Register, Variable};
use crate::bytecode::Operation;

/// The front end found a symbol no grammar alternative accepts. Fatal; the
/// front end has no error recovery.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SyntaxError {
  #[error("{production}: unexpected symbol `{symbol}` at column {column}")]
  UnexpectedSymbol {
    production : &'static str,
    symbol     : char,
    column     : usize
  },

  /// Input ended where the grammar still required a token. A well-formed
  /// program ends at `!`, so the cursor never runs off the end.
  #[error("{production}: unexpected end of input before `!`")]
  UnexpectedEnd { production: &'static str },
}

/// A line of an instruction file does not match any opcode's textual shape.
/// Blank lines are not errors; lines that attempt an instruction are never
/// silently skipped.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum EncodingError {
  /// The mnemonic names none of the ten opcodes. This is also where an
  /// illegal opcode is caught: past the decoder, the instruction type can
  /// only represent the ten legal operations.
  #[error("line {line}: unknown instruction `{mnemonic}`")]
  UnknownMnemonic { line: usize, mnemonic: String },

  /// The mnemonic is known but the operand fields do not match its shape.
  #[error("line {line}: malformed {operation} instruction: `{text}`")]
  MalformedOperands {
    line      : usize,
    operation : Operation,
    text      : String
  },
}

/// A fault while executing a decoded program. Already-applied effects are
/// not rolled back.
#[derive(Debug, Error)]
pub enum RuntimeError {
  /// The program names a register beyond the machine's register file.
  #[error("register {0} is beyond the register file capacity")]
  RegisterOutOfRange(Register),

  /// The console could not supply a usable value for a `READ`. This is a
  /// caller-input failure, not a machine fault.
  #[error("invalid input for \"{var}\": {reason}")]
  Input { var: Variable, reason: String },

  #[error(transparent)]
  Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("syntax error: {0}")]
  Syntax(#[from] SyntaxError),

  #[error("encoding error: {0}")]
  Encoding(#[from] EncodingError),

  #[error("runtime error: {0}")]
  Runtime(#[from] RuntimeError),

  #[error("cannot open \"{path}\": {source}")]
  File { path: String, source: io::Error },
}

impl Error {
  /// Wraps an I/O failure with the path it happened on.
  pub fn file(path: &Path, source: io::Error) -> Error {
    Error::File {
      path: path.display().to_string(),
      source
    }
  }
}
