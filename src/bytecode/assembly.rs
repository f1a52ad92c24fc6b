/*!
  The decode half of the textual instruction format. Encoding is the
  `Display` impls on [`Instruction`] and [`Program`]; this module reads that
  text back, one line per instruction, using `nom` combinators for the
  operand fields. Decoding is stateless across lines except that each decoded
  instruction is appended to the program under assembly, so a decoded program
  executes in file line order.
*/

use std::str::FromStr;

use nom::{
  character::complete::{char as one_char, digit1, one_of, space1},
  combinator::{all_consuming, map, map_opt, map_res, opt, recognize},
  sequence::{pair, preceded, tuple},
  IResult
};
use tracing::debug;

use crate::address::{Register, Variable};
use crate::errors::EncodingError;
use super::{Instruction, Int, Operation, Program};

/// A register operand: `r<digits>`, numbered from 1.
fn register(input: &str) -> IResult<&str, Register> {
  map_opt(preceded(one_char('r'), digit1), |digits: &str| {
    match digits.parse::<usize>() {
      Ok(number) if number > 0 => Some(Register::new(number)),
      _                        => None
    }
  })(input)
}

/// The `LOADI` immediate operand: `#<integer>`.
fn immediate(input: &str) -> IResult<&str, Int> {
  map_res(
    preceded(one_char('#'), recognize(pair(opt(one_char('-')), digit1))),
    |digits: &str| digits.parse::<Int>()
  )(input)
}

/// A variable operand: one of the bare characters `a`..`f`.
fn variable(input: &str) -> IResult<&str, Variable> {
  map_opt(one_of("abcdef"), Variable::new)(input)
}

/**
  Decodes one line of an instruction file. Returns `Ok(None)` for a blank
  line, `Ok(Some(..))` for an instruction, and an [`EncodingError`] carrying
  `line_number` for anything else. The mnemonic selects the operand shape;
  a known mnemonic with misshapen, missing, or extra fields is rejected, not
  skipped.
*/
pub fn decode_line(line: &str, line_number: usize)
  -> Result<Option<Instruction>, EncodingError>
{
  let text = line.trim();
  if text.is_empty() {
    return Ok(None);
  }

  let mnemonic = text.split_whitespace().next().unwrap_or_default();
  let operation = Operation::from_str(mnemonic).map_err(|_| {
    EncodingError::UnknownMnemonic {
      line     : line_number,
      mnemonic : mnemonic.to_string()
    }
  })?;

  let operands = &text[mnemonic.len()..];
  let parsed: IResult<&str, Instruction> = match operation {

    Operation::Load => all_consuming(map(
      pair(preceded(space1, register), preceded(space1, variable)),
      |(dest, var)| Instruction::Load { dest, var }
    ))(operands),

    Operation::LoadI => all_consuming(map(
      pair(preceded(space1, register), preceded(space1, immediate)),
      |(dest, imm)| Instruction::LoadI { dest, imm }
    ))(operands),

    Operation::Store => all_consuming(map(
      pair(preceded(space1, variable), preceded(space1, register)),
      |(var, src)| Instruction::Store { var, src }
    ))(operands),

    | Operation::Add | Operation::Sub | Operation::Mul
    | Operation::Or  | Operation::And => all_consuming(map_opt(
      tuple((
        preceded(space1, register),
        preceded(space1, register),
        preceded(space1, register)
      )),
      |(dest, lhs, rhs)| operation.three_register(dest, lhs, rhs)
    ))(operands),

    Operation::Read => all_consuming(map(
      preceded(space1, variable),
      |var| Instruction::Read { var }
    ))(operands),

    Operation::Write => all_consuming(map(
      preceded(space1, variable),
      |var| Instruction::Write { var }
    ))(operands),

  };

  match parsed {
    Ok((_, instruction)) => Ok(Some(instruction)),
    Err(_)               => Err(EncodingError::MalformedOperands {
      line      : line_number,
      operation,
      text      : text.to_string()
    })
  }
}

/// Decodes a complete instruction file, appending each instruction in file
/// line order. The first malformed line aborts the decode.
pub fn decode_program(text: &str) -> Result<Program, EncodingError> {
  let mut program = Program::new();
  for (index, line) in text.lines().enumerate() {
    if let Some(instruction) = decode_line(line, index + 1)? {
      program.append(instruction);
    }
  }
  debug!(instructions = program.len(), "decoded instruction file");
  Ok(program)
}
