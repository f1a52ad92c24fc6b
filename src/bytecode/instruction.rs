use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString};

use crate::address::{Register, Variable};

/// The machine's native word. Arithmetic on it wraps on overflow (two's
/// complement); see the execution loop.
pub type Int = i64;

/**
  Opcodes of the virtual machine.

  The `strum` derives define the opcode <-> mnemonic mapping used by the
  assembly reader and writer: the mnemonic is the variant name uppercased
  (`LoadI` -> `LOADI`), and mnemonics are matched case-insensitively on the
  way in.
*/
#[derive(
  StrumDisplay, EnumString,
  Clone, Copy, Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Operation {
  Load,   // dest <- variable
  LoadI,  // dest <- immediate
  Store,  // variable <- src register
  Add,    // dest <- lhs + rhs
  Sub,    // dest <- lhs - rhs
  Mul,    // dest <- lhs * rhs
  Or,     // dest <- lhs | rhs, bitwise
  And,    // dest <- lhs & rhs, bitwise
  Read,   // variable <- console
  Write,  // console <- variable
}

impl Operation {
  /// Builds the three-register instruction for an arithmetic or bitwise
  /// opcode. Returns `None` for opcodes with any other operand shape.
  pub fn three_register(self, dest: Register, lhs: Register, rhs: Register)
    -> Option<Instruction>
  {
    match self {
      Operation::Add => Some(Instruction::Add { dest, lhs, rhs }),
      Operation::Sub => Some(Instruction::Sub { dest, lhs, rhs }),
      Operation::Mul => Some(Instruction::Mul { dest, lhs, rhs }),
      Operation::Or  => Some(Instruction::Or  { dest, lhs, rhs }),
      Operation::And => Some(Instruction::And { dest, lhs, rhs }),
      _              => None
    }
  }
}

/**
  A single instruction, one variant per opcode, each carrying exactly the
  operand shape its opcode requires. A wrong operand count or operand kind is
  unrepresentable; the decoder is the only place such a mistake can appear,
  and it is rejected there.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Instruction {
  /// `LOAD r<d> <v>`: dest <- Memory[var]
  Load  { dest: Register, var: Variable },
  /// `LOADI r<d> #<imm>`: dest <- imm
  LoadI { dest: Register, imm: Int },
  /// `STORE <v> r<s>`: Memory[var] <- src
  Store { var: Variable, src: Register },
  /// `ADD r<d> r<l> r<r>`
  Add   { dest: Register, lhs: Register, rhs: Register },
  /// `SUB r<d> r<l> r<r>`
  Sub   { dest: Register, lhs: Register, rhs: Register },
  /// `MUL r<d> r<l> r<r>`
  Mul   { dest: Register, lhs: Register, rhs: Register },
  /// `OR r<d> r<l> r<r>`, bitwise
  Or    { dest: Register, lhs: Register, rhs: Register },
  /// `AND r<d> r<l> r<r>`, bitwise
  And   { dest: Register, lhs: Register, rhs: Register },
  /// `READ <v>`: Memory[var] <- one integer from the console
  Read  { var: Variable },
  /// `WRITE <v>`: report Memory[var]
  Write { var: Variable },
}

impl Instruction {
  /// The opcode tag of this instruction.
  pub fn operation(&self) -> Operation {
    match self {
      Instruction::Load  { .. } => Operation::Load,
      Instruction::LoadI { .. } => Operation::LoadI,
      Instruction::Store { .. } => Operation::Store,
      Instruction::Add   { .. } => Operation::Add,
      Instruction::Sub   { .. } => Operation::Sub,
      Instruction::Mul   { .. } => Operation::Mul,
      Instruction::Or    { .. } => Operation::Or,
      Instruction::And   { .. } => Operation::And,
      Instruction::Read  { .. } => Operation::Read,
      Instruction::Write { .. } => Operation::Write,
    }
  }
}

impl Display for Instruction {
  /// Renders the instruction in its assembly-line form. This is the encode
  /// half of the exchange format; `assembly::decode_line` is the other half.
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let opcode = self.operation();
    match self {

      Instruction::Load { dest, var } => {
        write!(f, "{} {} {}", opcode, dest, var)
      }

      Instruction::LoadI { dest, imm } => {
        write!(f, "{} {} #{}", opcode, dest, imm)
      }

      Instruction::Store { var, src } => {
        write!(f, "{} {} {}", opcode, var, src)
      }

      | Instruction::Add { dest, lhs, rhs }
      | Instruction::Sub { dest, lhs, rhs }
      | Instruction::Mul { dest, lhs, rhs }
      | Instruction::Or  { dest, lhs, rhs }
      | Instruction::And { dest, lhs, rhs } => {
        write!(f, "{} {} {} {}", opcode, dest, lhs, rhs)
      }

      | Instruction::Read  { var }
      | Instruction::Write { var } => {
        write!(f, "{} {}", opcode, var)
      }

    }
  }
}
