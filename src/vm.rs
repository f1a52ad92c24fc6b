/*!
  The tinyL virtual machine: a fixed register file, the six variable cells,
  and a single fetch-execute loop over a program. The instruction set has no
  branches or jumps, so control flow is strictly linear from the first
  instruction to the last.

  `READ` and `WRITE` go through the [`Console`] seam. The interactive
  [`StdConsole`] blocks on stdin for `READ`; tests substitute a scripted
  console.

  With the `trace_computation` feature enabled the machine prints its memory
  and register file as tables after every instruction.
*/

use std::fmt::{Display, Formatter};
use std::io::{self, Write as IoWrite};

use lazy_static::lazy_static;
use prettytable::{format as TableFormat, row, table, Table};
use tracing::debug;

use crate::address::{Register, Variable, VARIABLE_COUNT};
use crate::bytecode::{Instruction, Int, Program};
use crate::errors::RuntimeError;

/// Capacity of the register file. The code generator allocates registers
/// monotonically from 1, so this bounds the size of program the machine will
/// run; a register id beyond it is a `RuntimeError`, not a panic.
pub const MAX_REGISTERS: usize = 1024;

/// The machine's connection to the outside world: `READ` pulls one integer
/// per call, `WRITE` reports one value per call. Both block until done.
pub trait Console {
  /// Obtains one integer for `READ <var>`. A value that cannot be obtained
  /// or parsed is the caller's failure, reported as `RuntimeError::Input`.
  fn read_value(&mut self, var: Variable) -> Result<Int, RuntimeError>;

  /// Reports the value of `var` for `WRITE <var>`.
  fn write_value(&mut self, var: Variable, value: Int) -> Result<(), RuntimeError>;
}

pub struct Machine {
  /// The six variable cells `a`..`f`, all zero at start.
  memory           : [Int; VARIABLE_COUNT],
  /// The register file, indexed by `Register::idx()`. All zero at start.
  registers        : Vec<Int>,
  /// Highest register number written so far; how much of the register file
  /// the state tables display.
  highest_register : usize,
  /// Number of instructions executed so far.
  executed         : usize
}

impl Machine {

  pub fn new() -> Machine {
    Machine {
      memory           : [0; VARIABLE_COUNT],
      registers        : vec![0; MAX_REGISTERS],
      highest_register : 0,
      executed         : 0
    }
  }

  // region Low-level utility methods

  fn register(&self, r: Register) -> Result<Int, RuntimeError> {
    match self.registers.get(r.idx()) {
      Some(&value) => Ok(value),
      None         => Err(RuntimeError::RegisterOutOfRange(r))
    }
  }

  fn set_register(&mut self, r: Register, value: Int) -> Result<(), RuntimeError> {
    match self.registers.get_mut(r.idx()) {

      Some(slot) => {
        *slot = value;
        self.highest_register = self.highest_register.max(r.number());
        Ok(())
      }

      None => Err(RuntimeError::RegisterOutOfRange(r))

    }
  }

  /// Current value of a variable cell.
  pub fn variable(&self, var: Variable) -> Int {
    self.memory[var.idx()]
  }

  pub fn instructions_executed(&self) -> usize {
    self.executed
  }

  // endregion

  // region Execution

  /**
    Executes `program` from its first instruction to its last, reading and
    writing through `console`. The program itself is never mutated; a fatal
    error stops execution immediately without rolling back effects already
    applied.

    `ADD`, `SUB`, and `MUL` use two's-complement wrapping `i64` arithmetic,
    so overflow wraps rather than trapping, in every build profile.
  */
  pub fn run(&mut self, program: &Program, console: &mut dyn Console)
    -> Result<(), RuntimeError>
  {
    for instruction in program.iter() {
      self.step(instruction, console)?;
      self.executed += 1;

      #[cfg(feature = "trace_computation")]
      println!("{}\n{}", instruction, self);
    }

    debug!(instructions = self.executed, "program ran to completion");
    Ok(())
  }

  fn step(&mut self, instruction: &Instruction, console: &mut dyn Console)
    -> Result<(), RuntimeError>
  {
    match *instruction {

      Instruction::Load { dest, var } => {
        self.set_register(dest, self.variable(var))
      }

      Instruction::LoadI { dest, imm } => {
        self.set_register(dest, imm)
      }

      Instruction::Store { var, src } => {
        self.memory[var.idx()] = self.register(src)?;
        Ok(())
      }

      Instruction::Add { dest, lhs, rhs } => {
        let value = self.register(lhs)?.wrapping_add(self.register(rhs)?);
        self.set_register(dest, value)
      }

      Instruction::Sub { dest, lhs, rhs } => {
        let value = self.register(lhs)?.wrapping_sub(self.register(rhs)?);
        self.set_register(dest, value)
      }

      Instruction::Mul { dest, lhs, rhs } => {
        let value = self.register(lhs)?.wrapping_mul(self.register(rhs)?);
        self.set_register(dest, value)
      }

      Instruction::And { dest, lhs, rhs } => {
        let value = self.register(lhs)? & self.register(rhs)?;
        self.set_register(dest, value)
      }

      Instruction::Or { dest, lhs, rhs } => {
        let value = self.register(lhs)? | self.register(rhs)?;
        self.set_register(dest, value)
      }

      Instruction::Read { var } => {
        self.memory[var.idx()] = console.read_value(var)?;
        Ok(())
      }

      Instruction::Write { var } => {
        console.write_value(var, self.variable(var))
      }

    } // end match on opcode
  }

  // endregion

  // region Display methods

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Cell", ubl->"Contents"]);
    for (i, value) in self.memory.iter().enumerate() {
      let name = (b'a' + i as u8) as char;
      table.add_row(row![r->format!("{} =", name), format!("{}", value)]);
    }
    table
  }

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    for i in 0..self.highest_register {
      table.add_row(row![r->format!("r{} =", i + 1), format!("{}", self.registers[i])]);
    }
    table
  }

  // endregion

}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut combined_table =
      table!([self.make_memory_table(), self.make_register_table()]);

    combined_table.set_titles(row![ub->"Memory", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}


/// Interactive console over stdin and stdout. `READ` prompts with the target
/// variable's name and blocks for a line; `WRITE` prints one
/// `<name> = <value>` line.
pub struct StdConsole;

impl Console for StdConsole {

  fn read_value(&mut self, var: Variable) -> Result<Int, RuntimeError> {
    print!("tinyL>> enter value for \"{}\": ", var);
    io::stdout().flush()?;

    let mut line = String::new();
    let count = io::stdin().read_line(&mut line)?;
    if count == 0 {
      return Err(RuntimeError::Input {
        var,
        reason: "input ended".to_string()
      });
    }

    line.trim().parse::<Int>().map_err(|e| {
      RuntimeError::Input {
        var,
        reason: e.to_string()
      }
    })
  }

  fn write_value(&mut self, var: Variable, value: Int) -> Result<(), RuntimeError> {
    println!("{} = {}", var, value);
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use std::collections::VecDeque;

  use super::*;
  use crate::bytecode::decode_program;
  use crate::compiler::Compilation;

  struct ScriptedConsole {
    inputs : VecDeque<Int>,
    lines  : Vec<String>
  }

  impl ScriptedConsole {
    fn with_inputs(inputs: &[Int]) -> ScriptedConsole {
      ScriptedConsole {
        inputs : inputs.iter().copied().collect(),
        lines  : Vec::new()
      }
    }
  }

  impl Console for ScriptedConsole {
    fn read_value(&mut self, var: Variable) -> Result<Int, RuntimeError> {
      self.inputs.pop_front().ok_or(RuntimeError::Input {
        var,
        reason: "script exhausted".to_string()
      })
    }

    fn write_value(&mut self, var: Variable, value: Int) -> Result<(), RuntimeError> {
      self.lines.push(format!("{} = {}", var, value));
      Ok(())
    }
  }

  fn v(c: char) -> Variable {
    Variable::new(c).unwrap()
  }

  fn run_source(source: &str, inputs: &[Int]) -> (Machine, Vec<String>) {
    let compilation = Compilation::compile(source).unwrap();
    let mut machine = Machine::new();
    let mut console = ScriptedConsole::with_inputs(inputs);
    machine.run(&compilation.program, &mut console).unwrap();
    (machine, console.lines)
  }

  #[test]
  fn adds_values_read_at_runtime() {
    let (machine, lines) = run_source("?a;?b;c=+ab;%c!", &[3, 4]);
    assert_eq!(lines, vec!["c = 7"]);
    assert_eq!(machine.variable(v('c')), 7);
    assert_eq!(machine.instructions_executed(), 7);
  }

  #[test]
  fn multiplies_literal_digits() {
    let (machine, lines) = run_source("a=*34!", &[]);
    assert!(lines.is_empty());
    assert_eq!(machine.variable(v('a')), 12);
  }

  #[test]
  fn subtraction_can_go_negative() {
    let (_, lines) = run_source("?a;?b;c=-ab;%c!", &[3, 5]);
    assert_eq!(lines, vec!["c = -2"]);
  }

  #[test]
  fn bitwise_and_or() {
    let (_, lines) = run_source("?a;?b;c=&ab;%c;d=|ab;%d!", &[6, 3]);
    assert_eq!(lines, vec!["c = 2", "d = 7"]);
  }

  #[test]
  fn every_digit_survives_the_round_trip() {
    for d in 0..=9 {
      let source = format!("b={};%b!", d);
      let (machine, lines) = run_source(&source, &[]);
      assert_eq!(lines, vec![format!("b = {}", d)]);
      assert_eq!(machine.variable(v('b')), d);
    }
  }

  #[test]
  fn variables_start_at_zero() {
    let (_, lines) = run_source("%f!", &[]);
    assert_eq!(lines, vec!["f = 0"]);
  }

  #[test]
  fn decoded_programs_run_identically() {
    let compilation = Compilation::compile("?a;?b;c=+ab;%c!").unwrap();
    let program = decode_program(&compilation.program.to_string()).unwrap();

    let mut machine = Machine::new();
    let mut console = ScriptedConsole::with_inputs(&[3, 4]);
    machine.run(&program, &mut console).unwrap();
    assert_eq!(console.lines, vec!["c = 7"]);
  }

  #[test]
  fn arithmetic_wraps_on_overflow() {
    let mut program = Program::new();
    program.append(Instruction::LoadI { dest: Register::new(1), imm: Int::MAX });
    program.append(Instruction::LoadI { dest: Register::new(2), imm: 1 });
    program.append(Instruction::Add {
      dest : Register::new(3),
      lhs  : Register::new(1),
      rhs  : Register::new(2)
    });
    program.append(Instruction::Store { var: v('a'), src: Register::new(3) });

    let mut machine = Machine::new();
    machine.run(&program, &mut ScriptedConsole::with_inputs(&[])).unwrap();
    assert_eq!(machine.variable(v('a')), Int::MIN);
  }

  #[test]
  fn rejects_register_beyond_capacity() {
    let mut program = Program::new();
    program.append(Instruction::LoadI {
      dest : Register::new(MAX_REGISTERS + 1),
      imm  : 1
    });

    let mut machine = Machine::new();
    let result = machine.run(&program, &mut ScriptedConsole::with_inputs(&[]));
    assert!(matches!(result, Err(RuntimeError::RegisterOutOfRange(_))));
  }

  #[test]
  fn read_without_input_is_an_input_error() {
    let compilation = Compilation::compile("?a!").unwrap();
    let mut machine = Machine::new();
    let result = machine.run(&compilation.program, &mut ScriptedConsole::with_inputs(&[]));
    assert!(matches!(result, Err(RuntimeError::Input { .. })));
  }
}
