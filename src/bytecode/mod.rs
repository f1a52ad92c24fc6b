/*!

  The instruction layer: the opcode and instruction model, the program
  container, and the textual assembly format that is the exchange format
  between the compiler and the virtual machine.

  An instruction file holds one instruction per line, fields separated by
  spaces. Register operands render as `r<N>`, the `LOADI` immediate as
  `#<N>`, and variable operands as their bare one-character name:

  ```text
  LOAD r<d> <v>
  LOADI r<d> #<imm>
  STORE <v> r<s>
  ADD|SUB|MUL|AND|OR r<d> r<l> r<r>
  READ <v>
  WRITE <v>
  ```

  Any conforming encoder's output is decodable by any conforming decoder.
  Blank lines are ignorable; a line that attempts an instruction but matches
  no layout is an error, never a silent skip.

*/

mod assembly;
mod instruction;
mod program;

pub use assembly::{decode_line, decode_program};
pub use instruction::{Instruction, Int, Operation};
pub use program::{InstructionIndex, Program};
