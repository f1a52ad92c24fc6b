/*!

This module parses tinyL source code and generates code for it in a single
pass. There is no AST: each production consumes its tokens and immediately
appends the instructions realizing its own semantics, returning the register
that holds its result (for expressions).

The language is given by the following grammar:
    ```
    digit      := '0'..'9'
    identifier := 'a'..'f'
    expr       := '+' expr expr | '-' expr expr | '*' expr expr
                | '&' expr expr | '|' expr expr
                | digit | identifier
    stmt       := identifier '=' expr | '?' identifier | '%' identifier
    morestmts  := ';' stmtlist | '!'
    stmtlist   := stmt morestmts
    program    := stmtlist
    ```

The grammar is LL(1) over single characters: the parser's one token of
lookahead is the cursor's current character. Every character is a token;
whitespace and comments do not exist in the language. The first symbol that
matches no alternative aborts the compilation; there is no error recovery.

*/

use crate::address::{Register, Variable};
use crate::bytecode::{Instruction, Int, Program};
use crate::chariter::CharIter;
use crate::errors::SyntaxError;

/// The compilation context threaded through the recursive descent: the
/// cursor, the code emitted so far, and the register allocator.
pub struct Parser<'a> {
  cursor : CharIter<'a>,
  code   : Program,
  /// Highest register number allocated so far. Registers count from 1 and
  /// are never reused.
  regnum : usize
}

impl<'a> Parser<'a> {

  pub fn new(text: &'a str) -> Self {
    Parser {
      cursor : CharIter::new(text),
      code   : Program::new(),
      regnum : 0
    }
  }

  /// Runs the `program` production to completion and returns the emitted
  /// instruction sequence together with the number of registers it uses.
  pub fn parse(mut self) -> Result<(Program, usize), SyntaxError> {
    self.program()?;
    Ok((self.code, self.regnum))
  }

  // region Parser machinery

  /// Allocates the next virtual register.
  fn next_register(&mut self) -> Register {
    self.regnum += 1;
    Register::new(self.regnum)
  }

  /// The current token, or an error naming `production` if the input ended
  /// where the grammar still required a token.
  fn current(&mut self, production: &'static str) -> Result<char, SyntaxError> {
    self.cursor.peek().ok_or(SyntaxError::UnexpectedEnd { production })
  }

  fn advance(&mut self) {
    self.cursor.next();
  }

  fn unexpected(&self, production: &'static str, symbol: char) -> SyntaxError {
    SyntaxError::UnexpectedSymbol {
      production,
      symbol,
      column: self.cursor.column()
    }
  }

  /// Consumes an identifier token `a`..`f`.
  fn identifier(&mut self, production: &'static str) -> Result<Variable, SyntaxError> {
    let token = self.current(production)?;
    match Variable::new(token) {

      Some(var) => {
        self.advance();
        Ok(var)
      }

      None => Err(self.unexpected(production, token))

    }
  }

  // endregion

  // region Grammar productions

  /// program := stmtlist
  fn program(&mut self) -> Result<(), SyntaxError> {
    self.stmtlist()
  }

  /// stmtlist := stmt morestmts
  fn stmtlist(&mut self) -> Result<(), SyntaxError> {
    let token = self.current("stmtlist")?;
    if !Variable::is_name(token) && token != '?' && token != '%' {
      return Err(self.unexpected("stmtlist", token));
    }
    self.stmt()?;
    self.morestmts()
  }

  /// morestmts := ';' stmtlist | '!'
  //  `!` is the only sanctioned end of a program; the cursor never looks
  //  past it.
  fn morestmts(&mut self) -> Result<(), SyntaxError> {
    match self.current("morestmts")? {

      ';' => {
        self.advance();
        self.stmtlist()
      }

      '!' => {
        self.advance();
        Ok(())
      }

      token => Err(self.unexpected("morestmts", token))

    }
  }

  /// stmt := identifier '=' expr | '?' identifier | '%' identifier
  fn stmt(&mut self) -> Result<(), SyntaxError> {
    match self.current("stmt")? {
      '?' => self.read(),
      '%' => self.print(),
      // `stmtlist` guarantees anything else is an identifier.
      _   => self.assign()
    }
  }

  /// identifier '=' expr
  fn assign(&mut self) -> Result<(), SyntaxError> {
    let var = self.identifier("assign")?;
    match self.current("assign")? {
      '=' => self.advance(),
      token => return Err(self.unexpected("assign", token))
    }
    let src = self.expr()?;
    self.code.append(Instruction::Store { var, src });
    Ok(())
  }

  /// '?' identifier — reads one value into the named variable at run time.
  fn read(&mut self) -> Result<(), SyntaxError> {
    self.advance(); // past `?`
    let var = self.identifier("read")?;
    self.code.append(Instruction::Read { var });
    Ok(())
  }

  /// '%' identifier — reports the named variable's value at run time.
  fn print(&mut self) -> Result<(), SyntaxError> {
    self.advance(); // past `%`
    let var = self.identifier("print")?;
    self.code.append(Instruction::Write { var });
    Ok(())
  }

  /**
    expr := '+' expr expr | '-' expr expr | '*' expr expr
          | '&' expr expr | '|' expr expr
          | digit | identifier

    Emits the instructions computing the expression and returns the register
    holding its result. Operands evaluate left then right; the order is
    observable only through register numbering, since expressions have no
    side effects besides register allocation.
  */
  fn expr(&mut self) -> Result<Register, SyntaxError> {
    let token = self.current("expr")?;
    match token {

      '+' | '-' | '*' | '&' | '|' => {
        self.advance(); // past the operator
        let lhs  = self.expr()?;
        let rhs  = self.expr()?;
        let dest = self.next_register();
        let instruction = match token {
          '+' => Instruction::Add { dest, lhs, rhs },
          '-' => Instruction::Sub { dest, lhs, rhs },
          '*' => Instruction::Mul { dest, lhs, rhs },
          '&' => Instruction::And { dest, lhs, rhs },
          _   => Instruction::Or  { dest, lhs, rhs }
        };
        self.code.append(instruction);
        Ok(dest)
      }

      c if c.is_ascii_digit()   => self.digit(),

      c if Variable::is_name(c) => self.variable(),

      c => Err(self.unexpected("expr", c))

    }
  }

  /// digit := '0'..'9' — loads the digit's value into a fresh register.
  fn digit(&mut self) -> Result<Register, SyntaxError> {
    let token = self.current("digit")?;
    let imm = match token.to_digit(10) {
      Some(value) => value as Int,
      None        => return Err(self.unexpected("digit", token))
    };
    let dest = self.next_register();
    self.code.append(Instruction::LoadI { dest, imm });
    self.advance();
    Ok(dest)
  }

  /// An identifier in expression position loads the variable into a fresh
  /// register.
  fn variable(&mut self) -> Result<Register, SyntaxError> {
    let var  = self.identifier("expr")?;
    let dest = self.next_register();
    self.code.append(Instruction::Load { dest, var });
    Ok(dest)
  }

  // endregion

}


#[cfg(test)]
mod tests {
  use super::*;

  fn compile_lines(text: &str) -> Vec<String> {
    let (program, _) = Parser::new(text).parse().unwrap();
    program.iter().map(|i| i.to_string()).collect()
  }

  #[test]
  fn reads_adds_and_writes() {
    assert_eq!(
      compile_lines("?a;?b;c=+ab;%c!"),
      vec![
        "READ a",
        "READ b",
        "LOAD r1 a",
        "LOAD r2 b",
        "ADD r3 r1 r2",
        "STORE c r3",
        "WRITE c"
      ]
    );
  }

  #[test]
  fn multiplies_literal_digits() {
    assert_eq!(
      compile_lines("a=*34!"),
      vec!["LOADI r1 #3", "LOADI r2 #4", "MUL r3 r1 r2", "STORE a r3"]
    );
  }

  #[test]
  fn every_digit_loads_its_value() {
    for d in 0..=9 {
      let source = format!("a={}!", d);
      let (program, registers) = Parser::new(&source).parse().unwrap();
      assert_eq!(registers, 1);
      let first = program.iter().next().unwrap();
      assert_eq!(*first, Instruction::LoadI { dest: Register::new(1), imm: d });
    }
  }

  #[test]
  fn register_numbering_is_dense_and_starts_at_one() {
    let (program, registers) = Parser::new("f=+*12&ab;%f!").parse().unwrap();
    // Destination registers appear in allocation order: 1, 2, ..., registers.
    let mut expected = 1;
    let mut highest_seen = 0;
    for instruction in program.iter() {
      let dest = match *instruction {
        Instruction::LoadI { dest, .. }   => Some(dest),
        Instruction::Load { dest, .. }    => Some(dest),
        | Instruction::Add { dest, lhs, rhs }
        | Instruction::Sub { dest, lhs, rhs }
        | Instruction::Mul { dest, lhs, rhs }
        | Instruction::And { dest, lhs, rhs }
        | Instruction::Or  { dest, lhs, rhs } => {
          // Source operands must already have been allocated.
          assert!(lhs.number() <= highest_seen);
          assert!(rhs.number() <= highest_seen);
          Some(dest)
        }
        Instruction::Store { src, .. } => {
          assert!(src.number() <= highest_seen);
          None
        }
        _ => None
      };
      if let Some(dest) = dest {
        assert_eq!(dest.number(), expected);
        expected += 1;
        highest_seen = dest.number();
      }
    }
    assert_eq!(highest_seen, registers);
  }

  #[test]
  fn nested_prefix_expressions() {
    // c = (a + 2) * (b - 1)
    assert_eq!(
      compile_lines("c=*+a2-b1!"),
      vec![
        "LOAD r1 a",
        "LOADI r2 #2",
        "ADD r3 r1 r2",
        "LOAD r4 b",
        "LOADI r5 #1",
        "SUB r6 r4 r5",
        "MUL r7 r3 r6",
        "STORE c r7"
      ]
    );
  }

  #[test]
  fn bitwise_operators() {
    assert_eq!(
      compile_lines("d=&a|bc!"),
      vec![
        "LOAD r1 a",
        "LOAD r2 b",
        "LOAD r3 c",
        "OR r4 r2 r3",
        "AND r5 r1 r4",
        "STORE d r5"
      ]
    );
  }

  #[test]
  fn rejects_read_in_place_of_assignment() {
    // After `a`, only `=` may follow; `?` starts a statement, not an
    // expression.
    let result = Parser::new("a?3!").parse();
    assert_eq!(
      result.unwrap_err(),
      SyntaxError::UnexpectedSymbol {
        production : "assign",
        symbol     : '?',
        column     : 2
      }
    );
  }

  #[test]
  fn rejects_statement_without_terminator() {
    assert_eq!(
      Parser::new("a=1").parse().unwrap_err(),
      SyntaxError::UnexpectedEnd { production: "morestmts" }
    );
  }

  #[test]
  fn rejects_empty_input() {
    assert_eq!(
      Parser::new("").parse().unwrap_err(),
      SyntaxError::UnexpectedEnd { production: "stmtlist" }
    );
  }

  #[test]
  fn rejects_bad_statement_start() {
    assert!(matches!(
      Parser::new("=a!").parse(),
      Err(SyntaxError::UnexpectedSymbol { production: "stmtlist", symbol: '=', .. })
    ));
    // `g` is not one of the six variables.
    assert!(matches!(
      Parser::new("g=1!").parse(),
      Err(SyntaxError::UnexpectedSymbol { production: "stmtlist", symbol: 'g', .. })
    ));
  }

  #[test]
  fn rejects_trailing_junk_after_statement() {
    assert!(matches!(
      Parser::new("a=1x").parse(),
      Err(SyntaxError::UnexpectedSymbol { production: "morestmts", symbol: 'x', .. })
    ));
  }

  #[test]
  fn rejects_whitespace() {
    // Every character is a token, so even a space is a syntax error.
    assert!(Parser::new("a = 1!").parse().is_err());
  }
}
