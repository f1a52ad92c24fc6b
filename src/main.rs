/*!
  The command line surface. `tinylc compile` translates a tinyL source file
  into a textual instruction file; `tinylc run` decodes such a file and
  executes it on a fresh machine. Any front-end, decode, or runtime error
  prints a message and exits nonzero; nothing is retried.
*/

mod address;
mod bytecode;
mod chariter;
mod compiler;
mod errors;
mod vm;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as CommandLineParser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::compiler::Compilation;
use crate::errors::Error;
use crate::vm::{Machine, StdConsole};

/// A compiler and virtual machine for the tinyL language.
#[derive(CommandLineParser, Debug)]
#[command(name = "tinylc", version, about = "Compile and run tinyL programs")]
struct Cli {
  #[command(subcommand)]
  command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Compile a tinyL source file to an instruction file.
  Compile {
    /// The tinyL source file.
    source: PathBuf,

    /// Where to write the instruction file.
    #[arg(short, long, default_value = "tinyL.out")]
    output: PathBuf
  },

  /// Execute a compiled instruction file.
  Run {
    /// The instruction file to execute.
    code: PathBuf
  }
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let result = match cli.command {
    Command::Compile { source, output } => compile_command(&source, &output),
    Command::Run { code }               => run_command(&code)
  };

  match result {

    Ok(()) => ExitCode::SUCCESS,

    Err(error) => {
      eprintln!("error: {}", error);
      ExitCode::FAILURE
    }

  }
}

fn compile_command(source: &Path, output: &Path) -> Result<(), Error> {
  let text = fs::read_to_string(source).map_err(|e| Error::file(source, e))?;

  let compilation = Compilation::compile(&text)?;

  fs::write(output, compilation.program.to_string())
    .map_err(|e| Error::file(output, e))?;
  println!(
    "Compiled {} instructions using {} registers. Code written to file \"{}\".",
    compilation.program.len(),
    compilation.registers_used,
    output.display()
  );
  Ok(())
}

fn run_command(code: &Path) -> Result<(), Error> {
  let text = fs::read_to_string(code).map_err(|e| Error::file(code, e))?;

  let program = bytecode::decode_program(&text)?;

  let mut machine = Machine::new();
  machine.run(&program, &mut StdConsole)?;
  Ok(())
}
