mod compile;
mod parser;

pub use compile::Compilation;
pub use parser::Parser;
