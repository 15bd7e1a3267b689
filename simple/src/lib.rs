mod parser;
mod symbols;
mod tokenizer;

pub use parser::{Diagnostic, Outcome, ParseError, Parser};
pub use symbols::SymbolTable;
pub use tokenizer::{Lexer, LexerError, Token, TokenKind, tokenize};

/// Parses the source and runs it if it is a valid program, providing the
/// parser for inspection of the resulting state
pub fn run_source(s: &str, memory_size: usize) -> (Parser, Outcome) {
    let mut parser = Parser::new(s, memory_size);
    let outcome = parser.run();
    (parser, outcome)
}
