use std::fmt;

use sbvm::{Instruction, Machine, MachineError};
use tracing::debug;

use crate::{
    symbols::SymbolTable,
    tokenizer::{Token, TokenIter, TokenKind, tokenize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    ExpectingIdentifier,
    ExpectingAssignOp,
    ExpectingIdentifierOrInteger,
    ExpectingIdentifierOrAddOp,
    IdentifierNotDefined,
    IntegerOutOfRange,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExpectingIdentifier => "Expecting identifier",
            Self::ExpectingAssignOp => "Expecting assignment operator",
            Self::ExpectingIdentifierOrInteger => "Expecting identifier or integer",
            Self::ExpectingIdentifierOrAddOp => "Expecting identifier or add operator",
            Self::IdentifierNotDefined => "Identifier not defined",
            Self::IntegerOutOfRange => "Integer out of range",
        };

        write!(f, "{s}")
    }
}

/// The first error found in a program, tagged with the statement line it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub diagnostic: Diagnostic,
    pub line: usize,
    pub token: Token,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}, Line {}", self.diagnostic, self.line)
    }
}

/// Result of parsing and, for valid programs, executing a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Invalid(ParseError),
    Halted(MachineError),
    Completed,
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

struct ParserState {
    symbols: SymbolTable,
    machine: Machine,
    line: usize,
    slot: usize,
}

impl ParserState {
    fn error(&self, diagnostic: Diagnostic, token: Token) -> ParseError {
        ParseError {
            diagnostic,
            line: self.line,
            token,
        }
    }

    fn parse_program(&mut self, tokens: &mut TokenIter) -> Result<(), ParseError> {
        while !tokens.at_end() {
            self.line += 1;
            self.parse_assignment(tokens)?;
            debug!(line = self.line, "statement parsed");
        }

        Ok(())
    }

    fn parse_assignment(&mut self, tokens: &mut TokenIter) -> Result<(), ParseError> {
        let id = self.parse_id(tokens)?;
        let addr = self.symbols.declare(id.get_value(), self.slot);
        debug!(name = id.get_value(), addr, slot = self.slot, "identifier declared");

        self.parse_assign_op(tokens)?;
        self.parse_expression(tokens)?;

        // Each statement stores to its own slot, even when reassigning a name
        self.machine.generate(Instruction::Store(self.slot));
        self.slot += 1;

        Ok(())
    }

    fn parse_id(&self, tokens: &mut TokenIter) -> Result<Token, ParseError> {
        let t = tokens.next();
        if t.is(TokenKind::Identifier) {
            Ok(t)
        } else {
            Err(self.error(Diagnostic::ExpectingIdentifier, t))
        }
    }

    fn parse_assign_op(&self, tokens: &mut TokenIter) -> Result<(), ParseError> {
        let next = tokens.peek();
        let t = tokens.next();

        if !t.is(TokenKind::Assign) {
            Err(self.error(Diagnostic::ExpectingAssignOp, t))
        } else if !next.is_term() {
            Err(self.error(Diagnostic::ExpectingIdentifierOrInteger, next))
        } else {
            Ok(())
        }
    }

    /// Walks the right-hand side one term at a time. The token after the
    /// current term decides whether the expression continues
    fn parse_expression(&mut self, tokens: &mut TokenIter) -> Result<(), ParseError> {
        loop {
            let next = tokens.peek();
            let t = tokens.next();

            match t.get_kind() {
                TokenKind::Identifier | TokenKind::Integer => {
                    let inst = self.parse_term(t)?;
                    self.machine.generate(inst);

                    match next.get_kind() {
                        TokenKind::Plus => continue,
                        TokenKind::Integer => {
                            return Err(self.error(Diagnostic::ExpectingIdentifierOrAddOp, next));
                        }
                        _ => return Ok(()),
                    }
                }
                TokenKind::Plus => {
                    if !next.is_term() {
                        return Err(self.error(Diagnostic::ExpectingIdentifierOrInteger, next));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_term(&self, t: Token) -> Result<Instruction, ParseError> {
        if t.is(TokenKind::Identifier) {
            match self.symbols.lookup(t.get_value()) {
                Some(addr) => Ok(Instruction::Load(addr)),
                None => Err(self.error(Diagnostic::IdentifierNotDefined, t)),
            }
        } else {
            match t.get_value().parse::<i32>() {
                Ok(v) => Ok(Instruction::LoadImmediate(v)),
                Err(_) => Err(self.error(Diagnostic::IntegerOutOfRange, t)),
            }
        }
    }
}

/// Recursive-descent parser for SIMPLE programs, generating bytecode into its machine
/// as each statement is parsed
pub struct Parser {
    tokens: Vec<Token>,
    state: ParserState,
    result: Option<Result<(), ParseError>>,
}

impl Parser {
    pub fn new(source: &str, memory_size: usize) -> Self {
        Self::from_tokens(tokenize(source), memory_size)
    }

    pub fn from_tokens(tokens: Vec<Token>, memory_size: usize) -> Self {
        Self {
            tokens,
            state: ParserState {
                symbols: SymbolTable::new(),
                machine: Machine::new(memory_size),
                line: 0,
                slot: 0,
            },
            result: None,
        }
    }

    /// Parses the whole program, stopping at the first error. Later calls
    /// provide the same result without parsing again
    pub fn parse_program(&mut self) -> Result<(), ParseError> {
        if let Some(res) = &self.result {
            return res.clone();
        }

        let mut tokens = TokenIter::from(self.tokens.as_slice());
        let res = self.state.parse_program(&mut tokens);

        match &res {
            Ok(()) => debug!(statements = self.state.line, "valid program"),
            Err(e) => debug!(token = %e.token, "invalid program - {e}"),
        }

        self.result = Some(res.clone());
        res
    }

    /// Parses the program and, only if it is valid, runs the generated bytecode
    /// from a cleared memory
    pub fn run(&mut self) -> Outcome {
        if let Err(e) = self.parse_program() {
            return Outcome::Invalid(e);
        }

        self.state.machine.reset();
        match self.state.machine.run() {
            Ok(()) => Outcome::Completed,
            Err(e) => Outcome::Halted(e),
        }
    }

    pub fn get_tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get_symbols(&self) -> &SymbolTable {
        &self.state.symbols
    }

    pub fn get_machine(&self) -> &Machine {
        &self.state.machine
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self
            .tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(f, "Token List: [{tokens}]")?;
        writeln!(f, "Symbol Table: {}", self.state.symbols)?;
        writeln!(
            f,
            "ByteCode: {:?}",
            self.state.machine.get_bytecode_words()
        )?;
        write!(f, "Memory: {}", self.state.machine.get_memory())
    }
}
