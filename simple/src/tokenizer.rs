use std::{fmt, rc::Rc};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Lexeme used for the end of input marker
const END_OF_INPUT_TEXT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Integer,
    Assign,
    Plus,
    Unknown,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Identifier => "ID",
            Self::Integer => "INT",
            Self::Assign => "ASSMT",
            Self::Plus => "PLUS",
            Self::Unknown => "UNKNOWN",
            Self::EndOfInput => "EOF",
        };

        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    kind: TokenKind,
    value: Rc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, value: &str) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn end_of_input() -> Self {
        Self::new(TokenKind::EndOfInput, END_OF_INPUT_TEXT)
    }

    pub fn get_kind(&self) -> TokenKind {
        self.kind
    }

    pub fn get_value(&self) -> &str {
        &self.value
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Determines whether the token may start or continue an expression term
    pub fn is_term(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Integer)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// Matches the single lexeme at the start of the input. Whitespace is only
/// space, tab and newline; any other unmatched character is a one-character
/// unknown lexeme
static LEXEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^(?:(?P<space>[ \t\n]+)|(?P<ident>\p{L}[\p{L}\p{Nd}]*)|(?P<int>[0-9]+)|(?P<assign>=)|(?P<plus>\+)|.)",
    )
    .unwrap()
});

/// Scans the lexeme at the start of `s`, providing its kind and byte length.
/// A kind of `None` is whitespace to be skipped
fn scan(s: &str) -> Option<(Option<TokenKind>, usize)> {
    let caps = LEXEME_REGEX.captures(s)?;
    let len = caps.get(0)?.end();

    let kind = if caps.name("space").is_some() {
        None
    } else if caps.name("ident").is_some() {
        Some(TokenKind::Identifier)
    } else if caps.name("int").is_some() {
        Some(TokenKind::Integer)
    } else if caps.name("assign").is_some() {
        Some(TokenKind::Assign)
    } else if caps.name("plus").is_some() {
        Some(TokenKind::Plus)
    } else {
        Some(TokenKind::Unknown)
    };

    Some((kind, len))
}

/// Tokenizes all of the input at once, terminated by a single end of input token
pub fn tokenize(s: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut index = 0;

    while let Some((kind, len)) = scan(&s[index..]) {
        if let Some(kind) = kind {
            let t = Token::new(kind, &s[index..index + len]);
            trace!(token = %t, index, "token scanned");
            tokens.push(t);
        }

        index += len;
    }

    tokens.push(Token::end_of_input());
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerError {
    IndexOutOfRange(usize),
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange(i) => write!(f, "Index out of range {i}"),
        }
    }
}

/// Incremental tokenizer, providing one token per call.
///
/// The end of input token is provided exactly once; asking for another token
/// after it is a cursor fault reported as [`LexerError::IndexOutOfRange`].
pub struct Lexer<'a> {
    buffer: &'a str,
    index: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(buffer: &'a str) -> Self {
        Self { buffer, index: 0 }
    }

    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        while let Some((None, len)) = scan(&self.buffer[self.index.min(self.buffer.len())..]) {
            self.index += len;
        }

        if self.index < self.buffer.len() {
            match scan(&self.buffer[self.index..]) {
                Some((Some(kind), len)) => {
                    let t = Token::new(kind, &self.buffer[self.index..self.index + len]);
                    self.index += len;
                    Ok(t)
                }
                _ => Err(LexerError::IndexOutOfRange(self.index)),
            }
        } else if self.index == self.buffer.len() {
            self.index += 1;
            Ok(Token::end_of_input())
        } else {
            Err(LexerError::IndexOutOfRange(self.index))
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().ok()
    }
}

/// Cursor over a token list with the two-token lookahead used by the parser.
///
/// `peek` provides the token after the one the next call to `next` returns.
/// Reading past the end of the list provides end of input tokens.
pub struct TokenIter<'a> {
    list: &'a [Token],
    current: usize,
}

impl<'a> From<&'a [Token]> for TokenIter<'a> {
    fn from(list: &'a [Token]) -> Self {
        Self { list, current: 0 }
    }
}

impl TokenIter<'_> {
    pub fn next(&mut self) -> Token {
        let t = self.get_index_val(self.current);
        self.current += 1;
        t
    }

    pub fn peek(&self) -> Token {
        self.get_index_val(self.current + 1)
    }

    /// Determines whether only the end of input remains
    pub fn at_end(&self) -> bool {
        self.get_index_val(self.current).is(TokenKind::EndOfInput)
    }

    fn get_index_val(&self, ind: usize) -> Token {
        self.list
            .get(ind)
            .cloned()
            .unwrap_or_else(Token::end_of_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.get_kind()).collect()
    }

    fn lex_all(s: &str) -> Vec<Token> {
        Lexer::new(s).collect()
    }

    #[test]
    fn whitespace_only() {
        for s in ["", " ", "\n", "\t \n  \t\n\n"] {
            let tokens = tokenize(s);
            assert_eq!(tokens, vec![Token::end_of_input()]);
            assert_eq!(lex_all(s), tokens);
        }
    }

    #[test]
    fn assignment() {
        let tokens = tokenize("x12=17+43\na = x12+35+1");
        let expected = [
            (TokenKind::Identifier, "x12"),
            (TokenKind::Assign, "="),
            (TokenKind::Integer, "17"),
            (TokenKind::Plus, "+"),
            (TokenKind::Integer, "43"),
            (TokenKind::Identifier, "a"),
            (TokenKind::Assign, "="),
            (TokenKind::Identifier, "x12"),
            (TokenKind::Plus, "+"),
            (TokenKind::Integer, "35"),
            (TokenKind::Plus, "+"),
            (TokenKind::Integer, "1"),
            (TokenKind::EndOfInput, "-"),
        ];

        assert_eq!(tokens.len(), expected.len());
        for (t, (kind, value)) in tokens.iter().zip(expected) {
            assert_eq!(t.get_kind(), kind);
            assert_eq!(t.get_value(), value);
        }
    }

    #[test]
    fn digits_split_from_letters() {
        let tokens = tokenize("17abc abc17 4x2");
        let values: Vec<_> = tokens.iter().map(|t| t.get_value().to_string()).collect();
        assert_eq!(values, ["17", "abc", "abc17", "4", "x2", "-"]);
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn unknown_characters() {
        let tokens = tokenize("a_b;(\r)");
        let values: Vec<_> = tokens.iter().map(|t| t.get_value().to_string()).collect();
        assert_eq!(values, ["a", "_", "b", ";", "(", "\r", ")", "-"]);
        assert_eq!(tokens[1].get_kind(), TokenKind::Unknown);
        assert_eq!(tokens[5].get_kind(), TokenKind::Unknown);
    }

    #[test]
    fn eager_matches_incremental() {
        let inputs = [
            "x = 5",
            "x = 5\ny = x+3\n",
            "  \t x1=y2+ +3 4 $ é9 = \n\n",
            "17=x+3",
            "=+",
            "a",
        ];

        for s in inputs {
            assert_eq!(tokenize(s), lex_all(s), "input {s:?}");
        }
    }

    #[test]
    fn incremental_end_of_input() {
        let mut lexer = Lexer::new("x ");
        assert_eq!(lexer.next_token(), Ok(Token::new(TokenKind::Identifier, "x")));
        assert_eq!(lexer.next_token(), Ok(Token::end_of_input()));
        assert_eq!(lexer.next_token(), Err(LexerError::IndexOutOfRange(3)));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn token_display() {
        assert_eq!(Token::new(TokenKind::Identifier, "x").to_string(), "ID x");
        assert_eq!(Token::new(TokenKind::Assign, "=").to_string(), "ASSMT =");
        assert_eq!(Token::end_of_input().to_string(), "EOF -");
    }

    #[test]
    fn token_iter_lookahead() {
        let tokens = tokenize("x = 5");
        let mut iter = TokenIter::from(tokens.as_slice());

        assert_eq!(iter.peek().get_kind(), TokenKind::Assign);
        assert_eq!(iter.next().get_value(), "x");
        assert_eq!(iter.peek().get_kind(), TokenKind::Integer);
        assert_eq!(iter.next().get_kind(), TokenKind::Assign);
        assert_eq!(iter.peek().get_kind(), TokenKind::EndOfInput);
        assert_eq!(iter.next().get_value(), "5");
        assert!(iter.at_end());

        // Past the list only end of input remains
        assert_eq!(iter.peek().get_kind(), TokenKind::EndOfInput);
        assert_eq!(iter.next().get_kind(), TokenKind::EndOfInput);
        assert_eq!(iter.next().get_kind(), TokenKind::EndOfInput);
        assert!(iter.at_end());
    }
}
