//! Lexer for command scripts and signatures
//!
//! Converts source text into a stream of tokens.

use crate::ScriptError;

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),

    // Identifiers (keywords are resolved by the parsers)
    Ident(String),

    // Delimiters
    LParen,
    RParen,
    Comma,
    Colon,
    Eq,
    Ellipsis,

    // Special
    Eof,
}

impl TokenKind {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("{:?}", s),
            Self::Ident(name) => name.clone(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Colon => "':'".to_string(),
            Self::Eq => "'='".to_string(),
            Self::Ellipsis => "'...'".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// A token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

/// Lexer for command text
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Start counting lines from `line` (for per-line script parsing)
    pub fn starting_at(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Tokenize the entire source
    pub fn tokenize(mut self) -> Result<Vec<Token>, ScriptError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token
    fn next_token(&mut self) -> Result<Token, ScriptError> {
        self.skip_whitespace_and_comments();

        let (line, column) = (self.line, self.column);

        let Some((pos, c)) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, line, column));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Eq,

            '.' => {
                if self.match_char('.') && self.match_char('.') {
                    TokenKind::Ellipsis
                } else {
                    return Err(ScriptError::LexerError {
                        line,
                        column,
                        message: "Expected '...'".to_string(),
                    });
                }
            }

            '"' => self.string(line, column)?,

            '-' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.number(pos, line, column)?,
            c if c.is_ascii_digit() => self.number(pos, line, column)?,

            c if c.is_alphabetic() || c == '_' => self.identifier(pos),

            _ => {
                return Err(ScriptError::LexerError {
                    line,
                    column,
                    message: format!("Unexpected character '{}'", c),
                });
            }
        };

        Ok(Token::new(kind, line, column))
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((_, c)) = result {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    /// Peek at the next character
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Match and consume a specific character
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(pos, _)| *pos).unwrap_or(self.source.len())
    }

    /// Skip whitespace and `//` comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek().map(|(_, c)| *c) == Some('/') {
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Parse a string literal
    fn string(&mut self, line: usize, column: usize) -> Result<TokenKind, ScriptError> {
        let mut value = String::new();
        let unterminated = || ScriptError::LexerError {
            line,
            column,
            message: "Unterminated string".to_string(),
        };

        loop {
            match self.advance() {
                Some((_, '"')) => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((_, '"')) => value.push('"'),
                    Some((_, c)) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => return Err(unterminated()),
                },
                Some((_, c)) => value.push(c),
                None => return Err(unterminated()),
            }
        }

        Ok(TokenKind::String(value))
    }

    /// Parse a number, optionally negative
    fn number(&mut self, start: usize, line: usize, column: usize) -> Result<TokenKind, ScriptError> {
        self.skip_digits();

        let mut is_float = false;
        if self.peek() == Some('.') {
            // A dot only continues the number when a digit follows ("1...")
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|(_, c)| c.is_ascii_digit()) {
                self.advance();
                self.skip_digits();
                is_float = true;
            }
        }

        // Exponent only when digits follow ("2east" stays a number and an ident)
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let mut next = lookahead.next().map(|(_, c)| c);
            if matches!(next, Some('+' | '-')) {
                next = lookahead.next().map(|(_, c)| c);
            }
            if next.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.skip_digits();
                is_float = true;
            }
        }

        let end = self.offset();
        let text = &self.source[start..end];
        let invalid = || ScriptError::LexerError {
            line,
            column,
            message: format!("Invalid number: {}", text),
        };

        if is_float {
            text.parse().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            text.parse().map(TokenKind::Int).map_err(|_| invalid())
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Parse an identifier
    fn identifier(&mut self, start: usize) -> TokenKind {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let end = self.offset();
        TokenKind::Ident(self.source[start..end].to_string())
    }
}
