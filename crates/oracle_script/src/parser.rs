//! Parser for command invocations
//!
//! Grammar:
//!
//! ```text
//! invocation := IDENT value*
//! value      := [IDENT ':'] atom
//! atom       := INT | FLOAT | STRING | IDENT | '(' value* ')'
//! ```
//!
//! Values may be separated by whitespace or commas. Bare identifiers are
//! `Const` values, except `true`/`false` which are booleans.

use thiserror::Error;

use oracle_command::{Invocation, ParamValue};

use crate::lexer::{Lexer, Token, TokenKind};
use crate::ScriptResult;

/// Parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at {line}:{column}")]
    Expected {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("Unexpected token {found} at {line}:{column}")]
    UnexpectedToken {
        found: String,
        line: usize,
        column: usize,
    },

    #[error("Parentheses nested deeper than {} at {line}:{column}", MAX_NESTING)]
    NestingTooDeep { line: usize, column: usize },
}

/// Deepest `(` nesting accepted in values and signatures
pub const MAX_NESTING: usize = 64;

/// One invocation per script line
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub invocation: Invocation,
}

/// Token cursor shared by the invocation and signature grammars
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser over a token stream
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column + 1)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, line, column));
        }
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parse a full invocation line
    pub fn parse_invocation(&mut self) -> Result<Invocation, ParseError> {
        let keyword = self.consume_ident("command name")?;
        let params = self.value_list(|kind| matches!(kind, TokenKind::Eof))?;
        self.expect_end()?;
        Ok(Invocation::new(keyword, params))
    }

    /// Parse a single value, optionally named
    pub fn parse_value(&mut self) -> Result<ParamValue, ParseError> {
        if let (Some(TokenKind::Ident(name)), Some(TokenKind::Colon)) = (self.peek_kind(0), self.peek_kind(1)) {
            let name = name.clone();
            self.advance();
            self.advance();
            return Ok(self.atom()?.with_name(name));
        }
        self.atom()
    }

    /// Parse an unnamed value
    pub(crate) fn atom(&mut self) -> Result<ParamValue, ParseError> {
        let token = self.advance();
        let value = match &token.kind {
            TokenKind::Int(n) => ParamValue::integer(*n),
            TokenKind::Float(x) => ParamValue::float(*x),
            TokenKind::String(s) => ParamValue::string(s.clone()),
            TokenKind::Ident(word) => match word.as_str() {
                "true" => ParamValue::boolean(true),
                "false" => ParamValue::boolean(false),
                _ => ParamValue::constant(word.clone()),
            },
            TokenKind::LParen => {
                self.enter_nesting(&token)?;
                let children = self.value_list(|kind| matches!(kind, TokenKind::RParen))?;
                self.consume(&TokenKind::RParen, "')'")?;
                self.leave_nesting();
                ParamValue::array(children)
            }
            _ => return Err(unexpected(&token)),
        };
        Ok(value)
    }

    /// Values up to (not including) a closing token
    fn value_list<F>(&mut self, is_close: F) -> Result<Vec<ParamValue>, ParseError>
    where
        F: Fn(&TokenKind) -> bool,
    {
        let mut values = Vec::new();
        loop {
            let kind = self.peek().kind.clone();
            if is_close(&kind) {
                return Ok(values);
            }
            if matches!(kind, TokenKind::Eof) {
                return Err(self.expected("')'"));
            }
            values.push(self.parse_value()?);
            self.match_token(&TokenKind::Comma);
        }
    }

    // === Token helpers ===

    pub(crate) fn enter_nesting(&mut self, open: &Token) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                line: open.line,
                column: open.column,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(expected))
        }
    }

    pub(crate) fn consume_ident(&mut self, expected: &str) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(name);
        }
        Err(self.expected(expected))
    }

    pub(crate) fn expect_end(&self) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(unexpected(self.peek()))
        }
    }

    pub(crate) fn expected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::Expected {
            expected: expected.to_string(),
            found: token.kind.describe(),
            line: token.line,
            column: token.column,
        }
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.kind.describe(),
        line: token.line,
        column: token.column,
    }
}

/// Parse a single invocation such as `spawn octorok 3 at: (4, 5)`
pub fn parse_invocation(source: &str) -> ScriptResult<Invocation> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Parser::new(tokens).parse_invocation()?)
}

/// Parse a single value such as `(1, 2)` or `speed: 2.5`
pub fn parse_value(source: &str) -> ScriptResult<ParamValue> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let value = parser.parse_value()?;
    parser.expect_end()?;
    Ok(value)
}

/// Parse a script, one invocation per line. Blank and comment-only lines
/// are skipped.
pub fn parse_script(source: &str) -> ScriptResult<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let tokens = Lexer::new(text).starting_at(line).tokenize()?;
        if matches!(tokens.first().map(|t| &t.kind), Some(TokenKind::Eof)) {
            continue;
        }
        let invocation = Parser::new(tokens).parse_invocation()?;
        lines.push(ScriptLine { line, invocation });
    }
    log::debug!("Parsed {} script lines", lines.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptError;
    use oracle_command::ParamType;

    #[test]
    fn test_parse_invocation() {
        let invocation = parse_invocation("spawn octorok 3 at: (4, -5) \"big one\"").unwrap();
        assert_eq!(invocation.keyword, "spawn");

        let params = invocation.params.children();
        assert_eq!(params.len(), 4);
        assert_eq!(params[0], ParamValue::constant("octorok"));
        assert_eq!(params[1].as_int(), Some(3));
        assert_eq!(params[2].name(), Some("at"));
        assert_eq!(params[2].child(1).and_then(ParamValue::as_int), Some(-5));
        assert_eq!(params[3].as_str(), Some("big one"));
    }

    #[test]
    fn test_commas_are_optional() {
        let spaced = parse_invocation("move 1 2 3").unwrap();
        let commas = parse_invocation("move 1, 2, 3").unwrap();
        assert_eq!(spaced, commas);
    }

    #[test]
    fn test_booleans_and_constants() {
        let invocation = parse_invocation("flag true FALSE").unwrap();
        assert_eq!(invocation.params.child(0), Some(&ParamValue::boolean(true)));
        assert_eq!(
            invocation.params.child(1).map(ParamValue::param_type),
            Some(ParamType::Const)
        );
    }

    #[test]
    fn test_nested_arrays() {
        let value = parse_value("((1, 2), (3, 4.5))").unwrap();
        assert_eq!(value.child_count(), 2);
        assert_eq!(value.child(1).and_then(|p| p.child(1)).and_then(ParamValue::as_float), Some(4.5));
    }

    #[test]
    fn test_display_parses_back() {
        let value = ParamValue::array(vec![
            ParamValue::integer(1).with_name("x"),
            ParamValue::string("a b"),
            ParamValue::array(vec![ParamValue::constant("north")]).with_name("dir"),
        ]);
        assert_eq!(parse_value(&value.to_string()).unwrap(), value);
    }

    #[test]
    fn test_float_display_parses_back() {
        for x in [1e20, 1.5e-7, -2.5e300, 0.1, 3.0] {
            let value = ParamValue::float(x);
            assert_eq!(parse_value(&value.to_string()).unwrap(), value);
        }
    }

    #[test]
    fn test_errors() {
        let err = parse_invocation("(1, 2)").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(ParseError::Expected { column: 1, .. })));

        let err = parse_invocation("move (1, 2").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(ParseError::Expected { .. })));

        let err = parse_invocation("move 1)").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(ParseError::UnexpectedToken { column: 7, .. })));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = format!("{}{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse_value(&nested).is_ok());

        let err = parse_invocation(&format!("spawn {}", "(".repeat(200_000))).unwrap_err();
        assert_eq!(
            err,
            ScriptError::ParseError(ParseError::NestingTooDeep {
                line: 1,
                column: 7 + MAX_NESTING,
            })
        );
    }

    #[test]
    fn test_parse_script() {
        let source = "// setup\nspawn torch\n\n  move 1 2 // go\n";
        let lines = parse_script(source).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 2);
        assert_eq!(lines[1].line, 4);
        assert_eq!(lines[1].invocation.keyword, "move");
    }

    #[test]
    fn test_script_error_reports_line() {
        let err = parse_script("spawn torch\nmove ,\n").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(ParseError::UnexpectedToken { line: 2, .. })));
    }
}
