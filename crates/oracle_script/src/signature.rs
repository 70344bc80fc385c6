//! Signature parser
//!
//! Builds [`ReferenceParam`] trees from the compact signature syntax used in
//! command manifests:
//!
//! ```text
//! signature := [param (',' param)*]
//! param     := type ['...'] [IDENT] ['=' atom]
//! type      := 'string' | 'int' | 'integer' | 'float' | 'bool' | 'boolean'
//!            | 'var' | 'any' | 'const' | '(' signature ')' | IDENT
//! ```
//!
//! `const loop` declares the literal `loop`. Any other identifier names a
//! custom type. `parse_signature` wraps its parameters in the root array a
//! command overload expects.

use oracle_command::{ParamType, ReferenceParam};

use crate::lexer::{Lexer, TokenKind};
use crate::parser::{ParseError, Parser};
use crate::ScriptResult;

impl Parser {
    /// Parse a comma separated parameter list into an array reference
    pub fn parse_signature(&mut self) -> Result<ReferenceParam, ParseError> {
        let params = self.param_list(&TokenKind::Eof)?;
        self.expect_end()?;
        Ok(ReferenceParam::array(params))
    }

    /// Parse one parameter declaration
    pub fn parse_reference(&mut self) -> Result<ReferenceParam, ParseError> {
        let mut reference = if self.check(&TokenKind::LParen) {
            let open = self.advance();
            self.enter_nesting(&open)?;
            let children = self.param_list(&TokenKind::RParen)?;
            self.consume(&TokenKind::RParen, "')'")?;
            self.leave_nesting();
            ReferenceParam::array(children)
        } else {
            let keyword = self.consume_ident("parameter type")?;
            match builtin_type(&keyword) {
                Some(ParamType::Const) => {
                    let literal = self.consume_ident("constant literal")?;
                    ReferenceParam::constant(literal)
                }
                Some(ty) => ReferenceParam::of(ty),
                None => ReferenceParam::custom(keyword),
            }
        };

        if self.match_token(&TokenKind::Ellipsis) {
            reference = reference.variadic();
        }
        // Constants are already named by their literal
        if reference.param_type() != Some(ParamType::Const) && self.check(&TokenKind::Ident(String::new())) {
            let name = self.consume_ident("parameter name")?;
            reference = reference.named(name);
        }
        if self.match_token(&TokenKind::Eq) {
            let default = self.atom()?;
            reference = reference.with_default(default);
        }
        Ok(reference)
    }

    fn param_list(&mut self, close: &TokenKind) -> Result<Vec<ReferenceParam>, ParseError> {
        let mut params = Vec::new();
        if self.check(close) {
            return Ok(params);
        }
        loop {
            params.push(self.parse_reference()?);
            if !self.match_token(&TokenKind::Comma) {
                return Ok(params);
            }
        }
    }
}

fn builtin_type(keyword: &str) -> Option<ParamType> {
    let ty = match keyword {
        "string" => ParamType::String,
        "int" | "integer" => ParamType::Integer,
        "float" => ParamType::Float,
        "bool" | "boolean" => ParamType::Boolean,
        "var" | "any" => ParamType::Any,
        "const" => ParamType::Const,
        _ => return None,
    };
    Some(ty)
}

/// Parse a command overload such as `string name, int count = 1`
pub fn parse_signature(source: &str) -> ScriptResult<ReferenceParam> {
    let tokens = Lexer::new(source).tokenize()?;
    Ok(Parser::new(tokens).parse_signature()?)
}

/// Parse a single parameter declaration such as `(int x, int y) pos`
pub fn parse_reference(source: &str) -> ScriptResult<ReferenceParam> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    let reference = parser.parse_reference()?;
    parser.expect_end()?;
    Ok(reference)
}
