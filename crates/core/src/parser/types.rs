use super::Parser;
use crate::ast::{FieldDecl, TypeExpr};
use crate::error::Diagnostic;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Type parsing -------------------------------------------

    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        self.nested(Self::parse_union_type)
    }

    fn parse_union_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        // A leading '|' is allowed: `type T = | A | B`
        self.eat(&Token::Pipe);
        let first = self.parse_array_type()?;
        if self.peek() != &Token::Pipe {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.eat(&Token::Pipe) {
            members.push(self.parse_array_type()?);
        }
        Ok(TypeExpr::Union(members))
    }

    fn parse_array_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        let mut ty = self.parse_base_type()?;
        while self.peek() == &Token::LBracket && self.peek_at(1) == &Token::RBracket {
            self.advance();
            self.advance();
            ty = TypeExpr::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_base_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        match self.peek().clone() {
            Token::Word(name) => {
                self.advance();
                if self.eat(&Token::Lt) {
                    let mut args = vec![self.parse_type()?];
                    while self.eat(&Token::Comma) {
                        args.push(self.parse_type()?);
                    }
                    self.expect(Token::Gt, ">")?;
                    return Ok(TypeExpr::Generic { name, args });
                }
                Ok(TypeExpr::Named(name))
            }
            Token::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                while self.peek() != &Token::RBracket {
                    elems.push(self.parse_type()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket, "]")?;
                Ok(TypeExpr::Tuple(elems))
            }
            Token::LBrace => Ok(TypeExpr::Shape(self.parse_shape_body()?)),
            Token::LParen => {
                let is_function = self
                    .after_matching_paren()
                    .is_some_and(|i| self.tokens[i].token == Token::Arrow);
                if is_function {
                    self.parse_function_type()
                } else {
                    self.advance();
                    let inner = self.parse_type()?;
                    self.expect(Token::RParen, ")")?;
                    Ok(inner)
                }
            }
            other => Err(self.err(format!("expected type, got {:?}", other))),
        }
    }

    fn parse_function_type(&mut self) -> Result<TypeExpr, Diagnostic> {
        self.expect(Token::LParen, "(")?;
        let mut params = Vec::new();
        while self.peek() != &Token::RParen {
            // Parameter names in function types are documentation only.
            self.take_word()?;
            self.eat(&Token::Question);
            self.expect(Token::Colon, ":")?;
            params.push(self.parse_type()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        self.expect(Token::Arrow, "=>")?;
        let ret = self.parse_type()?;
        Ok(TypeExpr::Function {
            params,
            ret: Box::new(ret),
        })
    }

    /// `{ name: T; other?: U }` -- members separated by `;` or `,`.
    pub(super) fn parse_shape_body(&mut self) -> Result<Vec<FieldDecl>, Diagnostic> {
        self.expect(Token::LBrace, "{")?;
        let mut fields: Vec<FieldDecl> = Vec::new();
        while self.peek() != &Token::RBrace {
            let line = self.cur_line();
            let name = self.take_property_name()?;
            if fields.iter().any(|f| f.name == name) {
                return Err(self.err(format!("duplicate property '{}'", name)));
            }
            let optional = self.eat(&Token::Question);
            self.expect(Token::Colon, ":")?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl {
                name,
                ty,
                optional,
                line,
            });
            if !self.eat(&Token::Semi) && !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "}")?;
        Ok(fields)
    }
}
