use std::rc::Rc;

use super::Parser;
use crate::ast::{
    ClassDecl, ClassField, EnumDecl, EnumInit, EnumMember, ExprKind, Function, FunctionBody,
    InterfaceDecl, Method, Stmt, StmtKind, Visibility,
};
use crate::error::Diagnostic;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Statement parsing --------------------------------------

    pub(super) fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let line = self.cur_line();
        if let Token::Word(w) = self.peek().clone() {
            match w.as_str() {
                "let" | "const" => return self.parse_let(w == "const", line),
                "enum" => return self.parse_enum(line),
                "interface" => return self.parse_interface(line),
                "class" => return self.parse_class(line),
                // `type` is also a legal property name; only `type Name =` is an alias.
                "type" if matches!(self.peek_at(1), Token::Word(_))
                    && self.peek_at(2) == &Token::Assign =>
                {
                    return self.parse_type_alias(line)
                }
                "throw" => {
                    self.advance();
                    let e = self.parse_expr()?;
                    self.end_statement()?;
                    return Ok(Stmt::new(StmtKind::Throw(e), line));
                }
                "return" => {
                    self.advance();
                    let value = match self.peek() {
                        Token::Semi | Token::RBrace | Token::Eof => None,
                        _ => Some(self.parse_expr()?),
                    };
                    self.end_statement()?;
                    return Ok(Stmt::new(StmtKind::Return(value), line));
                }
                "break" => {
                    self.advance();
                    self.end_statement()?;
                    return Ok(Stmt::new(StmtKind::Break, line));
                }
                "if" => return self.parse_if(line),
                "while" => {
                    self.advance();
                    self.expect(Token::LParen, "(")?;
                    let cond = self.parse_expr()?;
                    self.expect(Token::RParen, ")")?;
                    let body = self.parse_block()?;
                    return Ok(Stmt::new(StmtKind::While { cond, body }, line));
                }
                _ => {}
            }
        }

        let expr = self.parse_expr()?;
        if self.eat(&Token::Assign) {
            if !matches!(
                expr.kind,
                ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
            ) {
                return Err(Diagnostic::parse(
                    &self.filename,
                    line,
                    "invalid assignment target",
                ));
            }
            let value = self.parse_expr()?;
            self.end_statement()?;
            return Ok(Stmt::new(
                StmtKind::Assign {
                    target: expr,
                    value,
                },
                line,
            ));
        }
        self.end_statement()?;
        Ok(Stmt::new(StmtKind::Expr(expr), line))
    }

    pub(super) fn parse_block(&mut self) -> Result<Vec<Stmt>, Diagnostic> {
        self.expect(Token::LBrace, "{")?;
        let mut stmts = Vec::new();
        while self.peek() != &Token::RBrace {
            if self.peek() == &Token::Eof {
                return Err(self.err("unexpected end of input, expected '}'"));
            }
            if self.eat(&Token::Semi) {
                continue;
            }
            stmts.push(self.nested(Self::parse_stmt)?);
        }
        self.expect(Token::RBrace, "}")?;
        Ok(stmts)
    }

    fn parse_let(&mut self, constant: bool, line: u32) -> Result<Stmt, Diagnostic> {
        self.advance();
        let name = self.take_word()?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(&Token::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        if constant && init.is_none() {
            return Err(Diagnostic::parse(
                &self.filename,
                line,
                format!("'const' declaration '{}' must be initialized", name),
            ));
        }
        self.end_statement()?;
        Ok(Stmt::new(
            StmtKind::Let {
                name,
                ty,
                init,
                constant,
            },
            line,
        ))
    }

    fn parse_enum(&mut self, line: u32) -> Result<Stmt, Diagnostic> {
        self.expect_word("enum")?;
        let name = self.take_word()?;
        self.expect(Token::LBrace, "{")?;
        let mut members: Vec<EnumMember> = Vec::new();
        while self.peek() != &Token::RBrace {
            let member_line = self.cur_line();
            let member = self.take_property_name()?;
            if members.iter().any(|m| m.name == member) {
                return Err(self.err(format!("duplicate enum member '{}'", member)));
            }
            let init = if self.eat(&Token::Assign) {
                let negative = self.eat(&Token::Minus);
                match self.peek().clone() {
                    Token::Number(n) => {
                        self.advance();
                        Some(EnumInit::Number(if negative { -n } else { n }))
                    }
                    Token::Str(s) if !negative => {
                        self.advance();
                        Some(EnumInit::Str(s))
                    }
                    other => {
                        return Err(self.err(format!(
                            "enum initializer must be a number or string literal, got {:?}",
                            other
                        )))
                    }
                }
            } else {
                None
            };
            members.push(EnumMember {
                name: member,
                init,
                line: member_line,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "}")?;
        Ok(Stmt::new(
            StmtKind::Enum(Rc::new(EnumDecl {
                name,
                members,
                line,
            })),
            line,
        ))
    }

    fn parse_interface(&mut self, line: u32) -> Result<Stmt, Diagnostic> {
        self.expect_word("interface")?;
        let name = self.take_word()?;
        let fields = self.parse_shape_body()?;
        Ok(Stmt::new(
            StmtKind::Interface(InterfaceDecl { name, fields, line }),
            line,
        ))
    }

    fn parse_type_alias(&mut self, line: u32) -> Result<Stmt, Diagnostic> {
        self.expect_word("type")?;
        let name = self.take_word()?;
        self.expect(Token::Assign, "=")?;
        let ty = self.parse_type()?;
        self.end_statement()?;
        Ok(Stmt::new(StmtKind::TypeAlias { name, ty }, line))
    }

    fn parse_if(&mut self, line: u32) -> Result<Stmt, Diagnostic> {
        self.expect_word("if")?;
        self.expect(Token::LParen, "(")?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen, ")")?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.is_word("else") {
            self.advance();
            if self.is_word("if") {
                let nested_line = self.cur_line();
                Some(vec![self.parse_if(nested_line)?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            line,
        ))
    }

    fn parse_class(&mut self, line: u32) -> Result<Stmt, Diagnostic> {
        self.expect_word("class")?;
        let name = self.take_word()?;
        self.expect(Token::LBrace, "{")?;
        let mut class = ClassDecl {
            name,
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            line,
        };
        while self.peek() != &Token::RBrace {
            if self.eat(&Token::Semi) {
                continue;
            }
            let member_line = self.cur_line();
            let visibility = if self.is_word("private") {
                self.advance();
                Visibility::Private
            } else {
                if self.is_word("public") {
                    self.advance();
                }
                Visibility::Public
            };
            let member = self.take_word()?;
            if class.field(&member).is_some() || class.method(&member).is_some() {
                return Err(self.err(format!("duplicate class member '{}'", member)));
            }

            if self.peek() == &Token::LParen {
                let params = self.parse_params()?;
                let ret = if self.eat(&Token::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let body = self.parse_block()?;
                let func = Rc::new(Function {
                    params,
                    ret,
                    body: FunctionBody::Block(body),
                    line: member_line,
                });
                if member == "constructor" {
                    if class.constructor.is_some() {
                        return Err(self.err("a class may only have one constructor"));
                    }
                    class.constructor = Some(func);
                } else {
                    class.methods.push(Method {
                        name: member,
                        visibility,
                        func,
                    });
                }
                continue;
            }

            let optional = self.eat(&Token::Question);
            self.expect(Token::Colon, ":")?;
            let ty = self.parse_type()?;
            let init = if self.eat(&Token::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.end_statement()?;
            class.fields.push(ClassField {
                name: member,
                ty,
                optional,
                visibility,
                init,
                line: member_line,
            });
        }
        self.expect(Token::RBrace, "}")?;
        Ok(Stmt::new(StmtKind::Class(Rc::new(class)), line))
    }
}
