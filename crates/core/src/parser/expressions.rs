use std::rc::Rc;

use super::Parser;
use crate::ast::{
    BinaryOp, Expr, ExprKind, Function, FunctionBody, Literal, Param, TemplatePart, UnaryOp,
};
use crate::error::Diagnostic;
use crate::lexer::{TemplateChunk, Token};

impl<'a> Parser<'a> {
    // -- Expression parsing -------------------------------------
    //
    // equality := as_expr (('===' | '!==') as_expr)*
    // as_expr  := additive ('as' type)*
    // additive := unary (('+' | '-') unary)*
    // unary    := ('!' | '-' | 'typeof') unary | postfix
    // postfix  := primary ('.' name | '[' expr ']' | '(' args ')')*

    pub(super) fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.nested(Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_as_expr()?;
        loop {
            let op = match self.peek() {
                Token::StrictEq => BinaryOp::StrictEq,
                Token::StrictNe => BinaryOp::StrictNe,
                _ => return Ok(left),
            };
            let line = self.cur_line();
            self.advance();
            let right = self.parse_as_expr()?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            );
        }
    }

    fn parse_as_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_additive()?;
        while self.is_word("as") {
            let line = self.cur_line();
            self.advance();
            let ty = self.parse_type()?;
            expr = Expr::new(
                ExprKind::As {
                    expr: Box::new(expr),
                    ty,
                },
                line,
            );
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            let line = self.cur_line();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            );
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let line = self.cur_line();
        let op = match self.peek() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            Token::Word(w) if w == "typeof" => UnaryOp::TypeOf,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        loop {
            let line = self.cur_line();
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let property = self.take_word()?;
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        line,
                    );
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket, "]")?;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        line,
                    );
                }
                Token::LParen => {
                    let args = self.parse_args()?;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        line,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        self.expect(Token::LParen, "(")?;
        let mut args = Vec::new();
        while self.peek() != &Token::RParen {
            args.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let line = self.cur_line();
        let lit = |l: Literal| Expr::new(ExprKind::Literal(l), line);
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(lit(Literal::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(lit(Literal::Str(s)))
            }
            Token::Template(chunks) => {
                self.advance();
                let mut parts = Vec::new();
                for chunk in chunks {
                    match chunk {
                        TemplateChunk::Text(t) => parts.push(TemplatePart::Text(t)),
                        TemplateChunk::Code { src, line } => {
                            let e = super::parse_expression_at(&src, &self.filename, line)?;
                            parts.push(TemplatePart::Expr(e));
                        }
                    }
                }
                Ok(Expr::new(ExprKind::Template(parts), line))
            }
            Token::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                while self.peek() != &Token::RBracket {
                    elems.push(self.parse_expr()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket, "]")?;
                Ok(Expr::new(ExprKind::Array(elems), line))
            }
            Token::LBrace => {
                self.advance();
                let mut props: Vec<(String, Expr)> = Vec::new();
                while self.peek() != &Token::RBrace {
                    let key = self.take_property_name()?;
                    if props.iter().any(|(k, _)| *k == key) {
                        return Err(self.err(format!("duplicate property '{}'", key)));
                    }
                    self.expect(Token::Colon, ":")?;
                    let value = self.parse_expr()?;
                    props.push((key, value));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace, "}")?;
                Ok(Expr::new(ExprKind::Object(props), line))
            }
            Token::LParen => {
                let is_arrow = self.after_matching_paren().is_some_and(|i| {
                    matches!(self.tokens[i].token, Token::Arrow | Token::Colon)
                });
                if is_arrow {
                    let func = self.parse_arrow()?;
                    return Ok(Expr::new(ExprKind::Arrow(Rc::new(func)), line));
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, ")")?;
                Ok(inner)
            }
            Token::Word(w) => match w.as_str() {
                "true" => {
                    self.advance();
                    Ok(lit(Literal::Bool(true)))
                }
                "false" => {
                    self.advance();
                    Ok(lit(Literal::Bool(false)))
                }
                "null" => {
                    self.advance();
                    Ok(lit(Literal::Null))
                }
                "undefined" => {
                    self.advance();
                    Ok(lit(Literal::Undefined))
                }
                "this" => {
                    self.advance();
                    Ok(Expr::new(ExprKind::This, line))
                }
                "new" => {
                    self.advance();
                    let class = self.take_word()?;
                    let args = if self.peek() == &Token::LParen {
                        self.parse_args()?
                    } else {
                        Vec::new()
                    };
                    Ok(Expr::new(ExprKind::New { class, args }, line))
                }
                _ if is_reserved(&w) => Err(self.err(format!("unexpected keyword '{}'", w))),
                _ => {
                    self.advance();
                    Ok(Expr::new(ExprKind::Ident(w), line))
                }
            },
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }

    /// `(params)[: R] => body`, cursor on `(`.
    pub(super) fn parse_arrow(&mut self) -> Result<Function, Diagnostic> {
        let line = self.cur_line();
        let params = self.parse_params()?;
        let ret = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(Token::Arrow, "=>")?;
        let body = if self.peek() == &Token::LBrace {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expr(Box::new(self.parse_expr()?))
        };
        Ok(Function {
            params,
            ret,
            body,
            line,
        })
    }

    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, Diagnostic> {
        self.expect(Token::LParen, "(")?;
        let mut params: Vec<Param> = Vec::new();
        while self.peek() != &Token::RParen {
            let line = self.cur_line();
            let name = self.take_word()?;
            if params.iter().any(|p| p.name == name) {
                return Err(self.err(format!("duplicate parameter '{}'", name)));
            }
            let optional = self.eat(&Token::Question);
            if !optional && params.last().is_some_and(|p| p.optional) {
                return Err(self.err("a required parameter cannot follow an optional parameter"));
            }
            let ty = if self.eat(&Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param {
                name,
                ty,
                optional,
                line,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        Ok(params)
    }
}

fn is_reserved(w: &str) -> bool {
    matches!(
        w,
        "let"
            | "const"
            | "enum"
            | "interface"
            | "class"
            | "throw"
            | "return"
            | "if"
            | "else"
            | "while"
            | "break"
            | "as"
            | "typeof"
    )
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::parse_expression;

    fn expr(src: &str) -> Expr {
        parse_expression(src, "test").unwrap_or_else(|e| panic!("{}", e))
    }

    #[test]
    fn assertion_then_member() {
        match expr("(ohhithere as string).length").kind {
            ExprKind::Member { object, property } => {
                assert_eq!(property, "length");
                assert!(matches!(
                    object.kind,
                    ExprKind::As { ty: TypeExpr::Named(ref n), .. } if n == "string"
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn enum_reverse_lookup_is_an_index() {
        assert!(matches!(
            expr("Size[2]").kind,
            ExprKind::Index { ref index, .. }
                if matches!(index.kind, ExprKind::Literal(Literal::Number(n)) if n == 2.0)
        ));
    }

    #[test]
    fn arrow_with_return_annotation_and_expression_body() {
        match expr(r#"(): void => console.log("Lalalala")"#).kind {
            ExprKind::Arrow(f) => {
                assert!(f.params.is_empty());
                assert_eq!(f.ret, Some(TypeExpr::Named("void".into())));
                assert!(matches!(f.body, FunctionBody::Expr(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn arrow_with_typed_param_and_block_body() {
        match expr(r#"(robots: RobotArmy) => { console.log("FIGHT!"); }"#).kind {
            ExprKind::Arrow(f) => {
                assert_eq!(f.params[0].name, "robots");
                assert!(matches!(f.body, FunctionBody::Block(ref b) if b.len() == 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn template_substitution_is_parsed() {
        match expr("`I'm only ${age}`").kind {
            ExprKind::Template(parts) => {
                assert!(matches!(parts[0], TemplatePart::Text(ref t) if t == "I'm only "));
                assert!(matches!(
                    parts[1],
                    TemplatePart::Expr(Expr { kind: ExprKind::Ident(ref n), .. }) if n == "age"
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn new_with_arguments() {
        assert!(matches!(
            expr(r#"new Animal("Lion")"#).kind,
            ExprKind::New { ref class, ref args } if class == "Animal" && args.len() == 1
        ));
    }

    #[test]
    fn typeof_comparison() {
        assert!(matches!(
            expr(r#"typeof confused === "string""#).kind,
            ExprKind::Binary { op: BinaryOp::StrictEq, ref left, .. }
                if matches!(left.kind, ExprKind::Unary { op: UnaryOp::TypeOf, .. })
        ));
    }

    #[test]
    fn string_concatenation_is_left_associative() {
        match expr(r#""Hello, " + this.sing + "!""#).kind {
            ExprKind::Binary { op: BinaryOp::Add, left, .. } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn object_literal_with_quoted_key() {
        assert!(matches!(
            expr(r#"{ count: 3, "type": "laser" }"#).kind,
            ExprKind::Object(ref props) if props.len() == 2 && props[1].0 == "type"
        ));
    }

    #[test]
    fn keyword_in_expression_position_is_rejected() {
        assert!(parse_expression("return", "test").is_err());
    }
}
