//! Recursive-descent parser for the tycat example language.
//!
//! Every node carries the line of its first token. No name resolution or
//! type checking happens here -- that is the checker's job.
use crate::ast::{Expr, Program};
use crate::error::Diagnostic;
use crate::lexer::{self, Spanned, Token};

mod expressions;
mod statements;
mod types;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

/// Deepest nesting of expressions, types and blocks the parser accepts.
const MAX_NESTING: usize = 200;

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
    depth: usize,
}

/// Parse a whole source file.
pub fn parse(src: &str, filename: &str) -> Result<Program, Diagnostic> {
    let tokens = lexer::lex(src, filename)?;
    let mut p = Parser::new(&tokens, filename);
    p.parse_program()
}

/// Parse a single expression, rejecting trailing input.
pub fn parse_expression(src: &str, filename: &str) -> Result<Expr, Diagnostic> {
    parse_expression_at(src, filename, 1)
}

pub(crate) fn parse_expression_at(
    src: &str,
    filename: &str,
    first_line: u32,
) -> Result<Expr, Diagnostic> {
    let tokens = lexer::lex_from(src, filename, first_line)?;
    let mut p = Parser::new(&tokens, filename);
    let expr = p.parse_expr()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!("unexpected {:?} after expression", p.peek())));
    }
    Ok(expr)
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
            depth: 0,
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Diagnostic>,
    ) -> Result<T, Diagnostic> {
        if self.depth >= MAX_NESTING {
            return Err(self.err(format!("nesting deeper than {} levels", MAX_NESTING)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let i = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[i].token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> Diagnostic {
        Diagnostic::parse(&self.filename, self.cur_line(), msg)
    }

    fn expect(&mut self, tok: Token, shown: &str) -> Result<(), Diagnostic> {
        if self.peek() == &tok {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', got {:?}", shown, self.peek())))
        }
    }

    /// Consume `tok` if it is next.
    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<u32, Diagnostic> {
        let s = self.cur();
        let line = s.line;
        if let Token::Word(w) = &s.token {
            if w == expected {
                self.advance();
                return Ok(line);
            }
        }
        Err(self.err(format!("expected '{}', got {:?}", expected, self.peek())))
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn take_word(&mut self) -> Result<String, Diagnostic> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {:?}", self.peek())))
        }
    }

    /// Property names may be identifiers or quoted strings.
    fn take_property_name(&mut self) -> Result<String, Diagnostic> {
        match self.peek().clone() {
            Token::Word(w) | Token::Str(w) => {
                self.advance();
                Ok(w)
            }
            other => Err(self.err(format!("expected property name, got {:?}", other))),
        }
    }

    /// Statement terminator: `;` is optional before `}` and end of input.
    fn end_statement(&mut self) -> Result<(), Diagnostic> {
        if self.eat(&Token::Semi) {
            return Ok(());
        }
        match self.peek() {
            Token::RBrace | Token::Eof => Ok(()),
            // A newline also ends a statement when the next token starts a new one.
            _ if self.pos > 0 && self.tokens[self.pos - 1].line < self.cur_line() => Ok(()),
            other => Err(self.err(format!("expected ';', got {:?}", other))),
        }
    }

    /// Index of the token after the `)` matching the `(` at the cursor.
    fn after_matching_paren(&self) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = self.pos;
        while i < self.tokens.len() {
            match self.tokens[i].token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                Token::Eof => return None,
                _ => {}
            }
            i += 1;
        }
        None
    }

    fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let mut stmts = Vec::new();
        while self.peek() != &Token::Eof {
            if self.eat(&Token::Semi) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program { stmts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn program(src: &str) -> Program {
        parse(src, "test").unwrap_or_else(|e| panic!("{}", e))
    }

    #[test]
    fn deep_nesting_is_a_parse_error() {
        let deep = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        let err = parse_expression(&deep, "test").unwrap_err();
        assert!(err.message.contains("nesting deeper than"), "{}", err);

        let blocks = format!("{}{}", "if (true) {".repeat(5_000), "}".repeat(5_000));
        assert!(parse(&blocks, "test").is_err());
        assert!(parse_expression(&"!".repeat(5_000), "test").is_err());
        assert!(parse("let t: ((((number)))) = 1;", "test").is_ok());
        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_expression(&shallow, "test").is_ok());
    }

    #[test]
    fn parses_the_annotated_declarations() {
        let p = program(
            r#"
            let isCool: boolean = false;
            let pets: string[] = ["cat", "mouse", "dragon"];
            let pets2: Array<string> = ["pig", "lion", "dragon"];
            let basket: [string, number];
            basket = ["basketball", 10];
            "#,
        );
        assert_eq!(p.stmts.len(), 5);
        match &p.stmts[1].kind {
            StmtKind::Let { name, ty, .. } => {
                assert_eq!(name, "pets");
                assert_eq!(
                    ty.as_ref(),
                    Some(&TypeExpr::Array(Box::new(TypeExpr::Named("string".into()))))
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        match &p.stmts[2].kind {
            StmtKind::Let { ty: Some(TypeExpr::Generic { name, args }), .. } => {
                assert_eq!(name, "Array");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &p.stmts[3].kind {
            StmtKind::Let { init, ty, .. } => {
                assert!(init.is_none());
                assert!(matches!(ty, Some(TypeExpr::Tuple(ts)) if ts.len() == 2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(p.stmts[4].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn lines_are_recorded() {
        let p = program("let a = 1;\n\nlet b = 2;");
        assert_eq!(p.stmts[0].line, 1);
        assert_eq!(p.stmts[1].line, 3);
    }

    #[test]
    fn semicolons_are_optional_across_lines() {
        let p = program("let a = 1\nlet b = a");
        assert_eq!(p.stmts.len(), 2);
    }

    #[test]
    fn missing_semicolon_on_same_line_is_an_error() {
        let err = parse("let a = 1 let b = 2", "test").unwrap_err();
        assert!(err.message.contains("expected ';'"));
    }

    #[test]
    fn parse_expression_rejects_trailing_tokens() {
        assert!(parse_expression("Size[2]", "expr").is_ok());
        assert!(parse_expression("Size[2] 3", "expr").is_err());
    }
}
