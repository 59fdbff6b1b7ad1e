use crate::error::Diagnostic;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords; distinguished in the parser
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Numeric literal
    Number(f64),
    /// Backtick template: literal text and raw `${...}` source chunks
    Template(Vec<TemplateChunk>),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semi,
    Comma,
    Dot,
    Question,
    // Operators
    Assign,   // =
    StrictEq, // ===
    StrictNe, // !==
    Bang,     // !
    Plus,
    Minus,
    Lt,
    Gt,
    Pipe,
    Arrow, // =>
    // End of input
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateChunk {
    Text(String),
    /// Source of a `${...}` substitution, re-lexed by the parser
    Code { src: String, line: u32 },
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, Diagnostic> {
    lex_from(src, filename, 1)
}

/// Lex `src` with line numbers starting at `first_line`.
pub fn lex_from(src: &str, filename: &str, first_line: u32) -> Result<Vec<Spanned>, Diagnostic> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = first_line;

    macro_rules! push {
        ($tok:expr, $line:expr, $width:expr) => {{
            tokens.push(Spanned {
                token: $tok,
                line: $line,
            });
            pos += $width;
            continue;
        }};
    }

    while pos < chars.len() {
        let c = chars[pos];
        let next = chars.get(pos + 1).copied();

        // Line comment
        if c == '/' && next == Some('/') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        // Block comment
        if c == '/' && next == Some('*') {
            pos += 2;
            loop {
                if pos >= chars.len() {
                    return Err(Diagnostic::lex(filename, line, "unterminated block comment"));
                }
                if chars[pos] == '\n' {
                    line += 1;
                }
                if chars[pos] == '*' && chars.get(pos + 1) == Some(&'/') {
                    pos += 2;
                    break;
                }
                pos += 1;
            }
            continue;
        }

        // Whitespace
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;

        // String literal, either quote style
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                let Some(&sc) = chars.get(pos) else {
                    return Err(Diagnostic::lex(
                        filename,
                        tok_line,
                        "unterminated string literal",
                    ));
                };
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    let Some(&esc) = chars.get(pos) else {
                        return Err(Diagnostic::lex(
                            filename,
                            tok_line,
                            "unterminated escape in string",
                        ));
                    };
                    s.push(unescape(esc));
                    pos += 1;
                    continue;
                }
                if sc == '\n' {
                    return Err(Diagnostic::lex(
                        filename,
                        tok_line,
                        "unterminated string literal",
                    ));
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        // Template literal
        if c == '`' {
            pos += 1;
            let mut chunks = Vec::new();
            let mut text = String::new();
            loop {
                let Some(&tc) = chars.get(pos) else {
                    return Err(Diagnostic::lex(
                        filename,
                        tok_line,
                        "unterminated template literal",
                    ));
                };
                match tc {
                    '`' => {
                        pos += 1;
                        break;
                    }
                    '\\' => {
                        pos += 1;
                        let Some(&esc) = chars.get(pos) else {
                            return Err(Diagnostic::lex(
                                filename,
                                tok_line,
                                "unterminated escape in template",
                            ));
                        };
                        text.push(unescape(esc));
                        pos += 1;
                    }
                    '$' if chars.get(pos + 1) == Some(&'{') => {
                        if !text.is_empty() {
                            chunks.push(TemplateChunk::Text(std::mem::take(&mut text)));
                        }
                        pos += 2;
                        let code_line = line;
                        let mut depth = 1usize;
                        let mut code = String::new();
                        loop {
                            let Some(&cc) = chars.get(pos) else {
                                return Err(Diagnostic::lex(
                                    filename,
                                    code_line,
                                    "unterminated '${' in template literal",
                                ));
                            };
                            pos += 1;
                            match cc {
                                // Braces inside a quoted string do not nest.
                                '"' | '\'' | '`' => {
                                    code.push(cc);
                                    while let Some(&qc) = chars.get(pos) {
                                        pos += 1;
                                        if qc == '\n' {
                                            line += 1;
                                        }
                                        code.push(qc);
                                        if qc == '\\' {
                                            if let Some(&escaped) = chars.get(pos) {
                                                code.push(escaped);
                                                pos += 1;
                                            }
                                        } else if qc == cc {
                                            break;
                                        }
                                    }
                                    continue;
                                }
                                '{' => depth += 1,
                                '}' => {
                                    depth -= 1;
                                    if depth == 0 {
                                        break;
                                    }
                                }
                                '\n' => line += 1,
                                _ => {}
                            }
                            code.push(cc);
                        }
                        chunks.push(TemplateChunk::Code {
                            src: code,
                            line: code_line,
                        });
                    }
                    other => {
                        if other == '\n' {
                            line += 1;
                        }
                        text.push(other);
                        pos += 1;
                    }
                }
            }
            if !text.is_empty() {
                chunks.push(TemplateChunk::Text(text));
            }
            tokens.push(Spanned {
                token: Token::Template(chunks),
                line: tok_line,
            });
            continue;
        }

        // Number
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos < chars.len()
                && chars[pos] == '.'
                && chars.get(pos + 1).is_some_and(|d| d.is_ascii_digit())
            {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let s: String = chars[start..pos].iter().collect();
            let n: f64 = s.parse().map_err(|_| {
                Diagnostic::lex(filename, tok_line, format!("invalid number '{}'", s))
            })?;
            tokens.push(Spanned {
                token: Token::Number(n),
                line: tok_line,
            });
            continue;
        }

        // Operators and punctuation
        match c {
            '=' => {
                if next == Some('>') {
                    push!(Token::Arrow, tok_line, 2);
                }
                if next == Some('=') {
                    if chars.get(pos + 2) == Some(&'=') {
                        push!(Token::StrictEq, tok_line, 3);
                    }
                    return Err(Diagnostic::lex(
                        filename,
                        tok_line,
                        "loose equality '==' is not supported, use '==='",
                    ));
                }
                push!(Token::Assign, tok_line, 1);
            }
            '!' => {
                if next == Some('=') {
                    if chars.get(pos + 2) == Some(&'=') {
                        push!(Token::StrictNe, tok_line, 3);
                    }
                    return Err(Diagnostic::lex(
                        filename,
                        tok_line,
                        "loose inequality '!=' is not supported, use '!=='",
                    ));
                }
                push!(Token::Bang, tok_line, 1);
            }
            '{' => push!(Token::LBrace, tok_line, 1),
            '}' => push!(Token::RBrace, tok_line, 1),
            '[' => push!(Token::LBracket, tok_line, 1),
            ']' => push!(Token::RBracket, tok_line, 1),
            '(' => push!(Token::LParen, tok_line, 1),
            ')' => push!(Token::RParen, tok_line, 1),
            ':' => push!(Token::Colon, tok_line, 1),
            ';' => push!(Token::Semi, tok_line, 1),
            ',' => push!(Token::Comma, tok_line, 1),
            '.' => push!(Token::Dot, tok_line, 1),
            '?' => push!(Token::Question, tok_line, 1),
            '+' => push!(Token::Plus, tok_line, 1),
            '-' => push!(Token::Minus, tok_line, 1),
            '<' => push!(Token::Lt, tok_line, 1),
            '>' => push!(Token::Gt, tok_line, 1),
            '|' => push!(Token::Pipe, tok_line, 1),
            _ => {}
        }

        // Identifier / keyword
        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = pos;
            while pos < chars.len()
                && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '$')
            {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                line: tok_line,
            });
            continue;
        }

        return Err(Diagnostic::lex(
            filename,
            tok_line,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src, "test").unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_annotated_let() {
        assert_eq!(
            kinds("let age: number = 56;"),
            vec![
                Token::Word("let".into()),
                Token::Word("age".into()),
                Token::Colon,
                Token::Word("number".into()),
                Token::Assign,
                Token::Number(56.0),
                Token::Semi,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_arrow_and_strict_equality() {
        assert_eq!(
            kinds("=> === !== = !"),
            vec![
                Token::Arrow,
                Token::StrictEq,
                Token::StrictNe,
                Token::Assign,
                Token::Bang,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn single_quotes_and_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "a\tb""#),
            vec![
                Token::Str("it's".into()),
                Token::Str("a\tb".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn template_splits_text_and_code() {
        let toks = kinds("`I'm only ${age}!`");
        assert_eq!(
            toks[0],
            Token::Template(vec![
                TemplateChunk::Text("I'm only ".into()),
                TemplateChunk::Code {
                    src: "age".into(),
                    line: 1
                },
                TemplateChunk::Text("!".into()),
            ])
        );
    }

    #[test]
    fn template_code_may_contain_braces() {
        let toks = kinds("`${ {a: 1}.a }`");
        assert_eq!(
            toks[0],
            Token::Template(vec![TemplateChunk::Code {
                src: " {a: 1}.a ".into(),
                line: 1
            }])
        );
    }

    #[test]
    fn template_code_may_quote_braces() {
        let toks = kinds("`${\"}\"}|${'{'}|${\"\\\"}\"}`");
        assert_eq!(
            toks[0],
            Token::Template(vec![
                TemplateChunk::Code {
                    src: "\"}\"".into(),
                    line: 1
                },
                TemplateChunk::Text("|".into()),
                TemplateChunk::Code {
                    src: "'{'".into(),
                    line: 1
                },
                TemplateChunk::Text("|".into()),
                TemplateChunk::Code {
                    src: "\"\\\"}\"".into(),
                    line: 1
                },
            ])
        );
        assert_eq!(toks[1], Token::Eof);
        assert!(lex("`${\"}`", "test").is_err());
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let toks = lex("// one\n/* two\nthree */ x", "test").unwrap();
        assert_eq!(toks[0].token, Token::Word("x".into()));
        assert_eq!(toks[0].line, 3);
    }

    #[test]
    fn fractional_numbers() {
        assert_eq!(kinds("3.25")[0], Token::Number(3.25));
    }

    #[test]
    fn loose_equality_is_rejected() {
        let err = lex("a == b", "test").unwrap_err();
        assert!(err.message.contains("'==='"));
    }

    #[test]
    fn unterminated_string_reports_line() {
        let err = lex("\n\"abc", "test").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unterminated string"));
    }
}
