//! Tokenizer for whittle scripts
//!
//! Whitespace and `//` comments are skipped. Every token records its byte
//! range and the line it starts on.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,

    // Keywords
    Fn,
    Class,
    If,
    Else,
    While,
    Return,
    Let,
    True,
    False,
    Null,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,

    Eof,
}

impl TokenKind {
    fn keyword(text: &str) -> Option<Self> {
        Some(match text {
            "fn" => TokenKind::Fn,
            "class" => TokenKind::Class,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "let" => TokenKind::Let,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }
}

/// A token with its kind and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub line: usize,
}

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
}

impl LexerError {
    fn new(message: impl Into<String>, offset: usize, line: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            line,
        }
    }
}

/// Split `input` into tokens, ending with [`TokenKind::Eof`]
pub fn lex(input: &str) -> Result<Vec<Token>, LexerError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1usize;

    while i < bytes.len() {
        let start = i;
        let b = bytes[i];

        match b {
            b'\n' => {
                line += 1;
                i += 1;
                continue;
            }
            b' ' | b'\t' | b'\r' => {
                i += 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            _ => {}
        }

        let kind = match b {
            b'(' => single(&mut i, TokenKind::LParen),
            b')' => single(&mut i, TokenKind::RParen),
            b'{' => single(&mut i, TokenKind::LBrace),
            b'}' => single(&mut i, TokenKind::RBrace),
            b',' => single(&mut i, TokenKind::Comma),
            b';' => single(&mut i, TokenKind::Semi),
            b'+' => single(&mut i, TokenKind::Plus),
            b'-' => single(&mut i, TokenKind::Minus),
            b'*' => single(&mut i, TokenKind::Star),
            b'/' => single(&mut i, TokenKind::Slash),
            b'%' => single(&mut i, TokenKind::Percent),
            b'=' => pair(bytes, &mut i, b'=', TokenKind::EqEq, TokenKind::Assign),
            b'!' => pair(bytes, &mut i, b'=', TokenKind::NotEq, TokenKind::Bang),
            b'<' => pair(bytes, &mut i, b'=', TokenKind::Le, TokenKind::Lt),
            b'>' => pair(bytes, &mut i, b'=', TokenKind::Ge, TokenKind::Gt),
            b'&' | b'|' => {
                if bytes.get(i + 1) != Some(&b) {
                    return Err(LexerError::new(
                        format!("expected '{0}{0}'", b as char),
                        start,
                        line,
                    ));
                }
                i += 2;
                if b == b'&' {
                    TokenKind::AndAnd
                } else {
                    TokenKind::OrOr
                }
            }
            b'"' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(LexerError::new("unterminated string", start, line));
                        }
                        Some(b'\\') => i += 2,
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                TokenKind::Str
            }
            b'0'..=b'9' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                TokenKind::Number
            }
            b if b == b'_' || b.is_ascii_alphabetic() => {
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                TokenKind::keyword(&input[start..i]).unwrap_or(TokenKind::Ident)
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(LexerError::new(
                    format!("unexpected character '{ch}'"),
                    start,
                    line,
                ));
            }
        };

        tokens.push(Token {
            kind,
            span: start..i,
            line,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: bytes.len()..bytes.len(),
        line,
    });
    Ok(tokens)
}

fn single(i: &mut usize, kind: TokenKind) -> TokenKind {
    *i += 1;
    kind
}

fn pair(bytes: &[u8], i: &mut usize, next: u8, long: TokenKind, short: TokenKind) -> TokenKind {
    if bytes.get(*i + 1) == Some(&next) {
        *i += 2;
        long
    } else {
        *i += 1;
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_operators() {
        assert_eq!(
            kinds("let x = a <= b && !c;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Ident,
                TokenKind::Le,
                TokenKind::Ident,
                TokenKind::AndAnd,
                TokenKind::Bang,
                TokenKind::Ident,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let tokens = lex("// header\nf(); // trailing\n  g();").unwrap();
        let g = &tokens[4];
        assert_eq!(g.kind, TokenKind::Ident);
        assert_eq!(g.line, 3);
        assert_eq!(g.span, 29..30);
    }

    #[test]
    fn string_escapes() {
        let tokens = lex(r#"print("a \"b\"");"#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str);
        assert_eq!(tokens[2].span, 6..15);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("let s = \"open;\nf();").unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn single_ampersand_is_an_error() {
        assert!(lex("a & b").is_err());
    }
}
