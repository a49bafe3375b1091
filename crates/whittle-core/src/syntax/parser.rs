//! Recursive-descent parser producing owned [`Node`] trees

use super::column_at;
use super::lexer::{Token, TokenKind, lex};
use super::node::{Field, Node, NodeKind, Span};
use crate::{Result, WhittleError};

/// Binding power of a binary operator, higher binds tighter
pub(crate) fn precedence(op: &str) -> Option<u8> {
    Some(match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | ">" | "<=" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => return None,
    })
}

fn binary_op(kind: TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::OrOr => "||",
        TokenKind::AndAnd => "&&",
        TokenKind::EqEq => "==",
        TokenKind::NotEq => "!=",
        TokenKind::Lt => "<",
        TokenKind::Gt => ">",
        TokenKind::Le => "<=",
        TokenKind::Ge => ">=",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        _ => return None,
    })
}

/// Parse a whole file into its top-level statements
pub fn parse(source: &str) -> Result<Vec<Node>> {
    let tokens = lex(source).map_err(|e| {
        WhittleError::parse_error(e.message, e.line, column_at(source, e.offset))
    })?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };

    let mut stmts = Vec::new();
    while !parser.at(TokenKind::Eof) {
        stmts.push(parser.statement()?);
    }
    Ok(stmts)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, message: String) -> WhittleError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", self.text(token))
        };
        WhittleError::parse_error(
            format!("{message}, found {found}"),
            token.line,
            column_at(self.source, token.span.start),
        )
    }

    fn text(&self, token: &Token) -> &'src str {
        &self.source[token.span.clone()]
    }

    fn span(token: &Token) -> Span {
        Span::new(token.span.start, token.span.end, token.line)
    }

    fn statement(&mut self) -> Result<Node> {
        match self.peek().kind {
            TokenKind::Fn if self.nth_kind(1) == TokenKind::Ident => self.function_decl(),
            TokenKind::Class => self.class_decl(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Return => {
                let keyword = self.advance();
                let value = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.expression()?)
                };
                let semi = self.expect(TokenKind::Semi, "';' after return")?;
                Ok(Node::from_parts(
                    NodeKind::Return,
                    Self::span(&keyword).to(Self::span(&semi)),
                    vec![Field::optional(value)],
                ))
            }
            TokenKind::Let => {
                let keyword = self.advance();
                let name = self.ident()?;
                let value = if self.eat(TokenKind::Assign) {
                    Some(self.expression()?)
                } else {
                    None
                };
                let semi = self.expect(TokenKind::Semi, "';' after let")?;
                Ok(Node::from_parts(
                    NodeKind::Let,
                    Self::span(&keyword).to(Self::span(&semi)),
                    vec![Field::node(name), Field::optional(value)],
                ))
            }
            TokenKind::LBrace => {
                let (stmts, span) = self.braced_statements()?;
                Ok(Node::from_parts(
                    NodeKind::Block,
                    span,
                    vec![Field::List(stmts)],
                ))
            }
            TokenKind::Semi => {
                let semi = self.advance();
                Ok(Node::nop(Self::span(&semi)))
            }
            _ => {
                let expr = self.expression()?;
                let semi = self.expect(TokenKind::Semi, "';' after expression")?;
                Ok(Node::from_parts(
                    NodeKind::ExprStmt,
                    expr.span().to(Self::span(&semi)),
                    vec![Field::node(expr)],
                ))
            }
        }
    }

    fn function_decl(&mut self) -> Result<Node> {
        let keyword = self.advance();
        let name = self.ident()?;
        let params = self.params()?;
        let (body, body_span) = self.braced_statements()?;
        Ok(Node::from_parts(
            NodeKind::FunctionDecl,
            Self::span(&keyword).to(body_span),
            vec![Field::node(name), Field::List(params), Field::List(body)],
        ))
    }

    fn class_decl(&mut self) -> Result<Node> {
        let keyword = self.advance();
        let name = self.ident()?;
        self.expect(TokenKind::LBrace, "'{' after class name")?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if !self.at(TokenKind::Fn) {
                return Err(self.error("expected method declaration".to_string()));
            }
            members.push(self.function_decl()?);
        }
        let close = self.advance();
        Ok(Node::from_parts(
            NodeKind::ClassDecl,
            Self::span(&keyword).to(Self::span(&close)),
            vec![Field::node(name), Field::List(members)],
        ))
    }

    fn if_stmt(&mut self) -> Result<Node> {
        let keyword = self.advance();
        let cond = self.condition()?;
        let then = self.statement()?;
        let otherwise = if self.eat(TokenKind::Else) {
            Some(self.statement()?)
        } else {
            None
        };
        let end = otherwise.as_ref().unwrap_or(&then).span();
        Ok(Node::from_parts(
            NodeKind::If,
            Self::span(&keyword).to(end),
            vec![Field::node(cond), Field::node(then), Field::optional(otherwise)],
        ))
    }

    fn while_stmt(&mut self) -> Result<Node> {
        let keyword = self.advance();
        let cond = self.condition()?;
        let body = self.statement()?;
        Ok(Node::from_parts(
            NodeKind::While,
            Self::span(&keyword).to(body.span()),
            vec![Field::node(cond), Field::node(body)],
        ))
    }

    fn condition(&mut self) -> Result<Node> {
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        Ok(cond)
    }

    fn braced_statements(&mut self) -> Result<(Vec<Node>, Span)> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.error("expected '}'".to_string()));
            }
            stmts.push(self.statement()?);
        }
        let close = self.advance();
        Ok((stmts, Self::span(&open).to(Self::span(&close))))
    }

    fn params(&mut self) -> Result<Vec<Node>> {
        self.expect(TokenKind::LParen, "'(' before parameters")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let name = self.ident()?;
                params.push(Node::from_parts(
                    NodeKind::Param,
                    name.span(),
                    vec![Field::node(name)],
                ));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' after parameters")?;
        Ok(params)
    }

    fn ident(&mut self) -> Result<Node> {
        let token = self.expect(TokenKind::Ident, "identifier")?;
        Ok(Node::from_parts(
            NodeKind::Ident,
            Self::span(&token),
            vec![Field::leaf(self.text(&token))],
        ))
    }

    fn expression(&mut self) -> Result<Node> {
        let target = self.binary(1)?;
        if !self.at(TokenKind::Assign) {
            return Ok(target);
        }
        if target.kind() != NodeKind::Variable {
            return Err(self.error("invalid assignment target".to_string()));
        }
        self.advance();
        let value = self.expression()?;
        Ok(Node::from_parts(
            NodeKind::Assign,
            target.span().to(value.span()),
            vec![Field::node(target), Field::node(value)],
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Node> {
        let mut lhs = self.unary()?;
        while let Some(op) = binary_op(self.peek().kind) {
            let prec = precedence(op).unwrap_or(0);
            if prec < min_precedence {
                break;
            }
            self.advance();
            let rhs = self.binary(prec + 1)?;
            lhs = Node::from_parts(
                NodeKind::Binary,
                lhs.span().to(rhs.span()),
                vec![Field::node(lhs), Field::leaf(op), Field::node(rhs)],
            );
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Node> {
        if !matches!(self.peek().kind, TokenKind::Bang | TokenKind::Minus) {
            return self.primary();
        }
        let op = self.advance();
        let operand = self.unary()?;
        Ok(Node::from_parts(
            NodeKind::Unary,
            Self::span(&op).to(operand.span()),
            vec![Field::leaf(self.text(&op)), Field::node(operand)],
        ))
    }

    fn primary(&mut self) -> Result<Node> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number
            | TokenKind::Str
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                self.advance();
                Ok(Node::from_parts(
                    NodeKind::Literal,
                    Self::span(&token),
                    vec![Field::leaf(self.text(&token))],
                ))
            }
            TokenKind::Ident if self.nth_kind(1) == TokenKind::LParen => self.call(),
            TokenKind::Ident => {
                self.advance();
                Ok(Node::from_parts(
                    NodeKind::Variable,
                    Self::span(&token),
                    vec![Field::leaf(self.text(&token))],
                ))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Fn => {
                self.advance();
                let params = self.params()?;
                let (body, body_span) = self.braced_statements()?;
                Ok(Node::from_parts(
                    NodeKind::Closure,
                    Self::span(&token).to(body_span),
                    vec![Field::List(params), Field::List(body)],
                ))
            }
            _ => Err(self.error("expected expression".to_string())),
        }
    }

    fn call(&mut self) -> Result<Node> {
        let callee = self.ident()?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let value = self.expression()?;
                args.push(Node::from_parts(
                    NodeKind::Arg,
                    value.span(),
                    vec![Field::node(value)],
                ));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "')' after arguments")?;
        Ok(Node::from_parts(
            NodeKind::Call,
            callee.span().to(Self::span(&close)),
            vec![Field::node(callee), Field::List(args)],
        ))
    }
}
