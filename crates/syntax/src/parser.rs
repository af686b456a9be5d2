//! Recursive-descent parser for Oker tokens → syntax tree.
//!
//! Precedence, lowest first: comparison, additive, multiplicative, unary
//! minus, primary. All binary operators are left-associative.

use crate::ast::{BinaryOp, Expr, ExprKind, FunctionDecl, Program, Stmt, StmtKind, UnaryOp};
use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};

/// Deepest nesting the parser accepts. Blocks, parentheses, call argument
/// lists, unary minus and each operator in a binary chain count one level.
///
/// Every later stage walks the tree recursively, so this also bounds their
/// stack use.
pub const MAX_NESTING_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Number of enclosing `makef` bodies.
    function_depth: usize,
    /// Current nesting level, see [`MAX_NESTING_DEPTH`].
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            function_depth: 0,
            depth: 0,
        }
    }

    // The stream is guaranteed non-empty and Eof-terminated by `parse`, so
    // clamping to the last token never walks past Eof.
    fn peek(&self) -> &'a Token {
        let idx = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn advance(&mut self) -> &'a Token {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let tok = self.peek();
        SyntaxError::Unexpected {
            expected: expected.to_string(),
            found: tok.describe(),
            line: tok.line,
            column: tok.column,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Open one nesting level at the current token.
    fn enter(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let tok = self.peek();
            return Err(SyntaxError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH,
                line: tok.line,
                column: tok.column,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, SyntaxError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(self.unexpected(what))
        }
    }

    // ---- statements ----

    fn program(&mut self) -> Result<Program, SyntaxError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    /// Statements up to (not including) one of `terminators`.
    fn block(
        &mut self,
        block: &'static str,
        opened_line: usize,
        terminators: &[TokenKind],
    ) -> Result<Vec<Stmt>, SyntaxError> {
        self.enter()?;
        let mut body = Vec::new();
        loop {
            let tok = self.peek();
            if terminators.contains(&tok.kind) {
                self.leave(1);
                return Ok(body);
            }
            if tok.kind == TokenKind::Eof {
                return Err(SyntaxError::UnclosedBlock {
                    block,
                    opened_line,
                    line: tok.line,
                    column: tok.column,
                });
            }
            body.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek().kind {
            TokenKind::Let => self.let_statement(),
            TokenKind::Say => self.say_statement(),
            TokenKind::Makef => self.function_declaration(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::End | TokenKind::Else => Err(self.unexpected("statement")),
            _ => {
                let expr = self.expression()?;
                let line = expr.line;
                Ok(Stmt::new(StmtKind::Expr(expr), line))
            }
        }
    }

    fn let_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line;
        let name = self.expect_identifier("variable name")?;
        self.expect(TokenKind::Assign)?;
        let value = self.expression()?;
        Ok(Stmt::new(StmtKind::Let { name, value }, line))
    }

    fn say_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line;
        let value = self.expression()?;
        Ok(Stmt::new(StmtKind::Say { value }, line))
    }

    fn function_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line;
        let name = self.expect_identifier("function name")?;
        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Colon)?;

        self.function_depth += 1;
        let body = self.block("makef", line, &[TokenKind::End]);
        self.function_depth -= 1;
        let body = body?;
        self.expect(TokenKind::End)?;

        Ok(Stmt::new(
            StmtKind::Function(FunctionDecl { name, params, body }),
            line,
        ))
    }

    fn if_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line;
        let condition = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let then_branch = self.block("if", line, &[TokenKind::Else, TokenKind::End])?;
        let else_branch = if self.eat(TokenKind::Else) {
            self.expect(TokenKind::Colon)?;
            Some(self.block("if", line, &[TokenKind::End])?)
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
        ))
    }

    fn while_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line;
        let condition = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let body = self.block("while", line, &[TokenKind::End])?;
        self.expect(TokenKind::End)?;
        Ok(Stmt::new(StmtKind::While { condition, body }, line))
    }

    fn return_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let keyword = self.advance();
        if self.function_depth == 0 {
            return Err(SyntaxError::ReturnOutsideFunction {
                line: keyword.line,
                column: keyword.column,
            });
        }
        let next = self.peek();
        let has_value = next.line == keyword.line
            && !matches!(next.kind, TokenKind::End | TokenKind::Else | TokenKind::Eof);
        let value = if has_value {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::new(StmtKind::Return { value }, keyword.line))
    }

    // ---- expressions ----

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.additive()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEqual => BinaryOp::Eq,
                TokenKind::BangEqual => BinaryOp::Neq,
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::LessEqual => BinaryOp::Lte,
                TokenKind::GreaterEqual => BinaryOp::Gte,
                _ => break,
            };
            self.enter()?;
            levels += 1;
            let line = self.advance().line;
            let right = self.additive()?;
            left = Expr::binary(op, left, right, line);
        }
        self.leave(levels);
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.multiplicative()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.enter()?;
            levels += 1;
            let line = self.advance().line;
            let right = self.multiplicative()?;
            left = Expr::binary(op, left, right, line);
        }
        self.leave(levels);
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.unary()?;
        let mut levels = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.enter()?;
            levels += 1;
            let line = self.advance().line;
            let right = self.unary()?;
            left = Expr::binary(op, left, right, line);
        }
        self.leave(levels);
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::Minus) {
            self.enter()?;
            let line = self.advance().line;
            let operand = self.unary()?;
            self.leave(1);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                line,
            ));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.peek();
        let kind = match tok.kind {
            TokenKind::Number => {
                let n: f64 = tok
                    .lexeme
                    .parse()
                    .map_err(|_| self.unexpected("number literal"))?;
                ExprKind::Number(n)
            }
            TokenKind::String => ExprKind::Str(tok.lexeme.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Nil => ExprKind::Nil,
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LeftParen) {
                    return self.call(tok);
                }
                return Ok(Expr::new(ExprKind::Identifier(tok.lexeme.clone()), tok.line));
            }
            TokenKind::LeftParen => {
                self.enter()?;
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RightParen)?;
                self.leave(1);
                return Ok(inner);
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(Expr::new(kind, tok.line))
    }

    fn call(&mut self, name: &Token) -> Result<Expr, SyntaxError> {
        self.enter()?;
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        self.leave(1);
        Ok(Expr::new(
            ExprKind::Call {
                callee: name.lexeme.clone(),
                args,
            },
            name.line,
        ))
    }
}

/// Parse a token stream into a program.
///
/// A stream missing its trailing `Eof` is treated as if it had one.
pub fn parse(tokens: &[Token]) -> Result<Program, SyntaxError> {
    let owned;
    let tokens = if tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
        tokens
    } else {
        let (line, column) = tokens
            .last()
            .map_or((1, 1), |t| (t.line, t.column + t.lexeme.chars().count()));
        let mut v = tokens.to_vec();
        v.push(Token::new(TokenKind::Eof, "", line, column));
        owned = v;
        &owned[..]
    };

    let program = Parser::new(tokens).program()?;
    tracing::debug!(statements = program.statements.len(), "parsed program");
    Ok(program)
}
