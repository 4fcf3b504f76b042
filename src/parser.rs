//! Recursive-descent parser with one token of lookahead.
//!
//! Statements and expressions share the `Node` type because the grammar lets
//! them flow into each other: a `for` initializer holds declarations, a
//! `cin` target is parsed with the ordinary variable-statement dispatch, and
//! `putchar` is valid in expression position.

use crate::ast::{BinOpKind, IfArm, Node, NodeArena, OutKind, Param, UnaryOpKind};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::intern::Symbol;
use crate::lexer::Lexer;
use crate::token::{IoKind, Token, TokenKind, TypeTag};

pub type ParseResult<T> = Result<T, SyntaxError>;

pub struct Parser<'a, 's, 'i> {
    lexer: Lexer<'s, 'i>,
    arena: &'a NodeArena,
    cur: Token,
}

impl<'a, 's, 'i> Parser<'a, 's, 'i> {
    pub fn new(mut lexer: Lexer<'s, 'i>, arena: &'a NodeArena) -> ParseResult<Self> {
        let cur = lexer.next_token()?;
        Ok(Parser { lexer, arena, cur })
    }

    /// Parse the token stream into the program's root scope.
    pub fn parse(mut self) -> ParseResult<&'a Node<'a>> {
        self.scoped()
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn advance(&mut self) -> ParseResult<Token> {
        let prev = self.cur;
        self.cur = self.lexer.next_token()?;
        Ok(prev)
    }

    /// Consume the current token, which must have the given kind.
    fn eat(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.cur.kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(kind))
        }
    }

    /// Consume the current token only if it has the given kind.
    fn eat_opt(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.cur.kind == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn eat_type(&mut self) -> ParseResult<TypeTag> {
        match self.cur.kind {
            TokenKind::Type(tag) => {
                self.advance()?;
                Ok(tag)
            }
            _ => Err(self.unexpected(TokenKind::Type(TypeTag::Int))),
        }
    }

    fn eat_ident(&mut self) -> ParseResult<Symbol> {
        if self.cur.kind == TokenKind::Ident {
            Ok(self.advance()?.lexeme)
        } else {
            Err(self.unexpected(TokenKind::Ident))
        }
    }

    fn unexpected(&self, expected: TokenKind) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken {
                expected,
                found: self.cur.kind,
            },
            self.cur.span,
        )
    }

    fn expected_expression(&self) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::ExpectedExpression {
                found: self.cur.kind,
            },
            self.cur.span,
        )
    }

    /// Run an optional production and fail if it matched nothing.
    fn expect<F>(&mut self, production: F) -> ParseResult<&'a Node<'a>>
    where
        F: FnOnce(&mut Self) -> ParseResult<Option<&'a Node<'a>>>,
    {
        match production(self)? {
            Some(node) => Ok(node),
            None => Err(self.expected_expression()),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn scoped(&mut self) -> ParseResult<&'a Node<'a>> {
        let block = self.block(false)?;
        Ok(self.arena.node(Node::Scope(block)))
    }

    fn block(&mut self, single_statement: bool) -> ParseResult<&'a Node<'a>> {
        let children = if single_statement {
            let (node, needs_separator) = self.statement(true, true)?;
            if needs_separator {
                self.eat_opt(TokenKind::Semi)?;
            }
            match node {
                Some(node) => vec![node],
                None => Vec::new(),
            }
        } else {
            self.statements(TokenKind::Semi, true, true)?
        };
        Ok(self.arena.node(Node::Block(self.arena.nodes(children))))
    }

    /// Parse statements separated by `separator` until one fails to appear.
    fn statements(
        &mut self,
        separator: TokenKind,
        allow_block: bool,
        allow_ret: bool,
    ) -> ParseResult<Vec<&'a Node<'a>>> {
        let mut items = Vec::new();
        loop {
            let (node, needs_separator) = self.statement(allow_block, allow_ret)?;
            if let Some(node) = node {
                items.push(node);
            }
            if needs_separator && !self.eat_opt(separator)? {
                break;
            }
        }
        Ok(items)
    }

    /// One statement. The second half of the pair says whether the caller
    /// still owes a separator; brace-delimited constructs consume their own
    /// ending. `None` means the current token cannot begin a statement.
    fn statement(
        &mut self,
        allow_block: bool,
        allow_ret: bool,
    ) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        match self.cur.kind {
            TokenKind::LBrace => {
                self.advance()?;
                let scope = self.scoped()?;
                self.eat(TokenKind::RBrace)?;
                Ok((Some(scope), false))
            }
            TokenKind::Type(_) => self.decl_statement(allow_block),
            TokenKind::Ident => Ok((Some(self.var_statement()?), true)),
            TokenKind::Return if allow_ret => {
                self.advance()?;
                let value = self.expect(Self::expr)?;
                Ok((Some(self.arena.node(Node::Ret(value))), true))
            }
            TokenKind::For if allow_block => self.for_statement(),
            TokenKind::While if allow_block => self.while_statement(),
            TokenKind::If if allow_block => self.if_statement(),
            TokenKind::Io(kind) => self.io_statement(kind),
            _ => Ok((None, true)),
        }
    }

    /// One or more comma-separated declarations sharing a type keyword, or a
    /// function declaration. Either way the result is wrapped in a block so
    /// a multi-declarator statement stays a single statement.
    fn decl_statement(&mut self, allow_fn: bool) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        let ty = self.eat_type()?;
        let name = self.eat_ident()?;

        if self.cur.kind == TokenKind::LParen {
            if !allow_fn {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::MisplacedFunction,
                    self.cur.span,
                ));
            }
            let decl = self.fn_decl(ty, name)?;
            let children = self.arena.nodes(vec![decl]);
            return Ok((Some(self.arena.node(Node::Block(children))), false));
        }

        let mut decls = vec![self.var_decl(ty, name)?];
        while self.eat_opt(TokenKind::Comma)? {
            let next = self.eat_ident()?;
            decls.push(self.var_decl(ty, next)?);
        }
        let children = self.arena.nodes(decls);
        Ok((Some(self.arena.node(Node::Block(children))), true))
    }

    /// Declarator after `type name`: array dimensions, an initializer, or a
    /// bare scalar defaulting to zero.
    fn var_decl(&mut self, ty: TypeTag, name: Symbol) -> ParseResult<&'a Node<'a>> {
        if self.cur.kind == TokenKind::LBracket {
            let mut dims = Vec::new();
            while self.eat_opt(TokenKind::LBracket)? {
                dims.push(self.expect(Self::expr)?);
                self.eat(TokenKind::RBracket)?;
            }
            let dims = self.arena.nodes(dims);
            return Ok(self.arena.node(Node::ArrDecl { name, ty, dims }));
        }

        let init = if self.eat_opt(TokenKind::Assign)? {
            self.expect(Self::expr)?
        } else {
            self.arena.node(Node::Num(0))
        };
        Ok(self.arena.node(Node::VarDecl { name, ty, init }))
    }

    fn fn_decl(&mut self, ret: TypeTag, name: Symbol) -> ParseResult<&'a Node<'a>> {
        self.eat(TokenKind::LParen)?;
        let mut params = Vec::new();
        while self.cur.kind != TokenKind::RParen {
            let ty = self.eat_type()?;
            let param = self.eat_ident()?;
            params.push(Param { name: param, ty });
            if self.cur.kind == TokenKind::RParen {
                break;
            }
            self.eat(TokenKind::Comma)?;
        }
        self.eat(TokenKind::RParen)?;
        self.eat(TokenKind::LBrace)?;
        let body = self.block(false)?;
        self.eat(TokenKind::RBrace)?;

        let params = self.arena.params(params);
        Ok(self.arena.node(Node::FnDecl {
            ret,
            name,
            params,
            body,
        }))
    }

    /// Statement starting at an identifier: assignment, call, array access
    /// (optionally assigned), or a bare variable. Also used for `cin`
    /// targets and identifier factors.
    fn var_statement(&mut self) -> ParseResult<&'a Node<'a>> {
        let name = self.eat_ident()?;

        if self.eat_opt(TokenKind::Assign)? {
            let value = self.expect(Self::expr)?;
            let target = self.arena.node(Node::Var(name));
            return Ok(self.arena.node(Node::Assign { target, value }));
        }

        if self.eat_opt(TokenKind::LParen)? {
            let mut args = Vec::new();
            if self.cur.kind != TokenKind::RParen {
                loop {
                    args.push(self.expect(Self::expr)?);
                    if !self.eat_opt(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.eat(TokenKind::RParen)?;
            let args = self.arena.nodes(args);
            return Ok(self.arena.node(Node::FnCall { name, args }));
        }

        if self.cur.kind == TokenKind::LBracket {
            let mut indices = Vec::new();
            while self.eat_opt(TokenKind::LBracket)? {
                indices.push(self.expect(Self::expr)?);
                self.eat(TokenKind::RBracket)?;
            }
            let indices = self.arena.nodes(indices);
            let access = self.arena.node(Node::ArrAccess { name, indices });
            if self.eat_opt(TokenKind::Assign)? {
                let value = self.expect(Self::expr)?;
                return Ok(self.arena.node(Node::Assign {
                    target: access,
                    value,
                }));
            }
            return Ok(access);
        }

        Ok(self.arena.node(Node::Var(name)))
    }

    fn for_statement(&mut self) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        self.eat(TokenKind::For)?;
        self.eat(TokenKind::LParen)?;
        let init = self.statements(TokenKind::Comma, false, false)?;
        self.eat(TokenKind::Semi)?;
        let cond = self.expr()?;
        self.eat(TokenKind::Semi)?;
        let update = self.expr_list()?;
        self.eat(TokenKind::RParen)?;
        let body = self.control_body()?;

        let init = self.arena.nodes(init);
        let update = self.arena.nodes(update);
        Ok((
            Some(self.arena.node(Node::For {
                init,
                cond,
                update,
                body,
            })),
            false,
        ))
    }

    fn while_statement(&mut self) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        self.eat(TokenKind::While)?;
        self.eat(TokenKind::LParen)?;
        let cond = self.expect(Self::expr)?;
        self.eat(TokenKind::RParen)?;
        let body = self.control_body()?;
        Ok((Some(self.arena.node(Node::While { cond, body })), false))
    }

    fn if_statement(&mut self) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        self.eat(TokenKind::If)?;
        self.eat(TokenKind::LParen)?;
        let cond = self.expect(Self::expr)?;
        self.eat(TokenKind::RParen)?;
        let body = self.control_body()?;

        let mut arms = vec![IfArm { cond, body }];
        let mut else_body = None;
        while self.eat_opt(TokenKind::Else)? {
            if self.eat_opt(TokenKind::If)? {
                self.eat(TokenKind::LParen)?;
                let cond = self.expect(Self::expr)?;
                self.eat(TokenKind::RParen)?;
                let body = self.control_body()?;
                arms.push(IfArm { cond, body });
            } else {
                else_body = Some(self.control_body()?);
                break;
            }
        }

        let arms = self.arena.arms(arms);
        Ok((Some(self.arena.node(Node::If { arms, else_body })), false))
    }

    /// Body of a control-flow header: a braced block, or a single statement
    /// when the brace is absent.
    fn control_body(&mut self) -> ParseResult<&'a Node<'a>> {
        let braced = self.eat_opt(TokenKind::LBrace)?;
        let body = self.block(!braced)?;
        if braced {
            self.eat(TokenKind::RBrace)?;
        }
        Ok(body)
    }

    fn io_statement(&mut self, kind: IoKind) -> ParseResult<(Option<&'a Node<'a>>, bool)> {
        self.advance()?;
        let node = match kind {
            IoKind::Putchar => self.putchar_call()?,
            IoKind::Cin => {
                let mut targets = Vec::new();
                while self.eat_opt(TokenKind::Shr)? {
                    targets.push(self.var_statement()?);
                }
                let targets = self.arena.nodes(targets);
                self.arena.node(Node::IoIn { targets })
            }
            IoKind::Cout => {
                let mut items = Vec::new();
                while self.eat_opt(TokenKind::Shl)? {
                    items.push(self.out_item()?);
                }
                let items = self.arena.nodes(items);
                self.arena.node(Node::IoOut {
                    kind: OutKind::Cout,
                    items,
                })
            }
        };
        Ok((Some(node), true))
    }

    /// One `cout` item: a character literal, the identifier `endl`, or any
    /// expression.
    fn out_item(&mut self) -> ParseResult<&'a Node<'a>> {
        if self.cur.kind == TokenKind::CharLit {
            let token = self.advance()?;
            return Ok(self.arena.node(Node::Char(token.lexeme)));
        }
        if self.cur.kind == TokenKind::Ident && self.lexer.resolve(self.cur.lexeme) == "endl" {
            let token = self.advance()?;
            return Ok(self.arena.node(Node::Char(token.lexeme)));
        }
        self.expect(Self::expr)
    }

    fn putchar_call(&mut self) -> ParseResult<&'a Node<'a>> {
        self.eat(TokenKind::LParen)?;
        let arg = self.expect(Self::expr)?;
        self.eat(TokenKind::RParen)?;
        let items = self.arena.nodes(vec![arg]);
        Ok(self.arena.node(Node::IoOut {
            kind: OutKind::Putchar,
            items,
        }))
    }

    // ------------------------------------------------------------------
    // Expressions, lowest precedence first
    // ------------------------------------------------------------------

    /// Comma-separated expression list; empty when no expression starts.
    fn expr_list(&mut self) -> ParseResult<Vec<&'a Node<'a>>> {
        let mut items = Vec::new();
        loop {
            match self.expr()? {
                Some(node) => items.push(node),
                None => break,
            }
            if !self.eat_opt(TokenKind::Comma)? {
                break;
            }
        }
        Ok(items)
    }

    /// Full expression; assignment chains to the right.
    fn expr(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(target) = self.or_expr()? else {
            return Ok(None);
        };
        if self.eat_opt(TokenKind::Assign)? {
            let value = self.expect(Self::expr)?;
            return Ok(Some(self.arena.node(Node::Assign { target, value })));
        }
        Ok(Some(target))
    }

    fn or_expr(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.and_expr()? else {
            return Ok(None);
        };
        while self.eat_opt(TokenKind::OrOr)? {
            let rhs = self.expect(Self::and_expr)?;
            node = self.arena.node(Node::Bin {
                op: BinOpKind::Or,
                lhs: node,
                rhs,
            });
        }
        Ok(Some(node))
    }

    fn and_expr(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.xor_expr()? else {
            return Ok(None);
        };
        while self.eat_opt(TokenKind::AndAnd)? {
            let rhs = self.expect(Self::xor_expr)?;
            node = self.arena.node(Node::Bin {
                op: BinOpKind::And,
                lhs: node,
                rhs,
            });
        }
        Ok(Some(node))
    }

    fn xor_expr(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.equality()? else {
            return Ok(None);
        };
        while self.eat_opt(TokenKind::Caret)? {
            let rhs = self.expect(Self::equality)?;
            node = self.arena.node(Node::Bin {
                op: BinOpKind::Xor,
                lhs: node,
                rhs,
            });
        }
        Ok(Some(node))
    }

    fn equality(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.relational()? else {
            return Ok(None);
        };
        loop {
            let op = match self.cur.kind {
                TokenKind::EqEq => BinOpKind::Eq,
                TokenKind::NotEq => BinOpKind::NotEq,
                _ => break,
            };
            self.advance()?;
            let rhs = self.expect(Self::relational)?;
            node = self.arena.node(Node::Bin { op, lhs: node, rhs });
        }
        Ok(Some(node))
    }

    fn relational(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.additive()? else {
            return Ok(None);
        };
        loop {
            let op = match self.cur.kind {
                TokenKind::Lt => BinOpKind::Lt,
                TokenKind::LtEq => BinOpKind::LtEq,
                TokenKind::Gt => BinOpKind::Gt,
                TokenKind::GtEq => BinOpKind::GtEq,
                _ => break,
            };
            self.advance()?;
            let rhs = self.expect(Self::additive)?;
            node = self.arena.node(Node::Bin { op, lhs: node, rhs });
        }
        Ok(Some(node))
    }

    fn additive(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.term()? else {
            return Ok(None);
        };
        loop {
            let op = match self.cur.kind {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Subtract,
                _ => break,
            };
            self.advance()?;
            let rhs = self.expect(Self::term)?;
            node = self.arena.node(Node::Bin { op, lhs: node, rhs });
        }
        Ok(Some(node))
    }

    fn term(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        let Some(mut node) = self.factor()? else {
            return Ok(None);
        };
        loop {
            let op = match self.cur.kind {
                TokenKind::Star => BinOpKind::Multiply,
                TokenKind::Slash => BinOpKind::Divide,
                TokenKind::Percent => BinOpKind::Modulo,
                _ => break,
            };
            self.advance()?;
            let rhs = self.expect(Self::factor)?;
            node = self.arena.node(Node::Bin { op, lhs: node, rhs });
        }
        Ok(Some(node))
    }

    fn factor(&mut self) -> ParseResult<Option<&'a Node<'a>>> {
        match self.cur.kind {
            TokenKind::Int => {
                let token = self.advance()?;
                let value: i32 = self
                    .lexer
                    .resolve(token.lexeme)
                    .parse()
                    .map_err(|_| SyntaxError::new(SyntaxErrorKind::IntegerTooLarge, token.span))?;
                Ok(Some(self.arena.node(Node::Num(value))))
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not => {
                let op = match self.cur.kind {
                    TokenKind::Plus => UnaryOpKind::Plus,
                    TokenKind::Minus => UnaryOpKind::Negate,
                    _ => UnaryOpKind::Not,
                };
                self.advance()?;
                let operand = self.expect(Self::factor)?;
                Ok(Some(self.arena.node(Node::Unary { op, operand })))
            }
            TokenKind::LParen => {
                self.advance()?;
                let node = self.expect(Self::expr)?;
                self.eat(TokenKind::RParen)?;
                Ok(Some(node))
            }
            TokenKind::Io(IoKind::Putchar) => {
                self.advance()?;
                Ok(Some(self.putchar_call()?))
            }
            TokenKind::Io(_) => Err(self.expected_expression()),
            TokenKind::Ident => Ok(Some(self.var_statement()?)),
            _ => Ok(None),
        }
    }
}
