//! Builds the abstract-syntax-tree and the scope-tree out of the token-stream

use crate::compiler::common::{ast::*, environment::*, error::*, token::*};
use std::iter::Peekable;
use std::vec::IntoIter;

pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    env: ScopeArena,

    // non-fatal diagnostics picked up along the way, printed by the caller
    warnings: Vec<Error>,
}
impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
            env: ScopeArena::new(),
            warnings: Vec::new(),
        }
    }

    /// Parses a whole translation-unit. The first structural mismatch aborts
    /// the compilation, there is no error-recovery.
    pub fn parse(mut self) -> Result<(Vec<FuncDef>, Vec<Error>), Vec<Error>> {
        let mut funcs = Vec::new();

        while !self.check(&TokenKind::Eof) {
            match self.function_definition() {
                Ok(func) => funcs.push(func),
                Err(e) => return Err(vec![e]),
            }
        }

        Ok((funcs, self.warnings))
    }

    fn function_definition(&mut self) -> Result<FuncDef, Error> {
        let type_token = self.next("expected function definition")?;
        let return_type = self.type_of(&type_token)?;

        let name_token = self.consume(
            TokenKind::Ident(String::new()),
            "expect function name after return type",
        )?;
        let name = name_token.unwrap_string();

        self.consume(TokenKind::LeftParen, "expect '(' after function name")?;

        // parameters live in their own scope enclosing the body, and their
        // slots are the first ones of the new frame
        self.env.begin_frame();
        self.env.enter();
        let params = self.params(&name_token)?;
        self.consume(TokenKind::RightParen, "expect ')' after parameters")?;

        self.consume(TokenKind::LeftBrace, "expect '{' to begin function body")?;
        let body = self.block()?;
        self.env.exit();

        Ok(FuncDef {
            return_type,
            name,
            params,
            body,
            stack_size: self.env.frame_size(),
        })
    }

    fn params(&mut self, name_token: &Token) -> Result<Vec<VarRef>, Error> {
        let mut params = Vec::new();

        if !self.check(&TokenKind::RightParen) {
            loop {
                let type_token = self.next("expected parameter declaration")?;
                let ty = self.type_of(&type_token)?;
                let param_token =
                    self.consume(TokenKind::Ident(String::new()), "expect parameter name")?;
                let param_name = param_token.unwrap_string();

                let (var, redeclared) = self.env.declare_var(&param_name, ty, true);
                if redeclared {
                    self.warnings
                        .push(Error::new(&param_token, ErrorKind::Redeclaration(param_name)));
                }
                params.push(var);

                if self.matches(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }

        // all arguments are passed in registers, of which there are 6
        if params.len() > 6 {
            return Err(Error::new(
                name_token,
                ErrorKind::TooManyParams(name_token.unwrap_string(), params.len()),
            ));
        }
        Ok(params)
    }

    fn block(&mut self) -> Result<Block, Error> {
        let scope = self.env.enter();
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.check(&TokenKind::Eof) {
            stmts.push(self.statement()?);
        }
        self.consume(TokenKind::RightBrace, "expect '}' after block")?;
        self.env.exit();

        Ok(Block { stmts, scope })
    }

    fn statement(&mut self) -> Result<Stmt, Error> {
        if self.matches(&[TokenKind::Semicolon]).is_some() {
            return Ok(Stmt::Expr(Expr::Nop));
        }
        if self.matches(&[TokenKind::LeftBrace]).is_some() {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.matches(&[TokenKind::Return]).is_some() {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "expect ';' after return value")?;
            return Ok(Stmt::Return(expr));
        }
        if self.matches(&[TokenKind::If]).is_some() {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::While]).is_some() {
            return self.while_statement();
        }

        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "expect ';' after expression")?;
        Ok(Stmt::Expr(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt, Error> {
        self.consume(TokenKind::LeftParen, "expect '(' after 'if'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "expect ')' after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = match self.matches(&[TokenKind::Else]) {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };
        Ok(Stmt::If(cond, then_branch, else_branch))
    }

    fn while_statement(&mut self) -> Result<Stmt, Error> {
        self.consume(TokenKind::LeftParen, "expect '(' after 'while'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "expect ')' after condition")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::While(cond, body))
    }

    fn expression(&mut self) -> Result<Expr, Error> {
        self.binary_expression(0)
    }

    // precedence-climbing over the operator table in [binary_op]
    fn binary_expression(&mut self, min_prec: usize) -> Result<Expr, Error> {
        let mut left = self.primary()?;

        loop {
            let (op, prec) = match binary_op(&self.peek()?.kind) {
                Some(entry) if entry.1 >= min_prec => entry,
                _ => break,
            };
            let op_token = self.next("expected operator")?;

            // '=' and '==' bind to the right, the arithmetic levels to the left
            let right_prec = if prec == 0 { prec } else { prec + 1 };
            let right = self.binary_expression(right_prec)?;

            if let BinOpKind::Assign = op {
                match &left {
                    Expr::Var(var) => var.borrow_mut().initialized = true,
                    _ => {
                        return Err(Error::new(
                            &op_token,
                            ErrorKind::NotAssignable(left.to_string()),
                        ))
                    }
                }
            }

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, Error> {
        let token = self.next("expected expression")?;
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::CharLit(c) => Ok(Expr::Number(c as i32)),
            TokenKind::LeftParen => {
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "expect ')' after grouping")?;
                Ok(expr)
            }
            TokenKind::Plus => self.primary(),
            TokenKind::Minus => match self.peek()?.kind {
                // literals are negated directly, everything else is scaled by -1
                TokenKind::Number(n) => {
                    self.next("expected number")?;
                    Ok(Expr::Number(-n))
                }
                _ => Ok(Expr::Binary {
                    op: BinOpKind::Mul,
                    left: Box::new(Expr::Number(-1)),
                    right: Box::new(self.primary()?),
                }),
            },
            TokenKind::Ident(..) => {
                let name = token.unwrap_string();
                if let Some(ty) = self.env.get_type(&name) {
                    return self.declaration(ty);
                }
                if self.check(&TokenKind::LeftParen) {
                    return self.call(token);
                }
                match self.env.get_var(&name) {
                    Some(var) => Ok(Expr::Var(var)),
                    None => Err(Error::new(&token, ErrorKind::UndeclaredSymbol(name))),
                }
            }
            _ => Err(Error::new(&token, ErrorKind::ExpectedExpression(token.kind.clone()))),
        }
    }

    fn declaration(&mut self, ty: TypeRef) -> Result<Expr, Error> {
        let name_token = self.consume(
            TokenKind::Ident(String::new()),
            "expect variable name after type",
        )?;
        let name = name_token.unwrap_string();

        if self.check(&TokenKind::Equal) {
            return Err(Error::new(
                &name_token,
                ErrorKind::DeclarationInitializer(name),
            ));
        }

        let (var, redeclared) = self.env.declare_var(&name, ty, false);
        if redeclared {
            self.warnings
                .push(Error::new(&name_token, ErrorKind::Redeclaration(name)));
        }
        Ok(Expr::VarDefine(var))
    }

    fn call(&mut self, name: Token) -> Result<Expr, Error> {
        self.consume(TokenKind::LeftParen, "expect '(' before arguments")?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if self.matches(&[TokenKind::Comma]).is_none() {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "expect ')' after arguments")?;

        // callees need not be declared, the symbol is resolved at link-time
        Ok(Expr::Call { name, args })
    }

    fn type_of(&self, token: &Token) -> Result<TypeRef, Error> {
        if let TokenKind::Ident(name) = &token.kind {
            if let Some(ty) = self.env.get_type(name) {
                return Ok(ty);
            }
        }
        Err(Error::new(token, ErrorKind::NotType(token.kind.clone())))
    }

    fn peek(&mut self) -> Result<&Token, Error> {
        self.tokens
            .peek()
            .ok_or_else(|| Error::eof("expected token"))
    }
    fn next(&mut self, expected: &'static str) -> Result<Token, Error> {
        self.tokens.next().ok_or_else(|| Error::eof(expected))
    }
    fn check(&mut self, expected: &TokenKind) -> bool {
        matches!(self.tokens.peek(),
            Some(token) if std::mem::discriminant(&token.kind) == std::mem::discriminant(expected))
    }
    fn matches(&mut self, expected: &[TokenKind]) -> Option<Token> {
        match self.tokens.peek() {
            Some(token)
                if expected.iter().any(|kind| {
                    std::mem::discriminant(kind) == std::mem::discriminant(&token.kind)
                }) =>
            {
                self.tokens.next()
            }
            _ => None,
        }
    }
    fn consume(&mut self, expected: TokenKind, msg: &'static str) -> Result<Token, Error> {
        match self.tokens.next() {
            Some(token)
                if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) =>
            {
                Ok(token)
            }
            Some(token) => Err(Error::new(&token, ErrorKind::Regular(msg))),
            None => Err(Error::eof(msg)),
        }
    }
}

fn binary_op(kind: &TokenKind) -> Option<(BinOpKind, usize)> {
    match kind {
        TokenKind::Equal => Some((BinOpKind::Assign, 0)),
        TokenKind::EqualEqual => Some((BinOpKind::Equal, 0)),
        TokenKind::Plus => Some((BinOpKind::Add, 1)),
        TokenKind::Minus => Some((BinOpKind::Sub, 1)),
        TokenKind::Star => Some((BinOpKind::Mul, 2)),
        TokenKind::Slash => Some((BinOpKind::Div, 2)),
        _ => None,
    }
}
