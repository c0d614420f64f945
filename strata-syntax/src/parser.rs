//! Recursive-descent parser with precedence climbing for binary operators.

use crate::{
    Result,
    ast::{
        BinaryOp, Expr, ExprKind, FnDecl, Ident, Item, LetDecl, Param, SourceUnit, TypeExpr,
        UnaryOp,
    },
    error::SourceContext,
    lexer::tokenize,
    token::{Span, Token, TokenKind},
};

/// Deepest expression nesting accepted by the parser.
///
/// Checking and lowering walk expressions recursively, so the limit bounds
/// their stack use as well.
pub const MAX_NESTING: usize = 256;

/// Parse a whole source text into a [`SourceUnit`].
///
/// `filename` names the unit and is used in error reports.
pub fn parse_str(src: &str, filename: &str) -> Result<SourceUnit> {
    let tokens = tokenize(src, filename)?;
    let mut parser = Parser {
        ctx: SourceContext::new(src, filename),
        tokens,
        pos: 0,
        depth: 0,
    };

    let mut items = Vec::new();
    while !parser.at(&TokenKind::Eof) {
        items.push(parser.item()?);
    }

    Ok(SourceUnit {
        file: filename.to_string(),
        items,
    })
}

struct Parser<'a> {
    ctx: SourceContext<'a>,
    tokens: Vec<Token>,
    pos: usize,
    /// Current expression nesting.
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        // The stream always ends in Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span> {
        if self.at(&kind) {
            Ok(self.bump().span)
        } else {
            Err(self.error(&kind.to_string()))
        }
    }

    fn error(&self, expected: &str) -> Box<crate::Error> {
        let token = self.peek();
        self.ctx.unexpected_token(expected, &token.kind, token.span)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.ctx.nesting_too_deep(MAX_NESTING, self.peek().span));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn ident(&mut self, what: &str) -> Result<Ident> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                let span = self.bump().span;
                Ok(Ident { name, span })
            }
            _ => Err(self.error(what)),
        }
    }

    fn type_expr(&mut self) -> Result<TypeExpr> {
        let Ident { name, span } = self.ident("a type name")?;
        Ok(TypeExpr { name, span })
    }

    fn item(&mut self) -> Result<Item> {
        match self.peek().kind {
            TokenKind::Let => self.let_decl().map(Item::Let),
            TokenKind::Fn => self.fn_decl().map(Item::Fn),
            _ => Err(self.error("'let' or 'fn'")),
        }
    }

    fn let_decl(&mut self) -> Result<LetDecl> {
        let start = self.expect(TokenKind::Let)?;
        let name = self.ident("a declaration name")?;
        let ty = if self.at(&TokenKind::Colon) {
            self.bump();
            Some(self.type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        let end = self.expect(TokenKind::Semicolon)?;

        Ok(LetDecl {
            name,
            ty,
            value,
            span: start.to(end),
        })
    }

    fn fn_decl(&mut self) -> Result<FnDecl> {
        let start = self.expect(TokenKind::Fn)?;
        let name = self.ident("a function name")?;

        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while !self.at(&TokenKind::RightParen) {
            let param_name = self.ident("a parameter name")?;
            self.expect(TokenKind::Colon)?;
            let ty = self.type_expr()?;
            params.push(Param {
                name: param_name,
                ty,
            });
            if !self.at(&TokenKind::RightParen) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RightParen)?;

        self.expect(TokenKind::Arrow)?;
        let ret = self.type_expr()?;
        self.expect(TokenKind::Assign)?;
        let body = self.expr()?;
        let end = self.expect(TokenKind::Semicolon)?;

        Ok(FnDecl {
            name,
            params,
            ret,
            body,
            span: start.to(end),
        })
    }

    fn expr(&mut self) -> Result<Expr> {
        self.nested(|p| p.binary(0))
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.peek().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEq => BinaryOp::Le,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEq => BinaryOp::Ge,
            TokenKind::AndAnd => BinaryOp::And,
            TokenKind::OrOr => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Parse operators binding tighter than `min_prec`, left-associatively.
    ///
    /// Every folded operator nests the tree one level deeper, so it counts
    /// against the nesting limit until the chain ends.
    fn binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut lhs = self.unary()?;
        let mut folds = 0;
        while let Some(op) = self.binary_op() {
            if op.precedence() <= min_prec {
                break;
            }
            self.enter()?;
            folds += 1;
            self.bump();
            let rhs = self.binary(op.precedence())?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            };
        }
        self.depth -= folds;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.primary(),
        };
        let start = self.bump().span;

        // `-9223372036854775808` is the only way to write i64::MIN.
        if op == UnaryOp::Neg {
            if let TokenKind::Int(value) = self.peek().kind {
                if value == i64::MIN.unsigned_abs() {
                    let end = self.bump().span;
                    return Ok(Expr {
                        kind: ExprKind::Int(i64::MIN),
                        span: start.to(end),
                    });
                }
            }
        }

        let operand = self.nested(Self::unary)?;
        Ok(Expr {
            span: start.to(operand.span),
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Int(value) => match i64::try_from(value) {
                Ok(value) => ExprKind::Int(value),
                Err(_) => {
                    let text = &self.ctx.src()[token.span.start..token.span.end];
                    return Err(self.ctx.integer_overflow(text, token.span));
                }
            },
            TokenKind::Str(value) => ExprKind::Str(value),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Ident(_) => return self.name_or_call(),
            TokenKind::LeftParen => {
                self.bump();
                let mut inner = self.expr()?;
                let end = self.expect(TokenKind::RightParen)?;
                inner.span = token.span.to(end);
                return Ok(inner);
            }
            TokenKind::If => return self.if_expr(),
            _ => return Err(self.error("an expression")),
        };
        self.bump();
        Ok(Expr {
            kind,
            span: token.span,
        })
    }

    fn name_or_call(&mut self) -> Result<Expr> {
        let callee = self.ident("a name")?;
        if !self.at(&TokenKind::LeftParen) {
            return Ok(Expr {
                span: callee.span,
                kind: ExprKind::Name(callee.name),
            });
        }

        self.bump();
        let mut args = Vec::new();
        while !self.at(&TokenKind::RightParen) {
            args.push(self.expr()?);
            if !self.at(&TokenKind::RightParen) {
                self.expect(TokenKind::Comma)?;
            }
        }
        let end = self.expect(TokenKind::RightParen)?;

        Ok(Expr {
            span: callee.span.to(end),
            kind: ExprKind::Call { callee, args },
        })
    }

    fn block(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LeftBrace)?;
        let inner = self.expr()?;
        self.expect(TokenKind::RightBrace)?;
        Ok(inner)
    }

    /// `if cond { a } else { b }`, with `else if` chains.
    fn if_expr(&mut self) -> Result<Expr> {
        let start = self.expect(TokenKind::If)?;
        let cond = self.expr()?;
        let then_branch = self.block()?;
        self.expect(TokenKind::Else)?;
        let else_branch = if self.at(&TokenKind::If) {
            self.nested(Self::if_expr)?
        } else {
            self.block()?
        };
        let end = self.tokens[self.pos - 1].span;

        Ok(Expr {
            span: start.to(end),
            kind: ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parse(src: &str) -> SourceUnit {
        parse_str(src, "test.st").expect("parse should succeed")
    }

    fn single_let_value(src: &str) -> Expr {
        match parse(src).items.remove(0) {
            Item::Let(decl) => decl.value,
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_let_with_annotation() {
        let unit = parse("let answer: int = 42;");
        assert_eq!(unit.file, "test.st");
        assert_eq!(unit.items.len(), 1);

        let Item::Let(decl) = &unit.items[0] else {
            panic!("expected let");
        };
        assert_eq!(decl.name.name, "answer");
        assert_eq!(decl.ty.as_ref().map(|t| t.name.as_str()), Some("int"));
        assert!(matches!(decl.value.kind, ExprKind::Int(42)));
        assert_eq!(decl.span, Span::new(0, 21));
    }

    #[test]
    fn test_parse_function() {
        let unit = parse("fn add(a: int, b: int) -> int = a + b;");
        let Item::Fn(decl) = &unit.items[0] else {
            panic!("expected fn");
        };
        assert_eq!(decl.name.name, "add");
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.params[1].name.name, "b");
        assert_eq!(decl.ret.name, "int");
        assert!(matches!(
            decl.body.kind,
            ExprKind::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 == 7 parses as (1 + (2 * 3)) == 7
        let value = single_let_value("let x = 1 + 2 * 3 == 7;");
        let ExprKind::Binary { op, lhs, .. } = value.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Eq);
        let ExprKind::Binary { op, rhs, .. } = lhs.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_left_associative() {
        // 10 - 4 - 3 parses as (10 - 4) - 3
        let value = single_let_value("let x = 10 - 4 - 3;");
        let ExprKind::Binary { lhs, rhs, .. } = value.kind else {
            panic!("expected binary");
        };
        assert!(matches!(lhs.kind, ExprKind::Binary { .. }));
        assert!(matches!(rhs.kind, ExprKind::Int(3)));
    }

    #[test]
    fn test_if_else_chain() {
        let value = single_let_value("let x = if a { 1 } else if b { 2 } else { 3 };");
        let ExprKind::If { else_branch, .. } = value.kind else {
            panic!("expected if");
        };
        assert!(matches!(else_branch.kind, ExprKind::If { .. }));
    }

    #[test]
    fn test_call_and_unary() {
        let value = single_let_value("let x = -f(1, !g());");
        let ExprKind::Unary { op, operand } = value.kind else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Neg);
        let ExprKind::Call { callee, args } = operand.kind else {
            panic!("expected call");
        };
        assert_eq!(callee.name, "f");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_str("let x = 1", "test.st").unwrap_err();
        assert_eq!(err.to_string(), "expected ';', found end of file");
        assert!(matches!(*err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unexpected_item() {
        let err = parse_str("x = 1;", "test.st").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected 'let' or 'fn', found identifier 'x'"
        );
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_i64_min_literal() {
        let value = single_let_value("let x = -9223372036854775808;");
        assert!(matches!(value.kind, ExprKind::Int(i64::MIN)));
        assert_eq!(value.span, Span::new(8, 28));

        // Without the sign the magnitude does not fit.
        let err = parse_str("let x = 9223372036854775808;", "test.st").unwrap_err();
        assert!(matches!(*err, Error::IntegerOverflow { .. }));
        assert_eq!(err.offset(), 8);
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!(
                "let x = {}1{};",
                "(".repeat(depth),
                ")".repeat(depth)
            )
        };
        assert!(parse_str(&nested(MAX_NESTING - 2), "test.st").is_ok());

        let err = parse_str(&nested(5000), "test.st").unwrap_err();
        assert!(matches!(
            *err,
            Error::NestingTooDeep {
                limit: MAX_NESTING,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            format!("expression nesting exceeds the limit of {}", MAX_NESTING)
        );
    }

    #[test]
    fn test_nesting_limit_counts_operator_chains() {
        let chain = format!("let x = 1{};", " + 1".repeat(MAX_NESTING * 2));
        let err = parse_str(&chain, "test.st").unwrap_err();
        assert!(matches!(*err, Error::NestingTooDeep { .. }));

        let unary = format!("let x = {}true;", "!".repeat(MAX_NESTING * 2));
        let err = parse_str(&unary, "test.st").unwrap_err();
        assert!(matches!(*err, Error::NestingTooDeep { .. }));

        let chain = format!("let x = 1{};", " + 1".repeat(MAX_NESTING / 2));
        assert!(parse_str(&chain, "test.st").is_ok());
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("// nothing here\n").items.is_empty());
    }
}
