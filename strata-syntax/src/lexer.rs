//! Lexer for Strata source text.

use std::{iter::Peekable, str::CharIndices};

use crate::{
    Result,
    error::SourceContext,
    token::{Span, Token, TokenKind},
};

/// Tokenize a whole source text. The returned stream always ends in `Eof`.
pub fn tokenize(src: &str, filename: &str) -> Result<Vec<Token>> {
    Lexer::new(src, filename).run()
}

struct Lexer<'a> {
    ctx: SourceContext<'a>,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, filename: &'a str) -> Self {
        Self {
            ctx: SourceContext::new(src, filename),
            chars: src.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let Some((start, ch)) = self.chars.next() else {
                let end = self.ctx.src().len();
                tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
                return Ok(tokens);
            };
            tokens.push(self.next_token(start, ch)?);
        }
    }

    /// Skip whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some((_, ch)) if ch.is_whitespace() => {
                    self.chars.next();
                }
                Some((i, '/')) if self.ctx.src()[*i..].starts_with("//") => {
                    while let Some((_, ch)) = self.chars.peek() {
                        if *ch == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self, start: usize, ch: char) -> Result<Token> {
        let single = |kind| Ok(Token::new(kind, Span::new(start, start + 1)));

        match ch {
            '(' => single(TokenKind::LeftParen),
            ')' => single(TokenKind::RightParen),
            '{' => single(TokenKind::LeftBrace),
            '}' => single(TokenKind::RightBrace),
            ':' => single(TokenKind::Colon),
            ';' => single(TokenKind::Semicolon),
            ',' => single(TokenKind::Comma),
            '+' => single(TokenKind::Plus),
            '*' => single(TokenKind::Star),
            '/' => single(TokenKind::Slash),
            '-' => Ok(self.pair(start, '>', TokenKind::Arrow, TokenKind::Minus)),
            '=' => Ok(self.pair(start, '=', TokenKind::EqEq, TokenKind::Assign)),
            '!' => Ok(self.pair(start, '=', TokenKind::BangEq, TokenKind::Bang)),
            '<' => Ok(self.pair(start, '=', TokenKind::LessEq, TokenKind::Less)),
            '>' => Ok(self.pair(start, '=', TokenKind::GreaterEq, TokenKind::Greater)),
            '&' if self.eat('&') => Ok(Token::new(TokenKind::AndAnd, Span::new(start, start + 2))),
            '|' if self.eat('|') => Ok(Token::new(TokenKind::OrOr, Span::new(start, start + 2))),
            '"' => self.string(start),
            c if c.is_ascii_digit() => self.integer(start),
            c if c.is_alphabetic() || c == '_' => Ok(self.word(start)),
            c => Err(self
                .ctx
                .unexpected_character(c, Span::new(start, start + c.len_utf8()))),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some((_, c)) if *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    /// A one- or two-character operator, depending on the following char.
    fn pair(&mut self, start: usize, second: char, long: TokenKind, short: TokenKind) -> Token {
        if self.eat(second) {
            Token::new(long, Span::new(start, start + 2))
        } else {
            Token::new(short, Span::new(start, start + 1))
        }
    }

    fn end_offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.ctx.src().len(), |(i, _)| *i)
    }

    fn string(&mut self, start: usize) -> Result<Token> {
        let mut value = String::new();
        while let Some((i, ch)) = self.chars.next() {
            match ch {
                '"' => return Ok(Token::new(TokenKind::Str(value), Span::new(start, i + 1))),
                '\n' => break,
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, '"')) => value.push('"'),
                    Some((_, '\\')) => value.push('\\'),
                    Some((j, other)) => {
                        return Err(self
                            .ctx
                            .unexpected_character(other, Span::new(j, j + other.len_utf8())));
                    }
                    None => break,
                },
                other => value.push(other),
            }
        }
        Err(self.ctx.unterminated_string(Span::new(start, start + 1)))
    }

    fn integer(&mut self, start: usize) -> Result<Token> {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit()) {
            self.chars.next();
        }
        let span = Span::new(start, self.end_offset());
        let text = &self.ctx.src()[span.start..span.end];
        // One past i64::MAX is kept so that `-9223372036854775808` can be written.
        let value = text
            .parse::<u64>()
            .ok()
            .filter(|value| *value <= i64::MIN.unsigned_abs())
            .ok_or_else(|| self.ctx.integer_overflow(text, span))?;
        Ok(Token::new(TokenKind::Int(value), span))
    }

    fn word(&mut self, start: usize) -> Token {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_alphanumeric() || *c == '_') {
            self.chars.next();
        }
        let span = Span::new(start, self.end_offset());
        let text = &self.ctx.src()[span.start..span.end];
        let kind = TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Token::new(kind, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, "test.st")
            .expect("tokenize should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_let_declaration() {
        assert_eq!(
            kinds("let x: int = 42;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".into()),
                TokenKind::Colon,
                TokenKind::Ident("int".into()),
                TokenKind::Assign,
                TokenKind::Int(42),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            kinds("-> == != <= >= && || - = ! < >"),
            vec![
                TokenKind::Arrow,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Minus,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// header\nlet // trailing\n"),
            vec![TokenKind::Let, TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![TokenKind::Str("a\"b\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("fn  add", "test.st").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(4, 7));
        assert_eq!(tokens[2].span, Span::new(7, 7));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("let s = \"open\n;", "test.st").unwrap_err();
        assert!(matches!(*err, Error::UnterminatedString { .. }));
        assert_eq!(err.offset(), 8);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("let $x = 1;", "test.st").unwrap_err();
        assert!(matches!(*err, Error::UnexpectedCharacter { ch: '$', .. }));
    }

    #[test]
    fn test_integer_overflow() {
        let err = tokenize("99999999999999999999", "test.st").unwrap_err();
        assert!(matches!(*err, Error::IntegerOverflow { .. }));

        let err = tokenize("9223372036854775809", "test.st").unwrap_err();
        assert!(matches!(*err, Error::IntegerOverflow { .. }));
    }

    #[test]
    fn test_integer_magnitude_of_i64_min() {
        assert_eq!(
            kinds("9223372036854775808"),
            vec![TokenKind::Int(9_223_372_036_854_775_808), TokenKind::Eof]
        );
    }
}
