//! Pull-based tokenizer.
//!
//! The lexer owns a byte cursor over the source text and hands out one token
//! per `next_token` call; past the end it keeps returning `Eof`. It tracks
//! byte offsets only; line numbers are recomputed from the source when an
//! error is rendered.

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::intern::{Interner, Symbol};
use crate::token::{IoKind, Span, Token, TokenKind, TypeTag};

pub type LexResult = Result<Token, SyntaxError>;

pub struct Lexer<'s, 'i> {
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    interner: &'i mut Interner,
}

impl<'s, 'i> Lexer<'s, 'i> {
    pub fn new(src: &'s str, interner: &'i mut Interner) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            interner,
        }
    }

    /// Text of a symbol interned by this lexer.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn next_token(&mut self) -> LexResult {
        loop {
            self.skip_whitespace();
            let start = self.pos;

            let Some(&c) = self.bytes.get(self.pos) else {
                let lexeme = self.interner.intern("");
                return Ok(Token::new(TokenKind::Eof, lexeme, Span::new(start, start)));
            };

            if c.is_ascii_digit() {
                return Ok(self.number(start));
            }

            if let Some(kind) = punctuator(c) {
                self.pos += 1;
                return Ok(self.emit(kind, start));
            }

            match c {
                b'=' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        return Ok(self.emit(TokenKind::EqEq, start));
                    }
                    return Ok(self.emit(TokenKind::Assign, start));
                }
                b'!' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'=') {
                        self.pos += 1;
                        return Ok(self.emit(TokenKind::NotEq, start));
                    }
                    return Ok(self.emit(TokenKind::Not, start));
                }
                b'>' => {
                    self.pos += 1;
                    match self.bytes.get(self.pos) {
                        Some(b'=') => {
                            self.pos += 1;
                            return Ok(self.emit(TokenKind::GtEq, start));
                        }
                        Some(b'>') => {
                            self.pos += 1;
                            return Ok(self.emit(TokenKind::Shr, start));
                        }
                        _ => return Ok(self.emit(TokenKind::Gt, start)),
                    }
                }
                b'<' => {
                    self.pos += 1;
                    match self.bytes.get(self.pos) {
                        Some(b'=') => {
                            self.pos += 1;
                            return Ok(self.emit(TokenKind::LtEq, start));
                        }
                        Some(b'<') => {
                            self.pos += 1;
                            return Ok(self.emit(TokenKind::Shl, start));
                        }
                        _ => return Ok(self.emit(TokenKind::Lt, start)),
                    }
                }
                b'|' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'|') {
                        self.pos += 1;
                        return Ok(self.emit(TokenKind::OrOr, start));
                    }
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnsupportedOperator { found: '|' },
                        Span::new(start, self.pos),
                    ));
                }
                b'&' => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'&') {
                        self.pos += 1;
                        return Ok(self.emit(TokenKind::AndAnd, start));
                    }
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnsupportedOperator { found: '&' },
                        Span::new(start, self.pos),
                    ));
                }
                b'\'' => return Ok(self.char_literal(start)),
                _ if is_ident_start(c) => return Ok(self.identifier(start)),
                // Anything else is dropped on the floor and lexing resumes at
                // the next byte.
                _ => self.pos += 1,
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .map_or(false, |b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize) -> Token {
        let lexeme = self.interner.intern(&self.src[start..self.pos]);
        Token::new(kind, lexeme, Span::new(start, self.pos))
    }

    fn number(&mut self, start: usize) -> Token {
        while self
            .bytes
            .get(self.pos)
            .map_or(false, |b| b.is_ascii_digit())
        {
            self.pos += 1;
        }
        self.emit(TokenKind::Int, start)
    }

    /// Character literal: everything between the quotes is carried verbatim,
    /// escapes included. At least one byte is consumed into the body, so
    /// `''` swallows its own closing quote and keeps scanning.
    fn char_literal(&mut self, start: usize) -> Token {
        self.pos += 1;
        let body_start = self.pos;
        if self.pos < self.bytes.len() {
            loop {
                self.pos += 1;
                if self.pos >= self.bytes.len() || self.bytes[self.pos] == b'\'' {
                    break;
                }
            }
        }
        let body = &self.src[body_start..self.pos];
        let lexeme = self.interner.intern(body);
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
        Token::new(TokenKind::CharLit, lexeme, Span::new(start, self.pos))
    }

    fn identifier(&mut self, start: usize) -> Token {
        while self
            .bytes
            .get(self.pos)
            .map_or(false, |&b| is_ident_continue(b))
        {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        let span = Span::new(start, self.pos);

        let (kind, lexeme) = match word {
            "int" => (TokenKind::Type(TypeTag::Int), word),
            "bool" => (TokenKind::Type(TypeTag::Bool), word),
            "char" => (TokenKind::Type(TypeTag::Char), word),
            "true" => (TokenKind::Int, "1"),
            "false" => (TokenKind::Int, "0"),
            "cout" => (TokenKind::Io(IoKind::Cout), word),
            "cin" => (TokenKind::Io(IoKind::Cin), word),
            "putchar" => (TokenKind::Io(IoKind::Putchar), word),
            "return" => (TokenKind::Return, word),
            "for" => (TokenKind::For, word),
            "while" => (TokenKind::While, word),
            "if" => (TokenKind::If, word),
            "else" => (TokenKind::Else, word),
            _ => (TokenKind::Ident, word),
        };
        Token::new(kind, self.interner.intern(lexeme), span)
    }
}

fn punctuator(c: u8) -> Option<TokenKind> {
    let kind = match c {
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        b'%' => TokenKind::Percent,
        b'^' => TokenKind::Caret,
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b';' => TokenKind::Semi,
        b',' => TokenKind::Comma,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, &mut interner);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().expect("lexing failed");
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push(token.kind);
        }
    }

    fn lexemes(src: &str) -> Vec<String> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, &mut interner);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().expect("lexing failed");
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push(lexer.resolve(token.lexeme).to_string());
        }
    }

    #[test]
    fn numbers_take_the_maximal_digit_run() {
        assert_eq!(kinds("1234 5"), vec![TokenKind::Int, TokenKind::Int]);
        assert_eq!(lexemes("1234 5"), vec!["1234", "5"]);
    }

    #[test]
    fn single_char_punctuators() {
        assert_eq!(
            kinds("+-*/%^;,"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Caret,
                TokenKind::Semi,
                TokenKind::Comma,
            ]
        );
    }

    #[test]
    fn comparison_operators_prefer_the_two_byte_form() {
        assert_eq!(
            kinds("= == ! != > >= >> < <= <<"),
            vec![
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::Not,
                TokenKind::NotEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Shr,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Shl,
            ]
        );
    }

    #[test]
    fn logical_operators_must_be_doubled() {
        assert_eq!(kinds("&& ||"), vec![TokenKind::AndAnd, TokenKind::OrOr]);

        let mut interner = Interner::new();
        let mut lexer = Lexer::new("a | b", &mut interner);
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(
            err.kind,
            SyntaxErrorKind::UnsupportedOperator { found: '|' }
        ));
    }

    #[test]
    fn lone_ampersand_is_rejected() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("&", &mut interner);
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(
            err.kind,
            SyntaxErrorKind::UnsupportedOperator { found: '&' }
        ));
    }

    #[test]
    fn keywords_are_reclassified() {
        assert_eq!(
            kinds("int bool char return for while if else"),
            vec![
                TokenKind::Type(TypeTag::Int),
                TokenKind::Type(TypeTag::Bool),
                TokenKind::Type(TypeTag::Char),
                TokenKind::Return,
                TokenKind::For,
                TokenKind::While,
                TokenKind::If,
                TokenKind::Else,
            ]
        );
        assert_eq!(
            kinds("cout cin putchar"),
            vec![
                TokenKind::Io(IoKind::Cout),
                TokenKind::Io(IoKind::Cin),
                TokenKind::Io(IoKind::Putchar),
            ]
        );
    }

    #[test]
    fn boolean_literals_become_integer_tokens() {
        assert_eq!(kinds("true false"), vec![TokenKind::Int, TokenKind::Int]);
        assert_eq!(lexemes("true false"), vec!["1", "0"]);
    }

    #[test]
    fn identifiers_allow_underscores_and_digits() {
        assert_eq!(kinds("_tmp x2 mainline"), vec![TokenKind::Ident; 3]);
        assert_eq!(lexemes("_tmp x2 mainline"), vec!["_tmp", "x2", "mainline"]);
    }

    #[test]
    fn char_literal_body_is_raw() {
        assert_eq!(lexemes(r"'a' '\n' 'ab'"), vec!["a", r"\n", "ab"]);
        assert_eq!(kinds("'a'"), vec![TokenKind::CharLit]);
    }

    #[test]
    fn unrecognized_bytes_are_silently_skipped() {
        assert_eq!(kinds("a @ b # 1"), vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Int,
        ]);
    }

    #[test]
    fn eof_repeats_forever() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("x", &mut interner);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn spans_cover_the_lexeme_bytes() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("ab <= 12", &mut interner);
        let ident = lexer.next_token().unwrap();
        assert_eq!((ident.span.start, ident.span.end), (0, 2));
        let le = lexer.next_token().unwrap();
        assert_eq!((le.span.start, le.span.end), (3, 5));
        let num = lexer.next_token().unwrap();
        assert_eq!((num.span.start, num.span.end), (6, 8));
    }

    #[test]
    fn serialized_lexemes_reproduce_the_program() {
        let src = "int main ( ) { cout << 1 + 2 ; }";
        assert_eq!(lexemes(src).join(" "), src);
    }
}
