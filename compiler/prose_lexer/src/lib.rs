//! Lexer for Prose using logos.
//!
//! [`lex`] turns one source unit into a [`TokenList`]. Whitespace and `#`
//! comments are dropped; the list always ends with a [`TokenKind::Eof`]
//! token. The first character no rule matches aborts lexing with a
//! [`LexError`] carrying its line and column.

mod raw_token;

use logos::Logos;
use prose_diagnostic::{Diagnostic, ErrorCode};
use prose_ir::{LineIndex, Position, Token, TokenKind, TokenList};
use thiserror::Error;

use raw_token::RawToken;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character `{ch}`")]
    UnexpectedChar { ch: char, pos: Position },
    #[error("unterminated string literal")]
    UnterminatedString { pos: Position },
    #[error("integer literal `{lexeme}` does not fit in 64 bits")]
    IntegerOutOfRange { lexeme: String, pos: Position },
}

impl LexError {
    pub fn pos(&self) -> Position {
        match self {
            LexError::UnexpectedChar { pos, .. }
            | LexError::UnterminatedString { pos }
            | LexError::IntegerOutOfRange { pos, .. } => *pos,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LexError::UnexpectedChar { .. } => ErrorCode::E0001,
            LexError::UnterminatedString { .. } => ErrorCode::E0002,
            LexError::IntegerOutOfRange { .. } => ErrorCode::E0003,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.to_string(), self.pos())
    }
}

/// Lex `source` into tokens.
pub fn lex(source: &str) -> Result<TokenList, LexError> {
    let index = LineIndex::new(source);
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let pos = index.position(logos.span().start);
        let slice = logos.slice();

        match token_result {
            Ok(raw) => {
                let token = convert_token(raw, slice, pos)?;
                result.push(token);
            }
            Err(()) => return Err(classify_error(slice, pos)),
        }
    }

    result.push(Token::new(TokenKind::Eof, "", index.position(source.len())));
    Ok(result)
}

fn classify_error(slice: &str, pos: Position) -> LexError {
    match slice.chars().next() {
        Some('"') => LexError::UnterminatedString { pos },
        Some(ch) => LexError::UnexpectedChar { ch, pos },
        None => LexError::UnexpectedChar { ch: '\0', pos },
    }
}

fn convert_token(raw: RawToken, slice: &str, pos: Position) -> Result<Token, LexError> {
    let kind = match raw {
        // Literals
        RawToken::Integer => {
            if slice.parse::<i64>().is_err() {
                return Err(LexError::IntegerOutOfRange {
                    lexeme: slice.to_string(),
                    pos,
                });
            }
            TokenKind::Integer
        }
        RawToken::Rational => TokenKind::Rational,
        RawToken::Str => {
            let content = &slice[1..slice.len() - 1];
            return Ok(Token::new(TokenKind::Str, unescape_string(content), pos));
        }
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Identifier => TokenKind::Identifier,

        // Statement keywords
        RawToken::Create => TokenKind::Create,
        RawToken::Variable => TokenKind::Variable,
        RawToken::Constant => TokenKind::Constant,
        RawToken::Set => TokenKind::Set,
        RawToken::To => TokenKind::To,
        RawToken::Read => TokenKind::Read,
        RawToken::Write => TokenKind::Write,
        RawToken::Writeln => TokenKind::Writeln,
        RawToken::If => TokenKind::If,
        RawToken::Then => TokenKind::Then,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::End => TokenKind::End,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Function => TokenKind::Function,
        RawToken::Return => TokenKind::Return,
        RawToken::Import => TokenKind::Import,
        RawToken::From => TokenKind::From,
        RawToken::Type => TokenKind::Type,

        // Type keywords
        RawToken::IntegerType => TokenKind::IntegerType,
        RawToken::RationalType => TokenKind::RationalType,
        RawToken::StringType => TokenKind::StringType,
        RawToken::BooleanType => TokenKind::BooleanType,
        RawToken::ListType => TokenKind::ListType,
        RawToken::VoidType => TokenKind::VoidType,

        // Operators
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,

        // Delimiters
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
    };
    Ok(Token::new(kind, slice, pos))
}

/// Resolve escape sequences in a string literal body. Unknown escapes keep
/// the escaped character.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('0') => result.push('\0'),
                Some(other) => result.push(other),
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests;
