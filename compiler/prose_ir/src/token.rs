//! Token types produced by the lexer.

use std::fmt;

use crate::Position;

/// A single lexeme with its kind and source position.
///
/// `lexeme` holds the text the parser needs: the identifier name, the
/// number's digits, or the string literal with escapes already resolved.
/// For keywords and punctuation it is the source spelling.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ {}", self.kind, self.lexeme, self.pos)
    }
}

/// Token kinds for Prose.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // Literals
    Integer,
    Rational,
    Str,
    True,
    False,
    Identifier,

    // Statement keywords
    Create,
    Variable,
    Constant,
    Set,
    To,
    Read,
    Write,
    Writeln,
    If,
    Then,
    Elif,
    Else,
    End,
    While,
    Do,
    For,
    In,
    Function,
    Return,
    Import,
    From,
    Type,

    // Type keywords
    IntegerType,
    RationalType,
    StringType,
    BooleanType,
    ListType,
    VoidType,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Arrow,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

impl TokenKind {
    /// Human-readable name used in parse errors.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer literal",
            TokenKind::Rational => "rational literal",
            TokenKind::Str => "string literal",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Identifier => "identifier",
            TokenKind::Create => "create",
            TokenKind::Variable => "variable",
            TokenKind::Constant => "constant",
            TokenKind::Set => "set",
            TokenKind::To => "to",
            TokenKind::Read => "read",
            TokenKind::Write => "write",
            TokenKind::Writeln => "writeln",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::End => "end",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::Type => "type",
            TokenKind::IntegerType => "integer",
            TokenKind::RationalType => "rational",
            TokenKind::StringType => "string",
            TokenKind::BooleanType => "boolean",
            TokenKind::ListType => "list",
            TokenKind::VoidType => "void",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Arrow => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Eof => "end of input",
        }
    }

    /// True for the keywords that spell a built-in type.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerType
                | TokenKind::RationalType
                | TokenKind::StringType
                | TokenKind::BooleanType
                | TokenKind::ListType
                | TokenKind::VoidType
        )
    }

    /// True for tokens that close a block body.
    pub fn ends_block(self) -> bool {
        matches!(
            self,
            TokenKind::End | TokenKind::Elif | TokenKind::Else | TokenKind::While | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lexer output: every token of one source unit, ending with [`TokenKind::Eof`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Kinds only, for compact assertions.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
