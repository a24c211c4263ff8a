//! The logos-derived tokenizer.
//!
//! Logos picks the longest match and prefers `#[token]` over `#[regex]` on
//! ties, so keywords win over identifiers of the same length and `->`, `==`,
//! `<=` win over their one-character prefixes.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*)")]
pub(crate) enum RawToken {
    // Literals
    #[regex(r"[0-9]*\.[0-9]+")]
    Rational,
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Statement keywords
    #[token("create")]
    Create,
    #[token("variable")]
    Variable,
    #[token("constant")]
    Constant,
    #[token("set")]
    Set,
    #[token("to")]
    To,
    #[token("read")]
    Read,
    #[token("write")]
    Write,
    #[token("writeln")]
    Writeln,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("end")]
    End,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("type")]
    Type,

    // Type keywords
    #[token("integer")]
    IntegerType,
    #[token("rational")]
    RationalType,
    #[token("string")]
    StringType,
    #[token("boolean")]
    BooleanType,
    #[token("list")]
    ListType,
    #[token("void")]
    VoidType,

    // Operators
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
}
