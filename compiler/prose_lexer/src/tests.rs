use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).map(|tokens| tokens.kinds()).unwrap_or_default()
}

#[test]
fn create_statement() {
    assert_eq!(
        kinds("create integer constant x to 5;"),
        vec![
            TokenKind::Create,
            TokenKind::IntegerType,
            TokenKind::Constant,
            TokenKind::Identifier,
            TokenKind::To,
            TokenKind::Integer,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn integer_and_rational_literals() {
    let Ok(tokens) = lex("42 3.14") else {
        panic!("lexing failed");
    };
    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].lexeme, "42");
    assert_eq!(tokens[1].kind, TokenKind::Rational);
    assert_eq!(tokens[1].lexeme, "3.14");
}

#[test]
fn rational_may_omit_integer_part() {
    let Ok(tokens) = lex(".5 xs.length") else {
        panic!("lexing failed");
    };
    assert_eq!(tokens[0].kind, TokenKind::Rational);
    assert_eq!(tokens[0].lexeme, ".5");
    assert_eq!(
        kinds("xs.length"),
        vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn multi_char_operators_win_over_prefixes() {
    assert_eq!(
        kinds("-> == != <= >= && || - < > !"),
        vec![
            TokenKind::Arrow,
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Minus,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Bang,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_win_over_identifiers_only_on_exact_match() {
    assert_eq!(
        kinds("end ending lists list"),
        vec![
            TokenKind::End,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::ListType,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_escapes_are_resolved() {
    let Ok(tokens) = lex(r#""a\tb\n\"q\"\\""#) else {
        panic!("lexing failed");
    };
    assert_eq!(tokens[0].kind, TokenKind::Str);
    assert_eq!(tokens[0].lexeme, "a\tb\n\"q\"\\");
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_eq!(
        kinds("# heading\nwrite 1; # trailing\n\n"),
        vec![
            TokenKind::Write,
            TokenKind::Integer,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn positions_are_one_based() {
    let Ok(tokens) = lex("write x;\n  writeln y;") else {
        panic!("lexing failed");
    };
    assert_eq!(tokens[0].pos, Position::new(1, 1));
    assert_eq!(tokens[1].pos, Position::new(1, 7));
    assert_eq!(tokens[3].pos, Position::new(2, 3));
    assert_eq!(tokens[4].pos, Position::new(2, 11));
}

#[test]
fn member_access_after_identifier() {
    assert_eq!(
        kinds("xs.length"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn unexpected_character_reports_position() {
    assert_eq!(
        lex("write 1;\nset x = 2;"),
        Err(LexError::UnexpectedChar {
            ch: '=',
            pos: Position::new(2, 7),
        })
    );
}

#[test]
fn unterminated_string() {
    let err = lex("write \"oops;").err();
    assert_eq!(
        err,
        Some(LexError::UnterminatedString {
            pos: Position::new(1, 7)
        })
    );
}

#[test]
fn oversized_integer_is_rejected() {
    let Err(err) = lex("99999999999999999999") else {
        panic!("expected an error");
    };
    assert_eq!(err.code(), ErrorCode::E0003);
    assert_eq!(err.pos(), Position::START);
}

#[test]
fn diagnostic_carries_code_and_position() {
    let Err(err) = lex("  @") else {
        panic!("expected an error");
    };
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E0001);
    assert_eq!(diag.message, "unexpected character `@`");
    assert_eq!(diag.pos, Position::new(1, 3));
}

proptest! {
    #[test]
    fn lexing_never_panics(source in "\\PC{0,64}") {
        let _ = lex(&source);
    }

    #[test]
    fn non_negative_integers_round_trip(n in 0i64..=i64::MAX) {
        let text = n.to_string();
        let tokens = lex(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind, TokenKind::Integer);
        prop_assert_eq!(&tokens[0].lexeme, &text);
    }

    #[test]
    fn successful_lex_always_ends_in_eof(source in "[a-z0-9 ;+*()\\[\\],.<>=!\\n]{0,48}") {
        if let Ok(tokens) = lex(&source) {
            prop_assert_eq!(tokens.iter().last().map(|t| t.kind), Some(TokenKind::Eof));
            prop_assert_eq!(
                tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
                1
            );
        }
    }
}
