//! Tokenizer tests over in-memory streams.

use escript_ast::{TokenGroups, TokenKind};
use escript_lexer::{Lexer, Stream};

fn lexer(src: &str) -> Lexer {
    Lexer::new(Stream::memory("test.es", src))
}

/// Collect token kinds until end of input.
fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lex = lexer(src);
    let mut out = Vec::new();
    loop {
        let kind = lex.get_token();
        if kind == TokenKind::Eof {
            break;
        }
        out.push(kind);
        if kind == TokenKind::Err {
            break;
        }
    }
    out
}

fn single(src: &str) -> (TokenKind, Option<TokenKind>, String) {
    let mut lex = lexer(src);
    let kind = lex.get_token();
    let tok = lex.token().unwrap();
    (kind, tok.sub, tok.text.clone())
}

#[test]
fn test_identifiers_and_keywords() {
    assert_eq!(
        kinds("var x = while_ while"),
        vec![
            TokenKind::Var,
            TokenKind::Id,
            TokenKind::Assign,
            TokenKind::Id,
            TokenKind::While,
        ]
    );
}

#[test]
fn test_keyword_group_classification() {
    let mut lex = lexer("class get");
    lex.get_token();
    assert!(lex.token().unwrap().in_group(TokenGroups::RESERVED));
    lex.get_token();
    assert!(lex.token().unwrap().in_group(TokenGroups::CONREV));
}

#[test]
fn test_attribute_keywords_carry_sub_kinds() {
    let cases = [
        ("dynamic", TokenKind::Dynamic),
        ("final", TokenKind::Final),
        ("native", TokenKind::Native),
        ("override", TokenKind::Override),
        ("prototype", TokenKind::Prototype),
        ("static", TokenKind::Static),
        ("enumerable", TokenKind::Enumerable),
        ("readonly", TokenKind::Readonly),
        ("synchronized", TokenKind::Synchronized),
    ];
    for (src, sub) in cases {
        let (kind, got_sub, _) = single(src);
        assert_eq!(kind, TokenKind::Attribute, "{src}");
        assert_eq!(got_sub, Some(sub), "{src}");
    }
}

#[test]
fn test_reserved_namespace_keywords() {
    let cases = [
        ("internal", TokenKind::Internal),
        ("intrinsic", TokenKind::Intrinsic),
        ("private", TokenKind::Private),
        ("protected", TokenKind::Protected),
        ("public", TokenKind::Public),
    ];
    for (src, sub) in cases {
        let (kind, got_sub, _) = single(src);
        assert_eq!(kind, TokenKind::ReservedNamespace, "{src}");
        assert_eq!(got_sub, Some(sub), "{src}");
    }
}

#[test]
fn test_every_compound_assignment_operator() {
    let cases = [
        ("+=", TokenKind::PlusAssign),
        ("-=", TokenKind::MinusAssign),
        ("*=", TokenKind::MulAssign),
        ("/=", TokenKind::DivAssign),
        ("%=", TokenKind::ModAssign),
        ("&=", TokenKind::BitAndAssign),
        ("|=", TokenKind::BitOrAssign),
        ("^=", TokenKind::BitXorAssign),
        ("<<=", TokenKind::LshAssign),
        (">>=", TokenKind::RshAssign),
        (">>>=", TokenKind::RshZeroAssign),
        ("&&=", TokenKind::LogicalAndAssign),
        ("||=", TokenKind::LogicalOrAssign),
        ("^^=", TokenKind::LogicalXorAssign),
    ];
    for (src, sub) in cases {
        let mut lex = lexer(src);
        assert_eq!(lex.get_token(), TokenKind::Assign, "{src}");
        let tok = lex.token().unwrap();
        assert_eq!(tok.sub, Some(sub), "{src}");
        assert!(tok.in_group(TokenGroups::COMPOUND_ASSIGN), "{src}");
        assert!(tok.in_group(TokenGroups::OPERATOR), "{src}");
    }
}

#[test]
fn test_maximal_munch_operator_chains() {
    assert_eq!(
        kinds("< <= << <<= === == = !== != >>> >> >"),
        vec![
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Lsh,
            TokenKind::Assign,
            TokenKind::StrictEq,
            TokenKind::Eq,
            TokenKind::Assign,
            TokenKind::StrictNe,
            TokenKind::Ne,
            TokenKind::RshZero,
            TokenKind::Rsh,
            TokenKind::Gt,
        ]
    );
}

#[test]
fn test_dot_forms() {
    assert_eq!(
        kinds("a.b .. ... .<"),
        vec![
            TokenKind::Id,
            TokenKind::Dot,
            TokenKind::Id,
            TokenKind::DotDot,
            TokenKind::Ellipsis,
            TokenKind::DotLess,
        ]
    );
}

#[test]
fn test_minus_before_digit_is_minus_then_number() {
    let mut lex = lexer("-5");
    assert_eq!(lex.get_token(), TokenKind::Minus);
    assert_eq!(lex.get_token(), TokenKind::Number);
    assert_eq!(lex.token().unwrap().text, "5");
}

#[test]
fn test_number_forms() {
    for (src, text) in [
        ("0", "0"),
        ("42", "42"),
        ("0x1F", "0x1F"),
        ("3.14", "3.14"),
        (".5", ".5"),
        ("1e3", "1e3"),
        ("2.5f", "2.5f"),
    ] {
        let (kind, _, got) = single(src);
        assert_eq!(kind, TokenKind::Number, "{src}");
        assert_eq!(got, text, "{src}");
    }
}

#[test]
fn test_string_escapes_resolved() {
    let (kind, _, text) = single(r#""a\tb\nA\x42""#);
    assert_eq!(kind, TokenKind::String);
    assert_eq!(text, "a\tb\nAB");
}

#[test]
fn test_single_quoted_string() {
    let (kind, _, text) = single(r"'it\'s'");
    assert_eq!(kind, TokenKind::String);
    assert_eq!(text, "it's");
}

#[test]
fn test_unterminated_string_reports_one_error() {
    let mut lex = lexer("\"abc");
    assert_eq!(lex.get_token(), TokenKind::Err);
    assert_eq!(lex.diagnostics.len(), 1);
    assert!(lex.diagnostics.has_errors());
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\nb /* block\nstill */ c"),
        vec![TokenKind::Id, TokenKind::Id, TokenKind::Id]
    );
}

#[test]
fn test_unterminated_block_comment_is_an_error() {
    let mut lex = lexer("/* never closed");
    assert_eq!(lex.get_token(), TokenKind::Err);
    assert!(lex.diagnostics.has_errors());
}

#[test]
fn test_nested_comment_warning_requires_warn_level() {
    let mut lex = lexer("/* outer /* inner */ x");
    lex.get_token();
    assert!(lex.diagnostics.is_empty());

    let mut lex = lexer("/* outer /* inner */ x");
    lex.set_warn_level(1);
    lex.get_token();
    assert_eq!(lex.diagnostics.len(), 1);
    assert!(!lex.diagnostics.has_errors());
}

#[test]
fn test_doc_comment_captured_when_enabled() {
    let mut lex = lexer("/** Adds two numbers. */ function");
    lex.set_doc_enabled(true);
    assert_eq!(lex.get_token(), TokenKind::Function);
    let doc = lex.take_doc().unwrap();
    assert!(doc.contains("Adds two numbers."));
    assert!(lex.take_doc().is_none());
}

#[test]
fn test_line_continuation_inside_identifier_position() {
    assert_eq!(kinds("a \\\n b"), vec![TokenKind::Id, TokenKind::Id]);
}

#[test]
fn test_unicode_escape_in_identifier() {
    let (kind, _, text) = single("\\u0041bc");
    assert_eq!(kind, TokenKind::Id);
    assert_eq!(text, "Abc");
}

#[test]
fn test_regexp_relex_with_flags() {
    let mut lex = lexer("/ab+c/gi x");
    // The parser sees the slash first, then asks for a re-lex.
    assert_eq!(lex.get_token(), TokenKind::Div);
    assert_eq!(lex.get_regexp_token(), TokenKind::Regexp);
    assert_eq!(lex.token().unwrap().text, "/ab+c/gi");
    assert_eq!(lex.get_token(), TokenKind::Id);
}

#[test]
fn test_regexp_newline_is_rejected() {
    let mut lex = lexer("/ab\ncd/");
    assert_eq!(lex.get_token(), TokenKind::Div);
    assert_eq!(lex.get_regexp_token(), TokenKind::Err);
    assert_eq!(lex.diagnostics.len(), 1);
}

#[test]
fn test_put_token_replays_in_order() {
    let mut lex = lexer("a b");
    assert_eq!(lex.get_token(), TokenKind::Id);
    let first = lex.token().unwrap().text.clone();
    lex.put_token();
    assert_eq!(lex.get_token(), TokenKind::Id);
    assert_eq!(lex.token().unwrap().text, first);
    assert_eq!(lex.get_token(), TokenKind::Id);
    assert_eq!(lex.token().unwrap().text, "b");
}

#[test]
fn test_put_specific_token_is_lifo() {
    let mut lex = lexer("a b c");
    lex.get_token();
    let a = lex.take_token().unwrap();
    lex.get_token();
    let b = lex.take_token().unwrap();
    lex.put_specific_token(b);
    lex.put_specific_token(a);
    lex.get_token();
    assert_eq!(lex.token().unwrap().text, "a");
    lex.get_token();
    assert_eq!(lex.token().unwrap().text, "b");
    lex.get_token();
    assert_eq!(lex.token().unwrap().text, "c");
}

#[test]
fn test_token_provenance() {
    let mut lex = lexer("var\n  total = 1;\n");
    lex.get_token();
    lex.get_token();
    let tok = lex.token().unwrap();
    assert_eq!(tok.text, "total");
    assert_eq!(tok.line_number, 2);
    assert_eq!(tok.column, 2);
    assert_eq!(tok.current_line.as_deref(), Some("  total = 1;"));
}

#[test]
fn test_interactive_console_emits_nop_then_eof() {
    let mut lines = vec!["x = 1".to_string()].into_iter();
    let stream = Stream::console(Box::new(move || lines.next()), true);
    let mut lex = Lexer::new(stream);
    assert_eq!(lex.get_token(), TokenKind::Id);
    assert_eq!(lex.get_token(), TokenKind::Assign);
    assert_eq!(lex.get_token(), TokenKind::Number);
    assert_eq!(lex.get_token(), TokenKind::Nop);
    // Still NOP until the driver resets for the next line.
    assert_eq!(lex.get_token(), TokenKind::Nop);
    lex.put_token();
    lex.reset_input();
    assert_eq!(lex.get_token(), TokenKind::Eof);
}

#[test]
fn test_xml_adjacent_punctuation() {
    assert_eq!(
        kinds("</ /> @ #"),
        vec![
            TokenKind::LtSlash,
            TokenKind::SlashGt,
            TokenKind::At,
            TokenKind::Hash,
        ]
    );
}
