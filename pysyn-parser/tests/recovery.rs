//! Broken input still yields a `Module`, with errors listed beside it.

use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::recovery::ErrorKind;
use pysyn_parser::pysyn::testing::{assert_round_trip, assert_tree};
use pysyn_parser::pysyn::{parse, ParseOptions, ParseResult};
use rstest::rstest;

fn parse_latest(source: &str) -> ParseResult {
    parse(source, GrammarVersion::LATEST, &ParseOptions::default()).unwrap()
}

fn kinds(result: &ParseResult) -> Vec<ErrorKind> {
    result.errors.iter().map(|e| e.kind).collect()
}

#[test]
fn test_unterminated_call_keeps_function() {
    let result = parse_latest("def m():\n    call(a,");
    assert!(result.has_errors());
    assert_tree(&result.tree)
        .statement_count(1)
        .statement(0, |def| def.kind_name("FunctionDef").name("m"));
}

#[test]
fn test_first_error_text() {
    let result = parse_latest("def m():\n    call(a,");
    let first = result.first_error().unwrap();
    insta::assert_snapshot!(
        first.to_string(),
        @"2:12: unmatched bracket: expected ')', found end of line"
    );
}

#[test]
fn test_errors_are_in_detection_order() {
    let result = parse_latest("f(a b)\ng[1 2]\nz = 3\n");
    assert_eq!(
        kinds(&result),
        vec![ErrorKind::UnmatchedParenNearby, ErrorKind::UnmatchedParenNearby]
    );
    let lines: Vec<usize> = result.errors.iter().map(|e| e.position().line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert_tree(&result.tree).statement_count(3);
}

#[test]
fn test_closer_later_on_line_wraps_junk() {
    let result = parse_latest("f(a b)\n");
    assert_eq!(kinds(&result), vec![ErrorKind::UnmatchedParenNearby]);
    assert_tree(&result.tree).statement(0, |stmt| {
        stmt.kind_name("Expr")
            .child(0, |call| call.kind_name("Call").child_kinds(&["Name", "Name", "Error"]))
    });
}

#[test]
fn test_missing_function_name_gets_placeholder() {
    let result = parse_latest("def (x):\n    return x\n");
    assert_eq!(kinds(&result), vec![ErrorKind::NameExpected]);
    assert_tree(&result.tree).statement(0, |def| {
        def.kind_name("FunctionDef")
            .name("!<MissingName>!")
            .body(|suite| suite.statement_count(1))
    });
}

#[test]
fn test_broken_statement_does_not_spill_into_next_line() {
    let result = parse_latest("x = = 1\ny = 2\n");
    assert_eq!(result.errors.len(), 1);
    assert_tree(&result.tree)
        .statement_count(2)
        .statement(0, |stmt| stmt.kind_name("Error"))
        .statement(1, |stmt| stmt.kind_name("Assign").no_errors());
}

#[test]
fn test_stray_closer_at_statement_start() {
    let result = parse_latest(")\nx = 1\n");
    assert_eq!(result.errors.len(), 1);
    assert_tree(&result.tree)
        .statement(0, |stmt| stmt.kind_name("Error").code(")"))
        .statement(1, |stmt| stmt.kind_name("Assign"));
}

#[test]
fn test_dedent_budget_limits_resync() {
    // The `)` ends the if block early. With a tiny budget the search for the
    // block's Dedent gives up and the failure moves up to the if statement.
    let source = "if x:\n    a = 1\n    ) b c d e f g h\n    z = 2\ny = 3\n";
    let roomy = parse(source, GrammarVersion::LATEST, &ParseOptions::default()).unwrap();
    let tight = ParseOptions {
        dedent_budget: 3,
        ..ParseOptions::default()
    };
    let cramped = parse(source, GrammarVersion::LATEST, &tight).unwrap();

    assert!(kinds(&roomy).contains(&ErrorKind::DedentExpected));
    assert_tree(&roomy.tree).statement(0, |stmt| stmt.kind_name("If"));
    assert!(cramped.has_errors());
    assert!(cramped.tree.statements()[0].is_error());
    assert!(cramped
        .tree
        .statements()
        .iter()
        .any(|stmt| stmt.kind_name() == "Assign"));
}

#[test]
fn test_empty_suite_is_folded_away() {
    let result = parse_latest("class C:\nx = 1\n");
    assert_eq!(
        kinds(&result),
        vec![ErrorKind::IndentExpected, ErrorKind::EmptySuiteDetected]
    );
    assert_tree(&result.tree)
        .statement_count(2)
        .statement(0, |class| class.kind_name("ClassDef").body(|suite| suite.statement_count(0)))
        .statement(1, |stmt| stmt.kind_name("Assign"));
}

#[test]
fn test_dict_value_missing() {
    let result = parse_latest("d = {'a': 1, 'b'}\n");
    assert!(kinds(&result).contains(&ErrorKind::DictValueMissing));
    assert_tree(&result.tree).statement(0, |stmt| stmt.kind_name("Assign"));
}

#[test]
fn test_unterminated_string_is_an_error_token() {
    let result = parse_latest("s = 'abc\nt = 1\n");
    assert!(result.has_errors());
    assert_tree(&result.tree)
        .statement_count(2)
        .statement(1, |stmt| stmt.kind_name("Assign").no_errors());
}

#[test]
fn test_deeply_nested_garbage_terminates() {
    let mut source = String::new();
    for depth in 0..200 {
        source.push_str(&"    ".repeat(depth % 7));
        source.push_str(["if (", "def :", "]]", "else:", "x = {", "@", "lambda"][depth % 7]);
        source.push('\n');
    }
    for version in GrammarVersion::ALL {
        let result = parse(&source, version, &ParseOptions::default()).unwrap();
        assert_eq!(result.tree.kind_name(), "Module");
        assert!(result.has_errors());
    }
}

#[rstest]
#[case::parentheses("(", "1", ")")]
#[case::lists("[", "1", "]")]
#[case::dicts("{1: ", "1", "}")]
#[case::calls("f(", "1", ")")]
#[case::subscripts("a[", "1", "]")]
#[case::unary_minus("-", "1", "")]
#[case::not("not ", "x", "")]
#[case::lambdas("lambda: ", "1", "")]
#[case::conditionals("a if b else ", "c", "")]
#[case::powers("2 ** ", "2", "")]
fn test_deep_expression_nesting_is_cut_off(
    #[case] open: &str,
    #[case] inner: &str,
    #[case] close: &str,
) {
    let source = format!(
        "x = {}{}{}\ny = 2\n",
        open.repeat(5000),
        inner,
        close.repeat(5000)
    );
    let result = parse_latest(&source);
    assert_eq!(kinds(&result), vec![ErrorKind::StatementMalformed]);
    assert!(result.errors[0].message.contains("levels of nesting"));
    assert_tree(&result.tree)
        .statement_count(2)
        .statement(0, |stmt| stmt.kind_name("Error"))
        .statement(1, |stmt| stmt.kind_name("Assign").code("y = 2"));
    assert_round_trip(&source, GrammarVersion::LATEST);
}

#[test]
fn test_unclosed_parentheses_terminate() {
    let source = format!("x = {}\n", "(".repeat(5000));
    let result = parse_latest(&source);
    assert_eq!(result.tree.kind_name(), "Module");
    assert!(kinds(&result).contains(&ErrorKind::StatementMalformed));
    assert_round_trip(&source, GrammarVersion::LATEST);
}

#[test]
fn test_deep_blocks_are_kept_unparsed() {
    let mut source = String::new();
    for depth in 0..300 {
        source.push_str(&" ".repeat(depth));
        source.push_str("if x:\n");
    }
    source.push_str(&" ".repeat(300));
    source.push_str("pass\n");
    source.push_str("y = 2\n");

    let result = parse_latest(&source);
    assert_eq!(kinds(&result), vec![ErrorKind::CompoundStatementMalformed]);
    assert_tree(&result.tree)
        .statement_count(2)
        .statement(0, |stmt| stmt.kind_name("If"))
        .statement(1, |stmt| stmt.kind_name("Assign"));
    assert_round_trip(&source, GrammarVersion::LATEST);
}

#[test]
fn test_deep_stray_indents_are_kept_unparsed() {
    let mut source = String::new();
    for depth in 0..300 {
        source.push_str(&" ".repeat(depth));
        source.push_str("x\n");
    }
    source.push_str("y = 2\n");

    let result = parse_latest(&source);
    assert_eq!(result.errors.len(), ParseOptions::default().max_nesting + 1);
    assert!(kinds(&result)
        .iter()
        .all(|kind| *kind == ErrorKind::StatementMalformed));
    assert_tree(&result.tree)
        .statement(0, |stmt| stmt.kind_name("Expr"))
        .statement(1, |stmt| stmt.kind_name("Error"))
        .statement(2, |stmt| stmt.kind_name("Assign"));
    assert_round_trip(&source, GrammarVersion::LATEST);
}
