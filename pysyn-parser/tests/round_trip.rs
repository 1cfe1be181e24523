//! Printing a parsed tree gives back the input.

use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::testing::{assert_round_trip, assert_tree, parse_clean};
use rstest::rstest;

const FIXTURE: &str = include_str!("fixtures/inventory.py");

#[rstest]
fn test_fixture_round_trips(
    #[values(
        GrammarVersion::Python2_4,
        GrammarVersion::Python2_5,
        GrammarVersion::Python2_6,
        GrammarVersion::Python3_0
    )]
    version: GrammarVersion,
) {
    assert_round_trip(FIXTURE, version);
}

#[test]
fn test_fixture_is_clean_under_2_6() {
    let result = parse_clean(FIXTURE, GrammarVersion::Python2_6);
    assert!(result.tree.statements().len() > 30);
}

#[rstest]
#[case::empty("")]
#[case::blank_lines("\n\n\n")]
#[case::no_final_newline("x = 1")]
#[case::tabs("if a:\n\tif b:\n\t\tpass\n")]
#[case::continuation("x = 1 + \\\n    2\n")]
#[case::comments_everywhere("# a\nif x:  # b\n    # c\n    y  # d\n  # e\n# f\n")]
#[case::nested_dedents("def f():\n    if x:\n        return 1\n\n\nz = 2\n")]
#[case::brackets_over_lines("d = {\n    'a': [1,\n          2],\n}\n")]
#[case::triple_quoted("s = '''one\ntwo'''\n")]
fn test_snippets_round_trip(#[case] source: &str) {
    for version in GrammarVersion::ALL {
        assert_round_trip(source, version);
    }
}

#[rstest]
#[case::unclosed_call("def m():\n    call(a,")]
#[case::missing_name("def (x):\n    pass\n")]
#[case::stray_dedent("if x:\n        a\n    b\n")]
#[case::junk("x = = 1\n)]}\n")]
#[case::unterminated_string("s = 'abc\nt = 1\n")]
#[case::missing_block("while x:\nprint\n")]
fn test_broken_input_round_trips(#[case] source: &str) {
    for version in GrammarVersion::ALL {
        assert_round_trip(source, version);
    }
}

#[test]
fn test_fixture_shape() {
    let result = parse_clean(FIXTURE, GrammarVersion::Python2_6);
    assert_tree(&result.tree)
        .no_errors()
        .statement(0, |docstring| {
            docstring
                .kind_name("Expr")
                .before(&["#!/usr/bin/env python", "# -*- coding: utf-8 -*-"])
        })
        .statement(1, |import| import.kind_name("Import"));

    let class = result
        .tree
        .statements()
        .into_iter()
        .find(|s| s.name() == Some("Inventory"))
        .unwrap();
    assert_tree(class)
        .kind_name("ClassDef")
        .body(|suite| suite.statement_count(9));
}
