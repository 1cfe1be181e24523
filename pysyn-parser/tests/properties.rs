//! Properties that hold for any input, however broken.

use proptest::prelude::*;
use pysyn_parser::pysyn::ast::{walk, Node};
use pysyn_parser::pysyn::formats::{print_tree, PrettyPrinterPrefs};
use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::stream::StreamMode;
use pysyn_parser::pysyn::testing::strip_placeholders;
use pysyn_parser::pysyn::{parse, ParseOptions};

const FRAGMENTS: &[&str] = &[
    "x", "y1", "_a", "1", "0x1F", "2.5", "'s'", "\"t\"", "'''u'''", " ", "    ", "\t", "\n", "\n\n",
    "# note", "\\\n", "(", ")", "[", "]", "{", "}", ",", ":", ";", ".", "=", "+=", "+", "-",
    "*", "**", "/", "%", "<", "==", "!=", "<>", "`", "@", "->", "...", "if ", "elif ", "else",
    "while ", "for ", " in ", "try", "except ", "finally", "with ", " as ", "def ", "class ",
    "return ", "yield ", "lambda ", "print ", "exec ", "import ", "from ", "global ",
    "nonlocal ", "not ", " and ", " or ", " is ", "pass", "del ", "raise ", "assert ",
];

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..60).prop_map(|parts| parts.concat())
}

fn version() -> impl Strategy<Value = GrammarVersion> {
    prop::sample::select(GrammarVersion::ALL.to_vec())
}

/// Every node whose range runs backwards or that a parent does not enclose.
fn misplaced_spans(tree: &Node) -> Vec<String> {
    let mut misplaced = Vec::new();
    walk(tree, |node| {
        if node.range.start > node.range.end || node.range.span.start > node.range.span.end {
            misplaced.push(format!("{} runs backwards: {:?}", node.kind_name(), node.range));
        }
        for child in node.children().filter(|child| !child.range.is_empty()) {
            if !node.range.encloses(&child.range) {
                misplaced.push(format!(
                    "{} {:?} escapes {} {:?}",
                    child.kind_name(),
                    child.range,
                    node.kind_name(),
                    node.range
                ));
            }
        }
    });
    misplaced
}

proptest! {
    #[test]
    fn printing_is_lossless(text in source(), version in version()) {
        let result = parse(&text, version, &ParseOptions::default()).unwrap();
        prop_assert_eq!(result.tree.kind_name(), "Module");
        let printed = print_tree(&result.tree, &PrettyPrinterPrefs::default());
        prop_assert_eq!(strip_placeholders(&printed), text);
    }

    #[test]
    fn spans_nest_inside_parents(text in source(), version in version()) {
        let result = parse(&text, version, &ParseOptions::default()).unwrap();
        let misplaced = misplaced_spans(&result.tree);
        prop_assert!(misplaced.is_empty(), "{}", misplaced.join("\n"));
    }

    #[test]
    fn parsing_is_deterministic(text in source(), version in version()) {
        let first = parse(&text, version, &ParseOptions::default()).unwrap();
        let second = parse(&text, version, &ParseOptions::default()).unwrap();
        prop_assert_eq!(first.tree, second.tree);
        prop_assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn stream_modes_agree(text in source(), version in version()) {
        let naive = ParseOptions {
            stream_mode: StreamMode::Naive,
            ..ParseOptions::default()
        };
        let fast = parse(&text, version, &ParseOptions::default()).unwrap();
        let lazy = parse(&text, version, &naive).unwrap();
        prop_assert_eq!(fast.tree, lazy.tree);
        prop_assert_eq!(fast.errors, lazy.errors);
    }

    #[test]
    fn clean_parses_print_back_exactly(
        names in prop::collection::vec("[a-z]{1,6}", 1..8),
        version in version(),
    ) {
        let text: String = names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name} = f({}, {name}[{i}])\n", i * 3))
            .collect();
        let result = parse(&text, version, &ParseOptions::default()).unwrap();
        prop_assume!(!result.has_errors());
        prop_assert_eq!(print_tree(&result.tree, &PrettyPrinterPrefs::default()), text);
    }
}

#[test]
fn test_fixture_stream_modes_agree() {
    let fixture = include_str!("fixtures/inventory.py");
    let naive = ParseOptions {
        stream_mode: StreamMode::Naive,
        ..ParseOptions::default()
    };
    for version in GrammarVersion::ALL {
        let fast = parse(fixture, version, &ParseOptions::default()).unwrap();
        let lazy = parse(fixture, version, &naive).unwrap();
        assert_eq!(fast.tree, lazy.tree, "trees differ under {version}");
        assert_eq!(fast.errors, lazy.errors, "errors differ under {version}");
    }
}

#[test]
fn test_fixture_spans_nest() {
    let fixture = include_str!("fixtures/inventory.py");
    for version in GrammarVersion::ALL {
        let result = parse(fixture, version, &ParseOptions::default()).unwrap();
        let misplaced = misplaced_spans(&result.tree);
        assert!(misplaced.is_empty(), "under {version}:\n{}", misplaced.join("\n"));
    }
}
