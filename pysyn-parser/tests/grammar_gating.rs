//! Which grammar versions accept which constructs.

use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::testing::assert_round_trip;
use pysyn_parser::pysyn::{parse, ParseOptions};
use rstest::rstest;

const LEGACY_ONLY: [bool; 4] = [true, true, true, false];
const FROM_2_6: [bool; 4] = [false, false, true, true];
const ONLY_3_0: [bool; 4] = [false, false, false, true];
const EVERYWHERE: [bool; 4] = [true, true, true, true];

#[rstest]
#[case::tuple_comprehension_source("l = [x for x in 1, 2, 3, 4]\n", LEGACY_ONLY)]
#[case::print_statement("print x\n", LEGACY_ONLY)]
#[case::exec_statement("exec code in ns\n", LEGACY_ONLY)]
#[case::backquotes("s = `x`\n", LEGACY_ONLY)]
#[case::legacy_not_equal("t = a <> b\n", LEGACY_ONLY)]
#[case::except_comma("try:\n    pass\nexcept E, e:\n    pass\n", LEGACY_ONLY)]
#[case::raise_comma("raise E, 'message'\n", LEGACY_ONLY)]
#[case::tuple_parameter("def f(a, (b, c)):\n    pass\n", LEGACY_ONLY)]
#[case::long_suffix("n = 10L\n", LEGACY_ONLY)]
#[case::legacy_octal("n = 0755\n", LEGACY_ONLY)]
#[case::unicode_prefix("s = u'text'\n", LEGACY_ONLY)]
#[case::except_as("try:\n    pass\nexcept E as e:\n    pass\n", FROM_2_6)]
#[case::class_decorator("@dec\nclass C:\n    pass\n", FROM_2_6)]
#[case::prefixed_octal("n = 0o755\n", FROM_2_6)]
#[case::bytes_prefix("s = b'raw'\n", FROM_2_6)]
#[case::nonlocal("def f():\n    nonlocal x\n", ONLY_3_0)]
#[case::annotations("def f(a: int) -> str:\n    pass\n", ONLY_3_0)]
#[case::keyword_only("def f(a, *, b=1):\n    pass\n", ONLY_3_0)]
#[case::set_literal("s = {1, 2}\n", ONLY_3_0)]
#[case::set_comprehension("s = {x for x in y}\n", ONLY_3_0)]
#[case::dict_comprehension("d = {k: v for k, v in y}\n", ONLY_3_0)]
#[case::star_target("a, *rest = items\n", ONLY_3_0)]
#[case::raise_from("raise E from cause\n", ONLY_3_0)]
#[case::class_keywords("class C(metaclass=M):\n    pass\n", ONLY_3_0)]
#[case::ellipsis("x = ...\n", ONLY_3_0)]
#[case::with_statement("with open(p) as f:\n    pass\n", EVERYWHERE)]
#[case::function_decorator("@dec\ndef f():\n    pass\n", EVERYWHERE)]
#[case::conditional_expression("x = a if b else c\n", EVERYWHERE)]
#[case::generator_argument("s = sum(x for x in y)\n", EVERYWHERE)]
#[case::relative_import("from ..pkg import name\n", EVERYWHERE)]
fn test_construct_acceptance(#[case] source: &str, #[case] accepted: [bool; 4]) {
    for (version, clean) in GrammarVersion::ALL.into_iter().zip(accepted) {
        let result = parse(source, version, &ParseOptions::default()).unwrap();
        assert_eq!(
            !result.has_errors(),
            clean,
            "{source:?} under {version}: {:?}",
            result.errors
        );
        assert_round_trip(source, version);
    }
}

#[rstest]
#[case("2.4", GrammarVersion::Python2_4)]
#[case("2.5", GrammarVersion::Python2_5)]
#[case("2.6", GrammarVersion::Python2_6)]
#[case("3.0", GrammarVersion::Python3_0)]
fn test_version_names(#[case] name: &str, #[case] version: GrammarVersion) {
    assert_eq!(name.parse::<GrammarVersion>().unwrap(), version);
    assert_eq!(version.to_string(), name);
}

#[test]
fn test_unknown_version_name() {
    let error = "2.7".parse::<GrammarVersion>().unwrap_err();
    assert_eq!(
        error.to_string(),
        "unknown grammar version '2.7' (expected one of 2.4, 2.5, 2.6, 3.0)"
    );
}

#[test]
fn test_legacy_versions_share_a_table() {
    assert!(std::ptr::eq(
        GrammarVersion::Python2_4.grammar(),
        GrammarVersion::Python2_5.grammar()
    ));
    assert!(!std::ptr::eq(
        GrammarVersion::Python2_5.grammar(),
        GrammarVersion::Python2_6.grammar()
    ));
}
