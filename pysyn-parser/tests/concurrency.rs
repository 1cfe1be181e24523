//! Parses on many threads at once do not see each other.

use pysyn_parser::pysyn::formats::{print_tree, PrettyPrinterPrefs};
use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::{parse, ParseOptions, ParseSession};
use std::thread;

const FIXTURE: &str = include_str!("fixtures/inventory.py");
const THREADS: usize = 70;

fn print(source: &str, version: GrammarVersion) -> String {
    let result = parse(source, version, &ParseOptions::default()).unwrap();
    print_tree(&result.tree, &PrettyPrinterPrefs::default())
}

#[test]
fn test_concurrent_parses_match_sequential_baseline() {
    let baseline = print(FIXTURE, GrammarVersion::Python2_6);
    assert_eq!(baseline, FIXTURE);

    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| print(FIXTURE, GrammarVersion::Python2_6)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(outputs.len(), THREADS);
    for output in &outputs {
        assert_eq!(output, &baseline);
    }
}

#[test]
fn test_mixed_versions_in_parallel() {
    let baselines: Vec<_> = GrammarVersion::ALL
        .into_iter()
        .map(|version| {
            let result = parse(FIXTURE, version, &ParseOptions::default()).unwrap();
            (version, result.tree, result.errors)
        })
        .collect();

    thread::scope(|scope| {
        for round in 0..THREADS {
            let (version, tree, errors) = &baselines[round % baselines.len()];
            scope.spawn(move || {
                let session = ParseSession::new(*version, ParseOptions::default());
                let result = session.parse(FIXTURE).unwrap();
                assert_eq!(&result.tree, tree);
                assert_eq!(&result.errors, errors);
            });
        }
    });
}
