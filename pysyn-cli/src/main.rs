//! Command-line interface for pysyn
//! Parses one Python file and writes the tree, the reprinted source or the diagnostics.
//!
//! Usage:
//!   pysyn `<path>` [--grammar `<version>`] [--format `<format>`]   - Parse and print
//!   pysyn `<path>` --format errors                                 - List diagnostics, exit 2 if any

use clap::{Arg, ArgAction, Command};
use log::{LevelFilter, Log, Metadata, Record};
use pysyn_config::{Loader, PysynConfig};
use pysyn_parser::pysyn::formats::{print_tree, to_json_str, to_snapshot, to_treeviz_str, PrettyPrinterPrefs};
use pysyn_parser::pysyn::grammar::GrammarVersion;
use pysyn_parser::pysyn::{parse, ParseOptions, ParseResult};
use std::process;

const FORMATS: &[&str] = &["print", "treeviz", "json", "yaml", "errors"];

/// Writes `log` records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let matches = Command::new("pysyn")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Error-tolerant parser for Python sources")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the Python file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("grammar")
                .long("grammar")
                .short('g')
                .help("Grammar version (2.4, 2.5, 2.6, 3.0); overrides the config"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(FORMATS.to_vec())
                .default_value("print"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Log recovery decisions to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("naive-stream")
                .long("naive-stream")
                .help("Lex tokens on demand instead of up front")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches.get_one::<String>("path").expect("path is required");
    let format = matches
        .get_one::<String>("format")
        .expect("format has a default");

    let trace = matches.get_flag("trace");
    if trace && log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }

    let grammar = matches
        .get_one::<String>("grammar")
        .map(|name| name.parse::<GrammarVersion>())
        .transpose()
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        });

    let config = load_config(
        matches.get_one::<String>("config").map(String::as_str),
        grammar,
        trace,
        matches.get_flag("naive-stream"),
    )
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });

    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", path, e);
        process::exit(1);
    });

    let result = run_parse(&config, &source).unwrap_or_else(|e| {
        eprintln!("Parse aborted: {}", e);
        process::exit(1);
    });

    let prefs = PrettyPrinterPrefs::from(&config.printer);
    match handle_format(&result, path, format, &prefs) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn load_config(
    file: Option<&str>,
    grammar: Option<GrammarVersion>,
    trace: bool,
    naive_stream: bool,
) -> Result<PysynConfig, pysyn_config::ConfigError> {
    let mut loader = Loader::new().with_optional_file("pysyn.toml");
    if let Some(file) = file {
        loader = loader.with_file(file);
    }
    if let Some(grammar) = grammar {
        loader = loader.set_override("parser.grammar", grammar.as_str())?;
    }
    if trace {
        loader = loader.set_override("parser.trace_recovery", true)?;
    }
    if naive_stream {
        loader = loader.set_override("parser.stream_mode", "naive")?;
    }
    loader.build()
}

fn run_parse(config: &PysynConfig, source: &str) -> Result<ParseResult, String> {
    let options = ParseOptions::from(&config.parser);
    parse(source, config.parser.grammar, &options).map_err(|e| e.to_string())
}

/// Write the requested view of `result` and return the exit status.
fn handle_format(
    result: &ParseResult,
    path: &str,
    format: &str,
    prefs: &PrettyPrinterPrefs,
) -> Result<i32, String> {
    let formatted = match format {
        "print" => print_tree(&result.tree, prefs),
        "treeviz" => to_treeviz_str(&result.tree),
        "json" => to_json_str(&result.tree)
            .map(|json| json + "\n")
            .map_err(|e| format!("JSON serialization failed: {}", e))?,
        "yaml" => serde_yaml::to_string(&to_snapshot(&result.tree))
            .map_err(|e| format!("YAML serialization failed: {}", e))?,
        "errors" => {
            for error in &result.errors {
                println!("{}:{}", path, error);
            }
            return Ok(if result.has_errors() { 2 } else { 0 });
        }
        other => return Err(format!("Unknown format '{}'", other)),
    };
    print!("{}", formatted);
    Ok(0)
}
