//! ordo CLI: driving adapter for the ordo prefix predicate codec.
//!
//! Subcommands:
//! - `check <tokens> [--type T]`: validate a token stream decodes
//! - `decode <tokens> [--type T]`: print the decoded predicate in infix form
//! - `eval <tokens> [--type T] [--trace] --record key=value...`: evaluate against a record
//! - `info`: print registered record types and their fields
//!
//! Token streams are read from `.json` files, or YAML for any other extension.
//! Record types come from `ordo-test` (`monster`, `relic`). Set `ORDO_LOG` to
//! control log output (e.g. `ORDO_LOG=ordo=debug`).

use std::process;

use ordo::{decode, encode, FieldRegistry, PredicateRunner, Record, TokenStream};
use ordo_test::{Monster, RecordFixture, Relic};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    tracing::debug!(command = %args[1], args = args.len() - 2, "dispatch");
    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "decode" => cmd_decode(&args[2..]),
        "eval" => cmd_eval(&args[2..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(String::new())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ORDO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<String, String> {
    let options = Options::parse(args, "check")?;
    options.reject_record_flags("check")?;
    let stream = load_stream(&options.path)?;
    match options.record {
        RecordType::Monster => check_as::<Monster>(&stream),
        RecordType::Relic => check_as::<Relic>(&stream),
    }
}

fn cmd_decode(args: &[String]) -> Result<String, String> {
    let options = Options::parse(args, "decode")?;
    options.reject_record_flags("decode")?;
    let stream = load_stream(&options.path)?;
    match options.record {
        RecordType::Monster => decode_as::<Monster>(&stream),
        RecordType::Relic => decode_as::<Relic>(&stream),
    }
}

fn cmd_eval(args: &[String]) -> Result<String, String> {
    let options = Options::parse(args, "eval")?;
    let stream = load_stream(&options.path)?;
    match options.record {
        RecordType::Monster => eval_as::<Monster>(&stream, &options),
        RecordType::Relic => eval_as::<Relic>(&stream, &options),
    }
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<String, String> {
    let mut out = String::new();
    for kind in [RecordType::Monster, RecordType::Relic] {
        let fields = match kind {
            RecordType::Monster => describe(Monster::registry()),
            RecordType::Relic => describe(Relic::registry()),
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}:\n{fields}", kind.name()));
    }
    Ok(out)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Per-record implementations
// ═══════════════════════════════════════════════════════════════════════════════

fn check_as<R: Record>(stream: &TokenStream) -> Result<String, String> {
    let expr = decode(stream, R::registry()).map_err(|e| format!("stream invalid: {e}"))?;
    Ok(format!(
        "Stream valid: {} tokens, {} comparisons, depth {}\n",
        stream.len(),
        expr.leaf_count(),
        expr.depth()
    ))
}

fn decode_as<R: Record>(stream: &TokenStream) -> Result<String, String> {
    let registry = R::registry();
    let expr = decode(stream, registry).map_err(|e| format!("decode failed: {e}"))?;
    let canonical = encode(&expr, registry)
        .and_then(|stream| stream.to_json())
        .map_err(|e| format!("re-encode failed: {e}"))?;
    Ok(format!("{expr}\n{canonical}\n"))
}

fn eval_as<R: RecordFixture>(stream: &TokenStream, options: &Options) -> Result<String, String> {
    let expr = decode(stream, R::registry()).map_err(|e| format!("decode failed: {e}"))?;
    let record = R::from_pairs(
        options
            .pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    )
    .map_err(|e| format!("invalid record: {e}"))?;
    let runner = PredicateRunner::<R>::for_record(expr).map_err(|e| e.to_string())?;

    if options.trace {
        let trace = runner.evaluate_with_trace(&record);
        Ok(format!("{trace}{}\n", trace.matched()))
    } else {
        Ok(format!("{}\n", runner.matches(&record)))
    }
}

fn describe<R>(registry: &FieldRegistry<R>) -> String {
    registry
        .descriptors()
        .map(|d| format!("  {:<8} {}\n", d.identifier(), d.kind()))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Stream loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_stream(path: &str) -> Result<TokenStream, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        TokenStream::from_json(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        TokenStream::from_yaml(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordType {
    Monster,
    Relic,
}

impl RecordType {
    fn parse(name: &str) -> Result<Self, String> {
        match name {
            "monster" => Ok(Self::Monster),
            "relic" => Ok(Self::Relic),
            other => Err(format!(
                "unknown record type \"{other}\", expected monster or relic"
            )),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Monster => "monster",
            Self::Relic => "relic",
        }
    }
}

#[derive(Debug)]
struct Options {
    path: String,
    record: RecordType,
    trace: bool,
    pairs: Vec<(String, String)>,
}

impl Options {
    fn parse(args: &[String], command: &str) -> Result<Self, String> {
        let Some((path, rest)) = args.split_first() else {
            return Err(format!("{command} requires a token stream file path"));
        };
        if path.starts_with("--") {
            return Err(format!("{command} requires a token stream file path"));
        }

        let mut options = Self {
            path: path.clone(),
            record: RecordType::Monster,
            trace: false,
            pairs: Vec::new(),
        };
        let mut i = 0;

        while i < rest.len() {
            match rest[i].as_str() {
                "--type" => {
                    let name = rest.get(i + 1).ok_or("--type requires a record type")?;
                    options.record = RecordType::parse(name)?;
                    i += 2;
                }
                "--trace" => {
                    options.trace = true;
                    i += 1;
                }
                "--record" => {
                    i += 1;
                    while i < rest.len() && !rest[i].starts_with("--") {
                        let pair = &rest[i];
                        let (key, value) = pair.split_once('=').ok_or_else(|| {
                            format!("invalid record pair \"{pair}\", expected key=value")
                        })?;
                        options.pairs.push((key.to_owned(), value.to_owned()));
                        i += 1;
                    }
                }
                other => return Err(format!("unexpected argument \"{other}\"")),
            }
        }

        Ok(options)
    }

    fn reject_record_flags(&self, command: &str) -> Result<(), String> {
        if self.trace || !self.pairs.is_empty() {
            return Err(format!("{command} does not take --trace or --record"));
        }
        Ok(())
    }
}

fn print_usage() {
    eprintln!(
        "Usage: ordo <command> [options]

Commands:
  check <tokens> [--type T]                         Validate a token stream
  decode <tokens> [--type T]                        Print the decoded predicate
  eval <tokens> [--type T] [--trace] --record k=v   Evaluate against a record
  info                                              Print record types and fields
  help                                              Show this help

Record types: monster (default), relic
Token files: .json, otherwise YAML"
    );
}
