//! Command line front end for the runtime's text algorithms.
//!
//! Usage:
//!   esrt json <file|-> [--indent N]      # re-serialise JSON
//!   esrt uri encode-component "a b/c"    # URI encode/decode
//!   esrt number 0x1F [--radix 2]         # ToString(ToNumber(text))

use std::fs;
use std::io::{self, Read};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use esrt::runner::config::{
    RuntimeConfig, DEFAULT_MAX_CALL_DEPTH, ENV_HEAP_LIMIT, ENV_MAX_CALL_DEPTH, ENV_STRICT,
};
use esrt::runner::ds::error::{JErrorType, Message};
use esrt::runner::ds::operations::number_format::{number_to_string, to_radix_string};
use esrt::runner::ds::operations::type_conversion::to_number;
use esrt::runner::ds::string::JsString;
use esrt::runner::ds::value::JsValue;
use esrt::runner::runtime::{report_uncaught, EXIT_FAILURE, EXIT_SUCCESS};
use esrt::runner::std_lib::json::{parse_text, Stringifier};
use esrt::runner::std_lib::uri;
use esrt::runner::types::EvalContext;

#[derive(Debug, Parser)]
#[command(name = "esrt", version, about = "ECMAScript 5.1 runtime utilities")]
struct Cli {
    /// Log filter, e.g. `debug` or `esrt::runner=trace`.
    #[arg(long = "log", env = "ESRT_LOG", default_value = "warn", global = true)]
    log: String,

    /// Maximum number of live objects.
    #[arg(long = "heap-limit", env = ENV_HEAP_LIMIT, global = true)]
    heap_limit: Option<usize>,

    /// Nested calls allowed before a RangeError.
    #[arg(long = "max-call-depth", env = ENV_MAX_CALL_DEPTH, default_value_t = DEFAULT_MAX_CALL_DEPTH, global = true)]
    max_call_depth: usize,

    /// Run global code in strict mode.
    #[arg(long = "strict", env = ENV_STRICT, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse JSON and print it back through JSON.stringify.
    Json {
        /// Input file, or `-` for stdin.
        input: String,
        /// Indentation width, clamped to 10.
        #[arg(long = "indent", default_value_t = 0)]
        indent: u32,
    },
    /// Apply one of the global URI functions.
    Uri {
        #[arg(value_enum)]
        mode: UriMode,
        text: String,
    },
    /// Print ToString(ToNumber(text)), optionally in another radix.
    Number {
        text: String,
        #[arg(long = "radix")]
        radix: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UriMode {
    Encode,
    Decode,
    EncodeComponent,
    DecodeComponent,
}

impl Cli {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::new()
            .with_heap_limit(self.heap_limit)
            .with_max_call_depth(self.max_call_depth)
            .with_strict(self.strict)
    }
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(input)
    }
}

fn reformat_json(ctx: &mut EvalContext, text: &str, indent: u32) -> Result<String, JErrorType> {
    let value = parse_text(ctx, &JsString::from(text.to_string()))?;
    let mut stringifier = Stringifier::new(ctx, &JsValue::undefined(), &JsValue::from(indent))?;
    Ok(stringifier
        .stringify(ctx, value)?
        .map_or_else(|| "undefined".to_string(), |s| s.to_string()))
}

fn apply_uri(mode: UriMode, text: &str) -> Result<String, JErrorType> {
    let s = JsString::from(text.to_string());
    let out = match mode {
        UriMode::Encode => uri::encode_uri(&s)?,
        UriMode::Decode => uri::decode_uri(&s)?,
        UriMode::EncodeComponent => uri::encode_uri_component(&s)?,
        UriMode::DecodeComponent => uri::decode_uri_component(&s)?,
    };
    Ok(out.to_string())
}

fn format_number(ctx: &mut EvalContext, text: &str, radix: Option<u32>) -> Result<String, JErrorType> {
    let n = to_number(ctx, &JsValue::string(JsString::from(text.to_string())))?;
    match radix {
        None | Some(10) => Ok(number_to_string(n)),
        Some(r) if (2..=36).contains(&r) => Ok(to_radix_string(n, r)),
        Some(_) => Err(Message::BadRadix.into()),
    }
}

fn run(cli: Cli) -> i32 {
    let mut ctx = match EvalContext::new(cli.runtime_config()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Uncaught {}", e);
            return EXIT_FAILURE;
        }
    };
    let output = match cli.command {
        Command::Json { input, indent } => match read_input(&input) {
            Ok(text) => reformat_json(&mut ctx, &text, indent),
            Err(e) => {
                eprintln!("Error reading '{}': {}", input, e);
                return EXIT_FAILURE;
            }
        },
        Command::Uri { mode, text } => apply_uri(mode, &text),
        Command::Number { text, radix } => format_number(&mut ctx, &text, radix),
    };
    match output {
        Ok(line) => {
            println!("{}", line);
            EXIT_SUCCESS
        }
        Err(e) => report_uncaught(&mut ctx, e),
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new().parse_filters(&cli.log).init();
    debug!("{:?}", cli.command);
    process::exit(run(cli));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    #[test]
    fn test_reformat_json() {
        let mut ctx = context();
        let out = reformat_json(&mut ctx, r#" {"a": [1, 2.5, "x"], "b": null} "#, 0).unwrap();
        assert_eq!(out, r#"{"a":[1,2.5,"x"],"b":null}"#);
        let out = reformat_json(&mut ctx, r#"{"a":[1]}"#, 2).unwrap();
        assert_eq!(out, "{\n  \"a\": [\n    1\n  ]\n}");
        assert!(reformat_json(&mut ctx, "{,}", 0).is_err());
    }

    #[test]
    fn test_uri_modes() {
        assert_eq!(apply_uri(UriMode::EncodeComponent, "a b/c").unwrap(), "a%20b%2Fc");
        assert_eq!(apply_uri(UriMode::Decode, "%E2%82%AC").unwrap(), "€");
        assert!(apply_uri(UriMode::DecodeComponent, "%").is_err());
    }

    #[test]
    fn test_format_number() {
        let mut ctx = context();
        assert_eq!(format_number(&mut ctx, "0x1F", None).unwrap(), "31");
        assert_eq!(format_number(&mut ctx, " 255 ", Some(16)).unwrap(), "ff");
        assert_eq!(format_number(&mut ctx, "abc", None).unwrap(), "NaN");
        assert!(format_number(&mut ctx, "1", Some(37)).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["esrt", "--strict", "uri", "encode-component", "a b"]).unwrap();
        assert!(cli.runtime_config().strict);
        assert!(matches!(cli.command, Command::Uri { mode: UriMode::EncodeComponent, .. }));
        let cli = Cli::try_parse_from(["esrt", "json", "-", "--indent", "4"]).unwrap();
        assert!(matches!(cli.command, Command::Json { indent: 4, .. }));
    }
}
