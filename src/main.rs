#![allow(unused_assignments)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// JSON to configuration DSL converter
///
/// Converts a JSON object into a bracketed configuration document, evaluating
/// `${...}` expressions against constants defined by earlier keys. Without a
/// subcommand, `confdsl [FILE]` runs `convert`.
#[derive(Parser)]
#[command(name = "confdsl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    convert: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input file, or '-' for stdin
    #[arg(default_value = "config.json")]
    file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input format: json, yaml (default: from extension, then content)
    #[arg(short, long)]
    format: Option<String>,

    /// Reject top-level keys that are not valid constant names
    #[arg(long)]
    strict: bool,

    /// Suppress warnings
    #[arg(long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON (or YAML) document to the configuration DSL
    Convert(ConvertArgs),

    /// Validate a document without emitting output
    Check {
        /// Input file, or '-' for stdin
        #[arg(default_value = "config.json")]
        file: PathBuf,

        /// Input format: json, yaml (default: from extension, then content)
        #[arg(short, long)]
        format: Option<String>,

        /// Reject top-level keys that are not valid constant names
        #[arg(long)]
        strict: bool,
    },

    /// Internal: Evaluate a single expression (for debugging/testing)
    #[command(hide = true)]
    Eval {
        /// Expression, either `${+ A 1}` or a bare body `+ A 1`
        expression: String,

        /// Define a constant (can be used multiple times, format: NAME=value)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=value: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // Set up miette for nice error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        None => cmd_convert(cli.convert),
        Some(Commands::Convert(args)) => cmd_convert(args),
        Some(Commands::Check {
            file,
            format,
            strict,
        }) => cmd_check(file, format, strict),
        Some(Commands::Eval { expression, set }) => cmd_eval(expression, set),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let exit_code = match &e {
                // I/O and input errors
                confdsl::ConvertError::IoError { .. }
                | confdsl::ConvertError::ParseError { .. } => ExitCode::from(3),
                // All conversion errors
                _ => ExitCode::from(1),
            };
            eprintln!("{:?}", miette::Report::new(e));
            exit_code
        }
    }
}

fn is_stdin(file: &Path) -> bool {
    file.to_str() == Some("-") || file.to_str() == Some("/dev/stdin")
}

fn parse_format(format: Option<String>) -> confdsl::ConvertResult<Option<confdsl::InputFormat>> {
    format
        .map(|f| {
            confdsl::InputFormat::parse(&f).ok_or_else(|| {
                confdsl::ConvertError::io_error(format!(
                    "unknown input format '{}'. Use: json, yaml",
                    f
                ))
            })
        })
        .transpose()
}

fn load_document(
    file: &Path,
    format: Option<confdsl::InputFormat>,
) -> confdsl::ConvertResult<serde_json::Value> {
    if is_stdin(file) {
        confdsl::load_reader(std::io::stdin().lock(), format)
    } else {
        confdsl::load_file(file, format)
    }
}

fn cmd_convert(args: ConvertArgs) -> confdsl::ConvertResult<()> {
    let document = load_document(&args.file, parse_format(args.format)?)?;

    let options = confdsl::ConvertOptions::new().with_strict_names(args.strict);
    let mut converter = confdsl::Converter::new(options);
    let result = converter.convert(&document)?;

    if !args.quiet {
        for w in converter.warnings() {
            eprintln!("warning: {}", w.message);
        }
    }

    if let Some(out_path) = args.output {
        std::fs::write(&out_path, format!("{}\n", result)).map_err(|e| {
            confdsl::ConvertError::io_error(format!(
                "failed to write {}: {}",
                out_path.display(),
                e
            ))
        })?;
        eprintln!("Wrote {}", out_path.display());
    } else {
        println!("{}", result);
    }

    Ok(())
}

fn cmd_check(file: PathBuf, format: Option<String>, strict: bool) -> confdsl::ConvertResult<()> {
    let document = load_document(&file, parse_format(format)?)?;

    let options = confdsl::ConvertOptions::new().with_strict_names(strict);
    let mut converter = confdsl::Converter::new(options);
    converter.convert(&document)?;

    for w in converter.warnings() {
        eprintln!("warning: {}", w.message);
    }

    if is_stdin(&file) {
        eprintln!("<stdin>: OK");
    } else {
        eprintln!("{}: OK", file.display());
    }
    Ok(())
}

fn cmd_eval(expression: String, set: Vec<(String, String)>) -> confdsl::ConvertResult<()> {
    let mut constants = confdsl::Constants::new();
    for (name, raw) in set {
        // Values that parse as JSON keep their type, anything else is text
        let value = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(json) => confdsl::Value::from_json(&json, &name)?,
            Err(_) => confdsl::Value::Text(raw),
        };
        constants.define(name, value);
    }

    let source = if confdsl::lexer::is_expression(&expression) {
        expression
    } else {
        format!("${{{}}}", expression)
    };

    let operators = confdsl::OperatorTable::standard();
    let evaluator = confdsl::Evaluator::new(&operators, &constants, "<eval>");
    let emitter = confdsl::DslEmitter::new();

    if let Some(result) = evaluator.evaluate_str(&source)? {
        println!("{}", emitter.emit_operand(&result));
    }

    Ok(())
}
