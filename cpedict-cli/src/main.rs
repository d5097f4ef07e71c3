//! Command line front end for CPE dictionary documents.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use cpe_dict::{export_file, serialize, DictionaryParser, ExportOptions, ParseOptions, Parsed};
use tracing_subscriber::EnvFilter;

/// CPE dictionary tool
#[derive(Parser)]
#[command(name = "cpedict")]
#[command(version)]
#[command(about = "Validate, convert and inspect CPE dictionary documents", long_about = None)]
struct Cli {
    /// Log structural progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document against the dictionary grammar
    #[command(visible_alias = "v")]
    Validate {
        /// Input file
        input: String,
    },

    /// Parse a document and write it back out
    #[command(visible_alias = "c")]
    Convert {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Write everything on one line
        #[arg(long)]
        no_indent: bool,

        /// String written once per nesting level
        #[arg(long, default_value = "  ")]
        indent_unit: String,

        /// Output encoding (UTF-8 or US-ASCII)
        #[arg(short, long, default_value = "UTF-8")]
        encoding: String,

        /// Skip the grammar check before parsing
        #[arg(long)]
        skip_validation: bool,
    },

    /// Print counts of the entries and component tree in a document
    #[command(visible_alias = "s")]
    Stats {
        /// Input file
        input: String,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate { input } => run_validate(&input),
        Commands::Convert {
            input,
            output,
            no_indent,
            indent_unit,
            encoding,
            skip_validation,
        } => {
            let options = ExportOptions {
                indent: !no_indent,
                indent_unit,
                encoding,
            };
            run_convert(&input, output.as_deref(), &options, !skip_validation)
        }
        Commands::Stats { input } => run_stats(&input),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &str, validate: bool) -> Result<Parsed, Box<dyn std::error::Error>> {
    let parser = DictionaryParser::with_options(ParseOptions { validate });
    let parsed = parser.parse_file(path)?;
    if !parsed.diagnostics.is_empty() {
        eprintln!(
            "{}: {} elements skipped or reported",
            path,
            parsed.diagnostics.len()
        );
        parsed.diagnostics.write_report(&mut io::stderr())?;
    }
    Ok(parsed)
}

/// Runs the grammar check and a full parse.
fn run_validate(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load(input, true)?;
    eprintln!(
        "{}: valid ({} items, {} vendors)",
        input,
        parsed.dictionary.items().len(),
        parsed.dictionary.vendors().len()
    );
    Ok(())
}

/// Parses the input and writes the dictionary to the output.
fn run_convert(
    input: &str,
    output: Option<&str>,
    options: &ExportOptions,
    validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load(input, validate)?;
    match output {
        Some(path) => export_file(&parsed.dictionary, path, options)?,
        None => serialize(&parsed.dictionary, io::stdout().lock(), options)?,
    }
    Ok(())
}

fn run_stats(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load(input, true)?;
    let dict = &parsed.dictionary;

    let products: usize = dict.vendors().iter().map(|v| v.products().len()).sum();
    let versions: usize = dict
        .vendors()
        .iter()
        .flat_map(|v| v.products())
        .map(|p| p.versions().len())
        .sum();

    let mut out = io::stdout().lock();
    writeln!(out, "items:        {}", dict.items().len())?;
    writeln!(out, "deprecated:   {}", dict.deprecated_items().count())?;
    writeln!(
        out,
        "with checks:  {}",
        dict.items().iter().filter(|i| !i.checks().is_empty()).count()
    )?;
    writeln!(out, "vendors:      {}", dict.vendors().len())?;
    writeln!(out, "products:     {}", products)?;
    writeln!(out, "versions:     {}", versions)?;
    writeln!(out, "diagnostics:  {}", parsed.diagnostics.len())?;
    Ok(())
}
