//! fplconv CLI - Convert player CSV files to JSON
//!
//! # Commands
//!
//! ```bash
//! fplconv convert                          # data/2024-25/cleaned_players.csv -> public/cleaned_players.json
//! fplconv convert players.csv -o out.json  # explicit paths
//! fplconv convert players.csv -o -         # JSON to stdout
//! fplconv inspect players.csv              # report columns and row count as JSON
//! fplconv flatten out.json -o back.csv     # JSON array back to CSV
//! ```
//!
//! Paths default to `FPLCONV_INPUT` / `FPLCONV_OUTPUT`, which may also be
//! set in a `.env` file.

use clap::{ArgAction, Args, Parser, Subcommand};
use fplconv::{
    convert_file, convert_to_writer, flatten_file, format_delimiter, inspect_file,
    ConversionReport, ConvertOptions, DelimiterChoice, InputEncoding, JsonStyle, ParseOptions,
    RaggedPolicy, DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_REST_KEY,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fplconv")]
#[command(about = "Convert FPL player CSV files to JSON", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file to a JSON array of objects
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON file ("-" for stdout)
        #[arg(short, long, env = "FPLCONV_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Parse a CSV file and print a summary as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Flatten a JSON array of objects back into CSV
    Flatten {
        /// Input JSON file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter: a single character or "tab"
        #[arg(short, long, default_value = ",")]
        delimiter: DelimiterChoice,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Input CSV file
    #[arg(env = "FPLCONV_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Field delimiter: a single character, "tab", or "auto"
    #[arg(short, long, default_value = ",")]
    delimiter: DelimiterChoice,

    /// Input encoding: "utf-8", "auto", or any WHATWG label such as "latin1"
    #[arg(short, long, default_value = "utf-8")]
    encoding: InputEncoding,

    /// Handling of rows with more or fewer cells than the header
    #[arg(long, value_enum, default_value_t = RaggedPolicy::Pad)]
    ragged: RaggedPolicy,

    /// Key for extra cells with --ragged collect
    #[arg(long, default_value = DEFAULT_REST_KEY)]
    rest_key: String,
}

#[derive(Args)]
struct StyleArgs {
    /// Spaces per indentation level
    #[arg(long, default_value = "2", conflicts_with = "compact")]
    indent: usize,

    /// Write everything on one line
    #[arg(long)]
    compact: bool,

    /// Escape non-ASCII characters as \uXXXX
    #[arg(long)]
    ascii: bool,

    /// End the document with a newline
    #[arg(long)]
    trailing_newline: bool,
}

impl SourceArgs {
    fn into_options(self, output: PathBuf, style: JsonStyle) -> ConvertOptions {
        ConvertOptions {
            input: self.input,
            output,
            encoding: self.encoding,
            parse: ParseOptions {
                delimiter: self.delimiter,
                ragged: self.ragged,
                rest_key: self.rest_key,
            },
            style,
        }
    }
}

impl From<StyleArgs> for JsonStyle {
    fn from(args: StyleArgs) -> Self {
        JsonStyle {
            indent: if args.compact { None } else { Some(args.indent) },
            ascii: args.ascii,
            trailing_newline: args.trailing_newline,
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Convert {
            source,
            output,
            style,
        } => cmd_convert(source.into_options(output, style.into()), quiet),

        Commands::Inspect { source } => {
            cmd_inspect(source.into_options(PathBuf::from(DEFAULT_OUTPUT), JsonStyle::default()))
        }

        Commands::Flatten {
            input,
            output,
            delimiter,
        } => cmd_flatten(&input, output.as_deref(), delimiter, quiet),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_convert(options: ConvertOptions, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !quiet {
        eprintln!("📄 Converting: {}", options.input.display());
    }

    let to_stdout = options.output == Path::new("-");
    let report = if to_stdout {
        convert_to_writer(&options, io::stdout().lock())?
    } else {
        convert_file(&options)?
    };

    if !quiet {
        print_summary(&report);
        eprintln!("✅ Converted {} records", report.row_count);
        if let Some(ref path) = report.output {
            eprintln!("💾 Output written to: {}", path.display());
        }
    }

    Ok(())
}

fn cmd_inspect(options: ConvertOptions) -> Result<(), Box<dyn std::error::Error>> {
    let report = inspect_file(&options)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_flatten(
    input: &Path,
    output: Option<&Path>,
    delimiter: DelimiterChoice,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let delimiter = match delimiter {
        DelimiterChoice::Fixed(d) => d,
        DelimiterChoice::Auto => return Err("flatten needs an explicit delimiter".into()),
    };

    if !quiet {
        eprintln!("📦 Flattening: {}", input.display());
    }

    let rows = flatten_file(input, output, delimiter)?;

    if !quiet {
        eprintln!("✅ Wrote {} rows", rows);
        if let Some(path) = output {
            eprintln!("💾 Output written to: {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(report: &ConversionReport) {
    eprintln!("   Encoding: {}", report.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.delimiter as u8));
    eprintln!("   Columns: {}", report.headers.join(", "));
    if report.ragged_rows > 0 {
        eprintln!("   ⚠️  Ragged rows: {}", report.ragged_rows);
    }
}
