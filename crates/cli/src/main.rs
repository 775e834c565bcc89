mod report;
mod schema;

use anyhow::{Context, Result, bail};
use argkit::ParseOutcome;
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::ParseReport;
use crate::schema::{DEFAULT_SCHEMA_NAME, Schema, write_default_schema};

#[derive(Parser)]
#[command(name = "argkit-cli")]
#[command(version, about = "Declare arguments in a JSON schema and try token lists against them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argkit.json schema
    Init(InitArgs),

    /// Print the help text a schema produces
    Render(RenderArgs),

    /// Parse tokens against a schema and report the values
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Directory to write the schema into (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Replace an existing schema
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct RenderArgs {
    /// Path to the argument schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the argument schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,

    /// Tokens to parse, after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Render(args) => render(args),
        Commands::Parse(args) => parse_command(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let path = write_default_schema(&dir, args.force)?;
    eprintln!("Created: {}", path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {} to declare your arguments", DEFAULT_SCHEMA_NAME);
    eprintln!("  2. Run: argkit-cli render");
    eprintln!("  3. Run: argkit-cli parse -- <TOKENS>");

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    tracing::debug!("executing render command");

    let parser = Schema::from_file(&args.schema)?.build()?;
    print!("{}", parser.render_help());
    Ok(())
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!(tokens = args.tokens.len(), "executing parse command");

    let mut parser = Schema::from_file(&args.schema)?.build()?;
    let outcome = parser
        .parse(&args.tokens)
        .context("failed to parse tokens")?;
    let report = ParseReport::new(&parser, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !outcome.success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    if outcome == ParseOutcome::Help {
        print!("{}", parser.render_help());
        return Ok(());
    }

    print!("{}", report.to_text());
    if !outcome.success() {
        bail!(
            "{} argument(s) failed validation",
            outcome.failures().len()
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
