use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use dbml_drawio::document::DiagramOptions;
use dbml_drawio::id::{IdSource, RandomIds};
use dbml_drawio::{output_stem, puml, read_schema, schema_to_drawio};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// draw.io XML (.xml)
    Drawio,
    /// PlantUML (.puml)
    Puml,
    /// Both outputs
    All,
}

#[derive(Parser)]
#[command(name = "dbml-drawio")]
#[command(version)]
#[command(about = "Render a DBML schema as a draw.io ER diagram or PlantUML", long_about = None)]
struct Cli {
    /// Input .dbml file
    input: PathBuf,

    /// Output directory (default: the input's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "drawio")]
    format: Format,

    /// Fail when a reference cannot be attached to exactly two key rows
    #[arg(long)]
    strict: bool,

    /// Seed for reproducible cell ids
    #[arg(long)]
    seed: Option<u64>,

    /// PlantUML title (default: the input file stem)
    #[arg(long)]
    title: Option<String>,

    /// Verbose logging (skipped references, table sizes)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let schema = read_schema(&cli.input)?;
    tracing::debug!(
        tables = schema.tables.len(),
        refs = schema.refs.len(),
        "parsed schema"
    );

    let stem = output_stem(&cli.input)
        .with_context(|| format!("cannot derive an output name from {}", cli.input.display()))?;
    let out_dir = match &cli.out_dir {
        Some(dir) => dir.clone(),
        None => cli
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    if matches!(cli.format, Format::Drawio | Format::All) {
        let mut ids: Box<dyn IdSource> = match cli.seed {
            Some(seed) => Box::new(RandomIds::seeded(seed)),
            None => Box::new(RandomIds::new()),
        };
        let options = DiagramOptions {
            strict: cli.strict,
            ..Default::default()
        };
        let xml = schema_to_drawio(&schema, options, ids.as_mut())?;
        write_output(&out_dir.join(format!("{}.xml", stem)), &xml)?;
    }

    if matches!(cli.format, Format::Puml | Format::All) {
        let title = cli.title.as_deref().unwrap_or(stem);
        let text = puml::render(&schema, title);
        write_output(&out_dir.join(format!("{}.puml", stem)), &text)?;
    }

    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote diagram");
    Ok(())
}
