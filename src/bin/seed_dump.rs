//! seed-dump: dump database rows as Ruby seed code
//!
//! # Usage
//!
//! ```bash
//! # Print User.create!([...]) for the users table
//! seed-dump --database-url sqlite://db/development.sqlite3 --table users
//!
//! # Several tables into one seeds file, bulk import form
//! seed-dump -t users,posts --file db/seeds.rb --import "validate: false"
//!
//! # Idempotent migration
//! seed-dump -t users --file db/migrate/20240101_seed_users.rb --migration --query "id: 1"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use seed_dump::inflect::classify;
use seed_dump::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seed-dump")]
#[command(version)]
#[command(about = "🌱 Dump database rows as re-runnable Ruby seed code", long_about = None)]
#[command(after_help = "EXAMPLES:
    seed-dump -t users
    seed-dump -t users,posts -f db/seeds.rb --import
    seed-dump --json users.json --model User -x id
    seed-dump -t users -f db/migrate/20240101_seed_users.rb -m -q 'email: \"admin@example.com\"'")]
struct Cli {
    /// Tables to dump, in order
    #[arg(short, long = "table", value_delimiter = ',')]
    tables: Vec<String>,

    /// Read records from a JSON array of objects instead of a database
    #[arg(long, conflicts_with = "tables")]
    json: Option<PathBuf>,

    /// Class name used in the generated code (single source only)
    #[arg(long)]
    model: Option<String>,

    /// SQL condition restricting the dumped rows
    #[arg(long = "where")]
    filter: Option<String>,

    /// Column giving pages a stable order
    #[arg(long)]
    order_by: Option<String>,

    /// Database connection URL
    #[arg(long, env = "SEED_DUMP_DATABASE_URL")]
    database_url: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Append to the file instead of replacing it
    #[arg(short, long)]
    append: bool,

    /// Wrap the statement in a migration class
    #[arg(short, long)]
    migration: bool,

    /// Superclass of the generated migration
    #[arg(long)]
    migration_base: Option<String>,

    /// Ruby filter for the migration guard: `if Model.where(QUERY).empty?`
    #[arg(short, long)]
    query: Option<String>,

    /// Use Model.import; optional trailing options like "validate: false"
    #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
    import: Option<String>,

    /// Attributes to leave out (default: id,created_at,updated_at)
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Records per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Maximum number of records per source
    #[arg(short, long)]
    limit: Option<usize>,

    /// Config file (default: ./seed_dump.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "seed_dump=debug" } else { "seed_dump=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::discover()?,
    };
    let database_url = cli.database_url.clone().or(config.database_url.clone());
    let options = apply_flags(config.dump_options(), cli)?;

    if let Some(path) = &cli.json {
        let model = match &cli.model {
            Some(model) => model.clone(),
            None => classify(&file_stem(path)?),
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = Collection::from_json(model, &json)?;
        let dumped = dump_one(&source, &options)?;
        report(&options, dumped);
        return Ok(());
    }

    if cli.tables.is_empty() {
        println!("{}", "🌱 seed-dump".green().bold());
        println!();
        println!("Usage: seed-dump --table <TABLE> [OPTIONS]");
        println!();
        println!("Try: seed-dump --help");
        return Ok(());
    }

    let Some(url) = database_url else {
        bail!("No database URL. Use --database-url, set SEED_DUMP_DATABASE_URL or add database_url to {}",
            seed_dump::config::CONFIG_FILE);
    };

    if cli.model.is_some() && cli.tables.len() > 1 {
        bail!("--model needs a single --table");
    }

    let mut dumped = 0;
    for table in &cli.tables {
        if cli.verbose {
            eprintln!("{} {}", "Dumping:".dimmed(), table.yellow());
        }

        let mut query = SqlTable::connect(&url, table)?.without_columns(&options.exclude);
        if let Some(model) = &cli.model {
            query = query.with_model(model.clone());
        }
        if let Some(column) = &cli.order_by {
            query = query.with_order_by(column.clone())?;
        }
        if let Some(filter) = &cli.filter {
            query = query.with_filter(filter.clone());
        }

        // Once a table is written, later ones go after it in the same file
        let mut table_options = options.clone();
        table_options.append = options.append || dumped > 0;

        dumped += dump_one(&Paged::new(query), &table_options)?;
    }

    report(&options, dumped);
    Ok(())
}

/// Dump one source, printing code when there is no file. Returns 1 if
/// anything was written.
fn dump_one<S: RecordSource>(source: &S, options: &DumpOptions) -> Result<usize> {
    match seed_dump::dump_records(source, options)? {
        Dumped::Empty => Ok(0),
        Dumped::File { .. } => Ok(1),
        Dumped::Code { code, .. } => {
            print!("{}", code);
            Ok(1)
        }
    }
}

fn apply_flags(mut options: DumpOptions, cli: &Cli) -> Result<DumpOptions> {
    if let Some(file) = &cli.file {
        options.file = Some(file.clone());
    }
    options.append |= cli.append;
    options.migration |= cli.migration;
    if let Some(base) = &cli.migration_base {
        options.migration_base = base.clone();
    }
    if let Some(query) = &cli.query {
        options.query = Some(query.clone());
    }
    if let Some(import) = &cli.import {
        options.import = Some(ImportOptions::parse(import)?);
    }
    if let Some(exclude) = &cli.exclude {
        options.exclude = exclude.iter().filter(|e| !e.is_empty()).cloned().collect();
    }
    if let Some(size) = cli.batch_size {
        options.batch_size = size;
    }
    if let Some(limit) = cli.limit {
        options.limit = Some(limit);
    }
    options.validate()?;
    Ok(options)
}

fn report(options: &DumpOptions, dumped: usize) {
    match &options.file {
        _ if dumped == 0 => eprintln!("{}", "(no records)".dimmed()),
        Some(path) => println!(
            "{} Wrote {} model(s) to {}",
            "✓".green(),
            dumped,
            path.display().to_string().cyan()
        ),
        None => {}
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
        .with_context(|| format!("cannot derive a model name from {}", path.display()))
}
