mod diagram;
mod docs;
mod input;
mod normalize;
mod schema;
mod sql;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-forge")]
#[command(version)]
#[command(
    about = "Turn entity/relationship extractions into SQL DDL, Mermaid ER diagrams and documentation",
    long_about = None
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize a raw extraction into a schema document
    Normalize {
        /// Extraction JSON file (entities + relationships)
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Schema name
        #[arg(long)]
        name: Option<String>,

        /// Schema description
        #[arg(long)]
        description: Option<String>,

        /// YAML file overriding the normalizer heuristics
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate SQL DDL for a schema
    Sql {
        /// Schema or extraction JSON file
        file: PathBuf,

        /// SQL dialect: mysql, postgresql, sqlite, or sqlserver
        #[arg(short, long, default_value = "mysql")]
        dialect: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML file overriding the normalizer heuristics (extraction input only)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a Mermaid ER diagram for a schema
    Diagram {
        /// Schema or extraction JSON file
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with an error when the diagram has validation findings
        #[arg(long)]
        strict: bool,
    },

    /// Generate schema documentation
    Docs {
        /// Schema or extraction JSON file
        file: PathBuf,

        /// Output format: markdown, html (pdf falls back to markdown)
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print JSON Schemas for the input and output documents
    Schema {
        /// Schema name (extraction, schema); all when omitted
        name: Option<String>,

        /// List available schema names
        #[arg(long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Install the stderr subscriber; `RUST_LOG` wins over the flags
pub fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    // A second install (tests) is harmless
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Normalize {
            file,
            output,
            name,
            description,
            config,
        } => normalize::run(file, output, name, description, config),
        Commands::Sql {
            file,
            dialect,
            output,
            config,
        } => sql::run(file, dialect, output, config),
        Commands::Diagram {
            file,
            output,
            strict,
        } => diagram::run(file, output, strict),
        Commands::Docs {
            file,
            format,
            output,
        } => docs::run(file, format, output),
        Commands::Schema { name, list } => schema::run(name, list),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-forge",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
