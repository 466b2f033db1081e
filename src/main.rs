use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rvsnoop::config::Config;
use rvsnoop::ingest::{self, CHANNEL_CAPACITY};
use rvsnoop::render::{self, LineFormat};
use rvsnoop::{
    ClassificationTable, FieldAccessor, FilterEvent, Message, PredicateKind, RecordMatcher,
    TypeDefinitions,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "rvsnoop", about = "rvsnoop: classify and filter bus messages")]
struct Cli {
    /// Write debug logs to /tmp/rvsnoop-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Config file to use instead of ~/.config/rvsnoop/config.toml.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record type definitions (JSON) to use instead of the built-in types.
    #[arg(long, value_name = "FILE")]
    types: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List record types in priority order.
    Types,
    /// List field accessors.
    Accessors,
    /// List predicates.
    Predicates,
    /// Validate a single accessor/predicate rule.
    Check {
        #[arg(long)]
        accessor: String,
        #[arg(long)]
        predicate: String,
        #[arg(long)]
        argument: String,
        #[arg(long)]
        ignore_case: bool,
    },
    /// Classify JSON-line records and print one line per record.
    Classify {
        /// Read records from FILE instead of stdin.
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Deselect the named record type. Repeatable.
        #[arg(long = "hide", value_name = "NAME")]
        hide: Vec<String>,
        /// Drop records whose type is deselected.
        #[arg(long)]
        visible_only: bool,
    },
    /// Print the current record type definitions as JSON.
    ExportTypes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/rvsnoop-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("rvsnoop debug log started, tail -f /tmp/rvsnoop-debug.log");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    match cli.command {
        Command::Accessors => {
            for name in FieldAccessor::display_names() {
                println!("{name}");
            }
        }
        Command::Predicates => {
            for kind in PredicateKind::all() {
                println!("{}\t{}", kind.identifier(), kind.display_name());
            }
        }
        Command::Check {
            accessor,
            predicate,
            argument,
            ignore_case,
        } => {
            let matcher =
                RecordMatcher::from_identifiers(&accessor, &predicate, argument, ignore_case)?;
            println!("ok: {matcher}");
        }
        Command::Types => {
            let table = load_table(cli.types.as_deref(), &config)?;
            for (i, record_type) in table.all_types().iter().enumerate() {
                println!("{}", render::type_row(i + 1, record_type));
            }
        }
        Command::ExportTypes => {
            let table = load_table(cli.types.as_deref(), &config)?;
            println!("{}", table.definitions().to_json_pretty());
        }
        Command::Classify {
            input,
            hide,
            visible_only,
        } => {
            let table = Arc::new(load_table(cli.types.as_deref(), &config)?);
            let format = LineFormat::from_config(&config.output);
            classify(table, input, &hide, visible_only, format).await?;
        }
    }

    Ok(())
}

/// `--types` wins over `[types] definitions`; with neither, the seed types.
fn load_table(types: Option<&Path>, config: &Config) -> anyhow::Result<ClassificationTable> {
    let path = types
        .map(Path::to_path_buf)
        .or_else(|| config.types.definitions_path());
    let Some(path) = path else {
        return Ok(ClassificationTable::new());
    };
    let defs = TypeDefinitions::load(&path)?;
    ClassificationTable::from_definitions(&defs)
        .with_context(|| format!("invalid record types in {}", path.display()))
}

async fn classify(
    table: Arc<ClassificationTable>,
    input: Option<PathBuf>,
    hide: &[String],
    visible_only: bool,
    format: LineFormat,
) -> anyhow::Result<()> {
    let filter = table.filter();
    filter.subscribe(|event: FilterEvent| tracing::debug!(?event, "type filter changed"));

    for name in hide {
        let Some(record_type) = table.find_by_name(name) else {
            bail!("no record type named {name:?}");
        };
        table.set_selected(record_type.id(), false)?;
    }

    let (tx, mut rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);
    let reader = tokio::spawn(async move {
        match input {
            Some(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))?;
                ingest::read_records(BufReader::new(file), tx).await
            }
            None => ingest::read_records(BufReader::new(tokio::io::stdin()), tx).await,
        }
    });

    let mut out = std::io::BufWriter::new(std::io::stdout());
    while let Some(record) = rx.recv().await {
        if visible_only && !filter.matches(&record) {
            continue;
        }
        let record_type = table.classify(&record);
        writeln!(out, "{}", format.classified(&record, &record_type))?;
    }
    out.flush()?;

    let stats = reader.await.context("record reader task failed")??;
    tracing::info!(records = stats.records, skipped = stats.skipped, "classify finished");
    Ok(())
}
