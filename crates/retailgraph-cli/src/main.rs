//! RetailGraph CLI
//!
//! Command-line interface for:
//! - Loading the retail transaction CSV into the graph (`ingest`)
//! - Probing store connectivity and credentials (`check`)
//! - The read path: raw Cypher (`query`) and schema sampling (`schema`)
//! - The assistant loop (`ask`) and the dashboard sink (`dashboard`)
//!
//! All configuration (store endpoint/credentials, LLM provider, output
//! directory) is resolved from the environment ONCE here and threaded down
//! as values; library crates never read the environment themselves.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use retailgraph_assistant::{
    answer_question, build_dashboard_spec, HttpProvider, ProviderConfig,
};
use retailgraph_dashboard::{
    save_dashboard, DashboardSpec, DEFAULT_OUTPUT_DIR, OUTPUT_DIR_ENV,
};
use retailgraph_ingest::{
    ingest_file, IngestOptions, DEFAULT_BATCH_SIZE, DEFAULT_DATASET_FILE,
};
use retailgraph_store::tools::{get_graph_schema, run_cypher_query};
use retailgraph_store::{GraphStore, StoreConfig, StoreError};

#[derive(Parser)]
#[command(name = "retailgraph")]
#[command(
    author,
    version,
    about = "Retail analytics over a Neo4j property graph"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a transaction CSV into the graph. Idempotent; rerun to converge
    /// after a partial failure.
    Ingest {
        /// Dataset path (defaults to Retail_Transactions_Dataset.csv)
        csv_path: Option<PathBuf>,
        /// Rows per mutation batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Probe connectivity and credentials against the configured store.
    Check,

    /// Execute a Cypher query and print the rows as JSON.
    Query {
        /// The Cypher query to execute
        cypher: String,
    },

    /// Print the graph schema (labels, relationship types, sampled
    /// properties per label).
    Schema,

    /// Ask a natural-language question about the data. Requires an LLM
    /// provider (RETAILGRAPH_LLM_API_KEY).
    Ask {
        /// The question to answer
        question: String,
        /// Also render the answer as an HTML dashboard
        #[arg(long)]
        dashboard: bool,
    },

    /// Render a dashboard payload (JSON file) to a static HTML page.
    Dashboard {
        /// Path to the payload JSON
        spec: PathBuf,
        /// Output directory (defaults to $OUTPUT_DIR, then `outputs`)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Output filename prefix
        #[arg(long, default_value = "dashboard")]
        prefix: String,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to initialize tokio runtime: {e}"))?;

    match cli.command {
        Commands::Ingest {
            csv_path,
            batch_size,
        } => {
            let path = csv_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_FILE));
            rt.block_on(cmd_ingest(&path, batch_size))
        }
        Commands::Check => rt.block_on(cmd_check()),
        Commands::Query { cypher } => rt.block_on(cmd_query(&cypher)),
        Commands::Schema => rt.block_on(cmd_schema()),
        Commands::Ask {
            question,
            dashboard,
        } => rt.block_on(cmd_ask(&question, dashboard)),
        Commands::Dashboard {
            spec,
            out_dir,
            prefix,
        } => cmd_dashboard(&spec, out_dir, &prefix),
    }
}

fn connect_store() -> Result<GraphStore> {
    let config = StoreConfig::from_env();
    eprintln!(
        "{} {} (database: {})",
        "connecting".cyan().bold(),
        config.uri,
        config.database
    );
    Ok(GraphStore::connect(&config)?)
}

async fn cmd_ingest(csv_path: &Path, batch_size: usize) -> Result<()> {
    let store = connect_store()?;
    eprintln!(
        "{} {}",
        "ingesting".cyan().bold(),
        csv_path.display().to_string().bold()
    );
    let options = IngestOptions { batch_size };
    let report = ingest_file(&store, csv_path, &options).await?;
    eprintln!(
        "{} {} rows in {} batches ({} rows with malformed product lists)",
        "done".green().bold(),
        report.rows,
        report.batches,
        report.malformed_product_rows
    );
    Ok(())
}

async fn cmd_check() -> Result<()> {
    let store = connect_store()?;
    match store.verify().await {
        Ok(message) => {
            eprintln!("{} database responded: {message}", "ok".green().bold());
            Ok(())
        }
        Err(e @ StoreError::Unavailable { .. }) => {
            eprintln!("{} {e}", "error:".red().bold());
            Err(e.into())
        }
        Err(e @ StoreError::Auth { .. }) => {
            eprintln!("{} {e}", "error:".red().bold());
            eprintln!("   If you are using Neo4j Desktop, make sure you have set the password.");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn cmd_query(cypher: &str) -> Result<()> {
    let store = connect_store()?;
    println!("{}", run_cypher_query(&store, cypher).await);
    Ok(())
}

async fn cmd_schema() -> Result<()> {
    let store = connect_store()?;
    println!("{}", get_graph_schema(&store).await);
    Ok(())
}

async fn cmd_ask(question: &str, dashboard: bool) -> Result<()> {
    let provider = HttpProvider::new(ProviderConfig::from_env()?)?;
    let store = connect_store()?;

    let reply = answer_question(&provider, &store, question).await?;
    eprintln!("{} {}", "cypher".cyan().bold(), reply.cypher);
    println!("{}", reply.summary);

    if dashboard {
        let spec = build_dashboard_spec(&provider, question, &reply).await;
        let path = save_dashboard(&spec, &output_dir(None), "dashboard")?;
        eprintln!(
            "{} {}",
            "wrote".green().bold(),
            path.display().to_string().bold()
        );
    }
    Ok(())
}

fn cmd_dashboard(spec_path: &Path, out_dir: Option<PathBuf>, prefix: &str) -> Result<()> {
    let raw = std::fs::read_to_string(spec_path)
        .with_context(|| format!("reading payload {}", spec_path.display()))?;
    let spec: DashboardSpec = serde_json::from_str(&raw)
        .with_context(|| format!("parsing payload {}", spec_path.display()))?;
    let path = save_dashboard(&spec, &output_dir(out_dir), prefix)?;
    eprintln!(
        "{} {}",
        "wrote".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn output_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        std::env::var(OUTPUT_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    })
}
