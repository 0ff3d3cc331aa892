use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netmap_graph::api::{self, GraphStore, SecurityConfig};
use netmap_graph::client::RestClient;
use netmap_graph::collection::{FetchOptions, GraphCollection};
use netmap_graph::models::{GraphRecord, RecordId};

#[derive(Parser)]
#[command(name = "netmap-graph")]
#[command(about = "Synchronize netmap graph records with a REST endpoint")]
struct Cli {
    /// Resource path or absolute URL of the graph collection
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a development graph server backed by memory
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Fetch and print all graph records
    List,
    /// Create a graph record from a JSON object
    Create {
        /// Record attributes, e.g. '{"layer": 2}'
        json: String,
    },
    /// Replace a graph record
    Update {
        id: String,
        /// Record attributes, e.g. '{"layer": 3}'
        json: String,
    },
    /// Delete a graph record
    Delete { id: String },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "netmap_graph=debug,tower_http=debug".into()),
    );

    // stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting netmap graph server on port {}", port);

    let app = api::create_router(GraphStore::new(), SecurityConfig::from_env());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Graph API listening on http://127.0.0.1:{}/api/graph", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn collection(url: Option<String>) -> anyhow::Result<GraphCollection> {
    let client = RestClient::from_env();
    match url {
        Some(url) => Ok(GraphCollection::builder(client).url(url).build()?),
        None => Ok(GraphCollection::graph(client)),
    }
}

fn parse_record(json: &str) -> anyhow::Result<GraphRecord> {
    serde_json::from_str(json).context("Record must be a JSON object")
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        Some(Commands::List) => {
            let mut graphs = collection(cli.url)?;
            graphs.fetch(FetchOptions::default()).await?;
            print_json(&graphs.records())?;
        }
        Some(Commands::Create { json }) => {
            let mut graphs = collection(cli.url)?;
            let record = parse_record(&json)?;
            let saved = graphs.create(record).await?;
            print_json(&saved)?;
        }
        Some(Commands::Update { id, json }) => {
            let mut graphs = collection(cli.url)?;
            let mut record = parse_record(&json)?;
            record.id = Some(RecordId::parse(&id));
            let saved = graphs.save(record).await?;
            print_json(&saved)?;
        }
        Some(Commands::Delete { id }) => {
            let mut graphs = collection(cli.url)?;
            graphs.destroy(&RecordId::parse(&id)).await?;
            println!("Deleted graph record {}", id);
        }
        None => serve(8080).await?,
    }

    Ok(())
}
