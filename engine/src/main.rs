// Engine main entry point
use anyhow::{Context, Result};
use clap::Parser;
use engine::config::ReportSettings;
use engine::data::load_records;
use engine::ReportSession;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "engine")]
#[command(about = "Filter a shipment sheet by date window and client, then summarize it", long_about = None)]
struct Cli {
    /// Shipment sheet (.xlsx, .xls, .ods, .csv, .tsv)
    file: PathBuf,

    /// First day of the window, YYYY-MM-DD
    #[arg(long, default_value = "")]
    start: String,

    /// Last day of the window, YYYY-MM-DD
    #[arg(long, default_value = "")]
    end: String,

    /// Keep only this client (repeatable)
    #[arg(long = "client")]
    clients: Vec<String>,

    /// JSON settings file with column labels, weight unit and CSV delimiter
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print the unfiltered display JSON
    #[arg(long)]
    original: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => ReportSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ReportSettings::default(),
    };

    info!("Loading {}", cli.file.display());
    let records = load_records(&cli.file, &settings)
        .with_context(|| format!("Failed to load records from {}", cli.file.display()))?;

    let mut session = ReportSession::new(settings);
    session.load(records);
    session.set_start(&cli.start);
    session.set_end(&cli.end);
    for client in &cli.clients {
        if !session.selection().contains(client) {
            session.toggle_client(client);
        }
    }

    let report = session.report();
    println!("Clients: {}", report.clients.join(", "));
    println!("Records: {}", report.filtered_count());
    if !report.summary.is_empty() {
        println!("{}", report.summary);
    }
    println!("Total price: {}", report.total_price_label());
    println!("{}", report.display_json());

    if cli.original {
        println!("{}", report.original_display_json());
    }

    Ok(())
}
