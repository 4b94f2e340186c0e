use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use nuliga_calendar::config::FileConfig;
use nuliga_calendar::constants::DEFAULT_OUTPUT;
use nuliga_calendar::http_client::HttpFetcher;
use nuliga_calendar::logging;
use nuliga_calendar::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "nuliga_calendar")]
#[command(about = "Scrape a nuLiga Team Portrait page into Google Calendar CSV")]
#[command(version)]
struct Cli {
    /// nuLiga teamPortrait URL
    #[arg(long)]
    url: String,

    /// Output CSV path
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Event duration in minutes [default: 120]
    #[arg(long)]
    duration: Option<u32>,

    /// Do not follow hall links for the full address
    #[arg(long)]
    no_enrich: bool,

    /// TOML file with fetch and export settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let options = file_config.export_options(cli.duration, cli.no_enrich);
    let fetcher = HttpFetcher::new(&file_config.fetch_config())
        .context("Failed to build HTTP client")?;

    let summary = Pipeline::run(&fetcher, &cli.url, &cli.out, &options)
        .with_context(|| format!("Export of {} failed", cli.url))?;

    println!(
        "✅ Wrote {} events → {}",
        summary.records,
        summary.output.display()
    );
    if summary.venue_fallbacks > 0 {
        println!(
            "⚠️  {} venues kept their short code (address lookup failed)",
            summary.venue_fallbacks
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = logging::init_logging(cli.log_dir.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|()| run(cli));
    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
