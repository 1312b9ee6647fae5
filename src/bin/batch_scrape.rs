use anyhow::Context;
use clap::Parser;
use selective_scraper::core::ConfigProvider;
use selective_scraper::utils::{logger, validation::Validate};
use selective_scraper::{BatchConfig, LocalStorage, ScrapeEngine, ScrapePipeline};

#[derive(Parser)]
#[command(name = "batch-scrape")]
#[command(about = "Scrape several pages with one selector set, driven by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "scrape.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Show what would be scraped without fetching anything
    #[arg(long)]
    dry_run: bool,
}

fn display_plan(config: &BatchConfig) {
    println!("📋 Batch plan");
    println!("  URLs ({}):", config.urls().len());
    for url in config.urls() {
        println!("    - {}", url);
    }
    if config.selectors().is_empty() {
        println!("  Selectors: (default) h1, h2, p, a");
    } else {
        println!("  Selectors: {}", config.selectors().join(", "));
    }
    println!(
        "  Mode: {}{}",
        config.mode(),
        if config.text_only() { " (text-only)" } else { "" }
    );
    println!("  Delay between requests: {} ms", config.delay_ms());
    println!("  Output directory: {}", config.output_path());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);
    let config = BatchConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_plan(&config);
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched");
        return Ok(());
    }

    let requested = config.urls().len();
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline =
        ScrapePipeline::new(storage, config).context("failed to set up the HTTP client")?;
    let engine = ScrapeEngine::new(pipeline);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    println!(
        "✅ Scraped {}/{} page(s), {} row(s)",
        summary.pages, requested, summary.rows
    );
    match (&summary.output_path, &summary.write_error) {
        (Some(path), _) => println!("📁 Output saved to: {}", path),
        (None, Some(error)) => eprintln!("Failed to save CSV: {}", error),
        (None, None) => println!("No data to save"),
    }

    Ok(())
}
