use clap::Parser;
use selective_scraper::core::ConfigProvider;
use selective_scraper::utils::{logger, validation::Validate};
use selective_scraper::{CliConfig, LocalStorage, ScrapeEngine, ScrapePipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置 (before any network activity)
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("🎯 Targeting specific elements on: {}", config.url);
    if !config.selectors.is_empty() {
        tracing::info!("📋 Selectors: {}", config.selectors.join(", "));
    }

    let mode = config.mode();
    let text_only = config.text_only();
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match ScrapePipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let engine = ScrapeEngine::new(pipeline).with_display(true);

    match engine.run().await {
        Ok(summary) => {
            match (&summary.output_path, &summary.write_error) {
                (Some(path), _) => {
                    println!("\n✅ Data saved to {}", path);
                    println!("Total rows: {}", summary.rows);
                    println!("Columns: {}", summary.columns);
                    println!(
                        "\n📊 Results saved in {}{} mode",
                        mode,
                        if text_only { " text-only" } else { "" }
                    );
                }
                (None, Some(error)) => eprintln!("Failed to save CSV: {}", error),
                (None, None) => println!("No data extracted for CSV"),
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ Error: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
