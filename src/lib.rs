pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::BatchConfig;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpFetcher;
pub use core::{engine::RunSummary, engine::ScrapeEngine, pipeline::ScrapePipeline};
pub use domain::model::{FlattenMode, HeaderPolicy, PageResult};
pub use utils::error::{Result, ScrapeError};
