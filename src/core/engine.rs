use crate::core::report::render_page;
use crate::core::Pipeline;
use crate::utils::error::{Result, ScrapeError};

/// What a completed run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub pages: usize,
    pub rows: usize,
    pub columns: usize,
    /// `None` when nothing was written.
    pub output_path: Option<String>,
    /// Set when the output could not be saved; the run still completed.
    pub write_error: Option<String>,
}

pub struct ScrapeEngine<P: Pipeline> {
    pipeline: P,
    display_results: bool,
}

impl<P: Pipeline> ScrapeEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            display_results: false,
        }
    }

    /// Print a per-page summary to stdout after extraction.
    pub fn with_display(mut self, display_results: bool) -> Self {
        self.display_results = display_results;
        self
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Extracting pages...");
        let pages = self.pipeline.extract().await?;
        tracing::info!("Extracted {} page(s)", pages.len());

        if self.display_results {
            for page in &pages {
                println!("{}", render_page(page));
            }
        }

        let result = self.pipeline.transform(pages).await?;
        tracing::info!("Flattened into {} row(s)", result.rows.len());

        let mut summary = RunSummary {
            pages: result.pages.len(),
            rows: result.rows.len(),
            columns: result.columns,
            ..RunSummary::default()
        };

        match self.pipeline.load(&result).await {
            Ok(path) => {
                if let Some(path) = &path {
                    tracing::info!("Data saved to {}", path);
                }
                summary.output_path = path;
            }
            Err(e @ ScrapeError::EncodeWrite { .. }) => {
                tracing::error!("{}", e);
                summary.write_error = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }

        Ok(summary)
    }
}
