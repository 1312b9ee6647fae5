use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Error processing selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Failed to save output to {path}: {message}")]
    EncodeWrite { path: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Extraction,
    Output,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::Fetch { .. } => ErrorCategory::Network,
            ScrapeError::Selector { .. } => ErrorCategory::Extraction,
            ScrapeError::EncodeWrite { .. } | ScrapeError::IoError(_) => ErrorCategory::Output,
            ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // output failures are reported, the run itself still completed
            ScrapeError::EncodeWrite { .. } | ScrapeError::Selector { .. } => ErrorSeverity::Low,
            ScrapeError::Fetch { .. } => ErrorSeverity::Medium,
            ScrapeError::ConfigError { .. }
            | ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. }
            | ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::ProcessingError { .. } => ErrorSeverity::High,
            ScrapeError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the URL is reachable, or raise the timeout with --timeout-ms"
            }
            ErrorCategory::Extraction => "Check the selector syntax, e.g. 'a[href]' or '.title'",
            ErrorCategory::Output => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Check the command-line arguments or the config file",
            ErrorCategory::Processing => "Re-run with --verbose to see which page caused the failure",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::Fetch { url, message } => format!("Scraping failed for {}: {}", url, message),
            ScrapeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            ScrapeError::MissingConfigError { field } => format!("Missing {}", field),
            other => other.to_string(),
        }
    }

    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
