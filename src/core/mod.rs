pub mod batch;
pub mod csv_encoder;
pub mod engine;
pub mod extraction;
pub mod flatten;
pub mod normalizer;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{PageResult, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Fetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
