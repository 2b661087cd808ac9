pub mod cache;
pub mod cli;
pub mod config;
mod db;
pub mod distance;
mod error;
pub mod extract;
mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod store;
mod utils;

pub use config::Opts;
pub use db::{FaceSummaryRecord, ImageCountRecord, ImageRecord};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunStats};
pub use resolver::{Resolution, Resolver};
pub use store::{FaceId, FaceStore};
