//! Core library: resolving and creating semantically described data elements.

pub mod classifier;
pub mod config;
pub mod creator;
pub mod describer;
pub mod embeddings;
pub mod idmap;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod similarity;
pub mod vectorstore;

pub use creator::create;
pub use pipeline::{build_services, PipelineError, Services};
pub use resolver::resolve;
