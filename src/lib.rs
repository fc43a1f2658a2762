pub mod classify;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod store;

pub use config::AppConfig;
pub use errors::*;
