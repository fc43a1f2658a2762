//! RAG pipeline for visa-aware retrieval and answer generation
//!
//! Control flow: visa classification → (clarification short-circuit) →
//! intent classification → visa-scoped retrieval → hybrid reranking →
//! knowledge augmentation → prompt composition → external generation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use visarag::config::AppConfig;
//! use visarag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     let response = service.chat("Can F-1 students work off campus?").await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {}", response.num_sources);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod lexical;
pub mod pipeline;
pub mod prompts;
pub mod rerank;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::ChatResponse;
pub use pipeline::RagService;
pub use rerank::HybridReranker;
pub use rerank::RerankPolicy;
pub use retriever::Retriever;

use serde::Serialize;

use crate::store::Clause;

/// A clause with its relevance score.
///
/// The score is a cosine-style similarity in [-1, 1] as retrieved; after
/// reranking it is a blended value used only for relative ordering.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub clause: Clause,
    pub score: f32,
}

impl ScoredCandidate {
    /// title + section + text haystack used for label and keyword matching
    #[must_use]
    pub fn haystack(&self) -> String {
        format!(
            "{} {} {}",
            self.clause.title, self.clause.section_hint, self.clause.text
        )
    }
}

/// Citation entry returned to the caller alongside the answer
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub section_hint: String,
    pub score: f32,
    pub visa_tags: Vec<String>,
}

impl From<&ScoredCandidate> for SourceRef {
    fn from(candidate: &ScoredCandidate) -> Self {
        Self {
            title: candidate.clause.title.clone(),
            url: candidate.clause.url.clone(),
            section_hint: candidate.clause.section_hint.clone(),
            score: candidate.score,
            visa_tags: candidate.clause.visa_tags.clone(),
        }
    }
}
