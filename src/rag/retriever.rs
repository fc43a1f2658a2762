//! Visa-scoped retrieval: embed, search, threshold filter

use std::sync::Arc;

use tracing::debug;

use crate::classify::QuestionType;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::rag::ScoredCandidate;
use crate::store::DocumentStore;

/// Retriever over the per-visa vector indexes
pub struct Retriever {
    store: Arc<DocumentStore>,
    embeddings: Arc<EmbeddingClient>,
    score_threshold: f32,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(
        store: Arc<DocumentStore>,
        embeddings: Arc<EmbeddingClient>,
        score_threshold: f32,
    ) -> Self {
        Self {
            store,
            embeddings,
            score_threshold,
        }
    }

    /// Retrieval depth for an intent: complex questions pull more sources
    #[must_use]
    pub const fn depth(intent: QuestionType) -> usize {
        if intent.is_complex() {
            8
        } else {
            5
        }
    }

    /// Retrieve the top `k` candidates from the index keyed by `visa_key`.
    ///
    /// A missing index is a normal outcome and yields an empty result, not an
    /// error. Hits at or below the score threshold and no-result sentinels
    /// are discarded; scores attach to clause copies, never to store state.
    /// The returned sequence is ordered by descending similarity, length ≤ k.
    pub async fn retrieve(&self, query: &str, visa_key: &str, k: usize) -> Result<Vec<ScoredCandidate>> {
        let Some(index) = self.store.index(visa_key) else {
            debug!("No index for visa key '{visa_key}', returning empty result");
            return Ok(Vec::new());
        };

        let query_vector = self.embeddings.generate(query).await?;
        let hits = index.search(&query_vector, k)?;

        let candidates: Vec<ScoredCandidate> = hits
            .into_iter()
            .filter(|&(id, score)| id >= 0 && score > self.score_threshold)
            .filter_map(|(id, score)| {
                index.clause(id).map(|clause| ScoredCandidate {
                    clause: clause.clone(),
                    score,
                })
            })
            .collect();

        debug!(
            "Retrieved {} candidates from '{visa_key}' (k={k})",
            candidates.len()
        );
        Ok(candidates)
    }
}
