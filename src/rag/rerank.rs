//! Hybrid reranking: staged prefilter + lexical blend + categorical boosts
//!
//! Nearest-neighbor similarity alone conflates dependent-visa clauses
//! (F-2/J-2/H-4) with their sponsoring visa's clauses: legally adjacent text
//! embeds close together. The staged scheme below corrects that bias without
//! discarding genuinely relevant general content when tags are sparse —
//! every stage fails open rather than collapsing the candidate set.

use crate::classify::VisaType;
use crate::rag::lexical::tfidf_similarities;
use crate::rag::ScoredCandidate;

/// Keywords marking dependent-family content
const DEPENDENT_KEYWORDS: [&str; 4] = ["dependent", "dependents", "spouse", "spouses"];

/// Reranking stage toggles and weights.
///
/// One policy serves every caller; evaluation and serving paths differ only
/// in the `top_k` they request, never in the algorithm.
#[derive(Debug, Clone)]
pub struct RerankPolicy {
    /// Wide candidate pool drawn from the index before any filtering
    pub pool_size: usize,
    /// A filter stage is skipped if it would leave fewer candidates than this
    pub min_candidates: usize,
    /// Apply the dependent-visa prefilter stage
    pub dependent_prefilter: bool,
    /// Apply the raw-tag restriction stage
    pub tag_filter: bool,
    /// Blend TF-IDF similarity into the score
    pub lexical_blend: bool,
    /// Weight of the TF-IDF similarity in the blended score
    pub lexical_weight: f32,
    /// Boost for candidates explicitly tagged with the raw visa label
    pub tag_boost: f32,
    /// Boost for candidates mentioning the standardized visa label
    pub label_boost: f32,
    /// Per-keyword boost for dependent-visa keyword mentions
    pub dependent_boost: f32,
}

impl Default for RerankPolicy {
    fn default() -> Self {
        Self {
            pool_size: 50,
            min_candidates: 5,
            dependent_prefilter: true,
            tag_filter: true,
            lexical_blend: true,
            lexical_weight: 0.15,
            tag_boost: 0.2,
            label_boost: 0.1,
            dependent_boost: 0.05,
        }
    }
}

/// Visa-aware candidate reranker
#[derive(Debug, Clone, Default)]
pub struct HybridReranker {
    policy: RerankPolicy,
}

impl HybridReranker {
    #[must_use]
    pub fn new(policy: RerankPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RerankPolicy {
        &self.policy
    }

    /// Rerank a wide candidate pool down to `top_k`.
    ///
    /// Pure over its inputs: the same pool and query always produce the same
    /// ordered output, and input candidates are never mutated in place.
    #[must_use]
    pub fn rerank(
        &self,
        query: &str,
        visa: Option<VisaType>,
        pool: &[ScoredCandidate],
        top_k: usize,
    ) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<&ScoredCandidate> = pool.iter().collect();

        // Stage 1: dependent-visa prefilter, fail-open below the floor
        if self.policy.dependent_prefilter {
            if let Some(visa) = visa.filter(|v| v.is_dependent()) {
                let filtered: Vec<&ScoredCandidate> = candidates
                    .iter()
                    .copied()
                    .filter(|c| {
                        let hay = c.haystack();
                        hay.contains(visa.standardized())
                            || contains_dependent_keyword(&hay.to_lowercase())
                    })
                    .collect();
                if filtered.len() >= self.policy.min_candidates {
                    candidates = filtered;
                }
            }
        }

        // Stage 2: restrict to explicitly tagged candidates when enough exist
        if self.policy.tag_filter {
            if let Some(visa) = visa {
                let tagged: Vec<&ScoredCandidate> = candidates
                    .iter()
                    .copied()
                    .filter(|c| c.clause.visa_tags.iter().any(|t| t == visa.tag()))
                    .collect();
                if tagged.len() >= self.policy.min_candidates {
                    candidates = tagged;
                }
            }
        }

        // Stage 3: blend lexical similarity and categorical boosts
        let lexical = if self.policy.lexical_blend {
            let texts: Vec<String> = candidates
                .iter()
                .map(|c| format!("{}\n{}", c.clause.title, c.clause.text))
                .collect();
            tfidf_similarities(query, &texts)
        } else {
            vec![0.0; candidates.len()]
        };

        let mut blended: Vec<ScoredCandidate> = candidates
            .iter()
            .zip(lexical.iter())
            .map(|(candidate, sim)| ScoredCandidate {
                clause: candidate.clause.clone(),
                score: candidate.score + self.policy.lexical_weight * sim + self.boost(candidate, visa),
            })
            .collect();

        blended.sort_by(|a, b| b.score.total_cmp(&a.score));
        blended.truncate(top_k);
        blended
    }

    fn boost(&self, candidate: &ScoredCandidate, visa: Option<VisaType>) -> f32 {
        let Some(visa) = visa else { return 0.0 };

        let mut bonus = 0.0;
        if candidate.clause.visa_tags.iter().any(|t| t == visa.tag()) {
            bonus += self.policy.tag_boost;
        }
        let hay = candidate.haystack();
        if hay.contains(visa.standardized()) {
            bonus += self.policy.label_boost;
        }
        if visa.is_dependent() {
            let low = hay.to_lowercase();
            for keyword in DEPENDENT_KEYWORDS {
                if low.contains(keyword) {
                    bonus += self.policy.dependent_boost;
                }
            }
        }
        bonus
    }
}

fn contains_dependent_keyword(haystack_lower: &str) -> bool {
    DEPENDENT_KEYWORDS
        .iter()
        .any(|keyword| haystack_lower.contains(keyword))
}
