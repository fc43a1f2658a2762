//! Read-only document store: per-visa vector indexes paired with clause metadata
//!
//! Each visa category (plus a `general` fallback) has a vector index and a
//! parallel ordered clause list. Index position `i` in the vector index
//! corresponds exactly to clause entry `i`; that positional correspondence is
//! the only linkage between a search hit and its document, so the two halves
//! are loaded and owned together by [`VisaIndex`] and callers can never reach
//! one without the other.

use std::collections::HashMap;
use std::path::Path;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::errors::Result;
use crate::errors::VisaRagError;

/// Raw visa tags with a dedicated index, in declaration order
pub const VISA_KEYS: [&str; 6] = ["F1", "F2", "H1B", "H4", "J1", "J2"];

/// Key of the fallback index used for unscoped queries
pub const GENERAL_KEY: &str = "general";

/// Sentinel id returned by an index for "no result at this rank"
pub const NO_RESULT: i64 = -1;

/// A retrievable unit of legal text with provenance metadata.
///
/// Immutable once built; created by the offline corpus pipeline and never
/// mutated by the serving path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clause {
    #[serde(default)]
    pub clause_id: String,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub section_hint: String,
    #[serde(default)]
    pub visa_tags: Vec<String>,
    #[serde(default)]
    pub retrieved_at: Option<DateTime<Utc>>,
}

/// Brute-force cosine index over unit-normalized vectors.
///
/// With unit-normalized rows the dot product is the cosine similarity, so
/// search is an exact scan rather than an approximate lookup. Corpus sizes
/// here are a few thousand clauses per visa, well within scan range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Nearest-neighbor search: top `k` (id, similarity) pairs, descending.
    ///
    /// Always returns exactly `k` pairs; ranks beyond the corpus size are
    /// padded with the `(-1, 0.0)` no-result sentinel.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>> {
        if query.len() != self.dimension {
            return Err(VisaRagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(i64, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let score: f32 = v.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                (i as i64, score)
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.truncate(k);
        while hits.len() < k {
            hits.push((NO_RESULT, 0.0));
        }
        Ok(hits)
    }
}

/// A named pairing of a vector index and its aligned clause metadata
#[derive(Debug, Clone)]
pub struct VisaIndex {
    pub name: String,
    index: FlatIndex,
    clauses: Vec<Clause>,
}

impl VisaIndex {
    /// Pair an index with its clause list, enforcing the alignment invariant
    pub fn new(name: impl Into<String>, index: FlatIndex, clauses: Vec<Clause>) -> Result<Self> {
        let name = name.into();
        if index.len() != clauses.len() {
            return Err(VisaRagError::IndexMismatch {
                name,
                vectors: index.len(),
                clauses: clauses.len(),
            });
        }
        Ok(Self {
            name,
            index,
            clauses,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Search and resolve hits to clauses, preserving rank order.
    ///
    /// Sentinel ids are passed through unresolved; callers filter them along
    /// with low-similarity hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>> {
        self.index.search(query, k)
    }

    /// Clause at a given index position
    #[must_use]
    pub fn clause(&self, id: i64) -> Option<&Clause> {
        usize::try_from(id).ok().and_then(|i| self.clauses.get(i))
    }
}

/// All loaded visa indexes, keyed by raw visa tag plus `general`.
///
/// Loaded once at process start and read-only thereafter; safe to share
/// across concurrent requests behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct DocumentStore {
    indexes: HashMap<String, VisaIndex>,
}

impl DocumentStore {
    /// Load every `index_{KEY}.json` / `clauses_{KEY}.json` pair found in
    /// `data_dir`. Missing pairs are skipped (a visa without an index is a
    /// normal deployment state); present-but-misaligned pairs are an error.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let mut indexes = HashMap::new();

        for key in VISA_KEYS.iter().copied().chain(std::iter::once(GENERAL_KEY)) {
            let index_path = data_dir.join(format!("index_{key}.json"));
            let clauses_path = data_dir.join(format!("clauses_{key}.json"));

            if !index_path.exists() || !clauses_path.exists() {
                warn!("No index pair for {key} in {}", data_dir.display());
                continue;
            }

            let index: FlatIndex = serde_json::from_str(&std::fs::read_to_string(&index_path)?)?;
            let clauses: Vec<Clause> =
                serde_json::from_str(&std::fs::read_to_string(&clauses_path)?)?;
            let visa_index = VisaIndex::new(key, index, clauses)?;
            info!("Loaded {key} index: {} documents", visa_index.len());
            indexes.insert(key.to_string(), visa_index);
        }

        Ok(Self { indexes })
    }

    /// Build a store from pre-constructed indexes (used by tests)
    #[must_use]
    pub fn from_indexes(indexes: Vec<VisaIndex>) -> Self {
        Self {
            indexes: indexes
                .into_iter()
                .map(|idx| (idx.name.clone(), idx))
                .collect(),
        }
    }

    /// Index for a visa key, if one was loaded
    #[must_use]
    pub fn index(&self, key: &str) -> Option<&VisaIndex> {
        self.indexes.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(title: &str) -> Clause {
        Clause {
            clause_id: title.to_string(),
            title: title.to_string(),
            ..Clause::default()
        }
    }

    #[test]
    fn search_orders_by_similarity_and_pads_with_sentinel() {
        let index = FlatIndex {
            dimension: 2,
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let hits = index.search(&[0.0, 1.0], 4).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].0, 1);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].0, 0);
        assert_eq!(hits[2], (NO_RESULT, 0.0));
        assert_eq!(hits[3], (NO_RESULT, 0.0));
    }

    #[test]
    fn search_rejects_wrong_dimension() {
        let index = FlatIndex {
            dimension: 3,
            vectors: vec![vec![1.0, 0.0, 0.0]],
        };
        let err = index.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            VisaRagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn misaligned_pair_is_rejected() {
        let index = FlatIndex {
            dimension: 2,
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let err = VisaIndex::new("F1", index, vec![clause("only one")]).unwrap_err();
        assert!(matches!(err, VisaRagError::IndexMismatch { .. }));
    }

    #[test]
    fn clause_lookup_ignores_sentinel() {
        let index = FlatIndex {
            dimension: 2,
            vectors: vec![vec![1.0, 0.0]],
        };
        let visa_index = VisaIndex::new("F1", index, vec![clause("a")]).unwrap();
        assert!(visa_index.clause(0).is_some());
        assert!(visa_index.clause(NO_RESULT).is_none());
    }
}
