//! Lexical similarity between a query and a transient candidate set
//!
//! A small TF-IDF model is fitted per call over the query plus the candidate
//! texts. The candidate set is at most a few dozen documents that change on
//! every query, so fitting in place beats maintaining a persistent lexical
//! index.

use std::collections::HashMap;

/// Common English words excluded from the term space
const STOP_WORDS: [&str; 60] = [
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "do", "does",
    "for", "from", "had", "has", "have", "he", "her", "his", "how", "if", "in", "into", "is", "it",
    "its", "may", "more", "most", "must", "my", "no", "not", "of", "on", "or", "our", "she",
    "should", "so", "such", "than", "that", "the", "their", "them", "there", "these", "they",
    "this", "to", "was", "we", "what", "which", "will", "with",
];

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 2 && !STOP_WORDS.contains(token))
        .map(ToString::to_string)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f32> {
    let mut counts: HashMap<&str, f32> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// TF-IDF cosine similarity between `query` and each document in `docs`.
///
/// Smoothed idf (`ln((1+n)/(1+df)) + 1`) with l2-normalized weight vectors,
/// fitted over the query and the documents together. Deterministic for a
/// given input; returns one value in [0, 1] per document.
#[must_use]
pub fn tfidf_similarities(query: &str, docs: &[String]) -> Vec<f32> {
    if docs.is_empty() {
        return Vec::new();
    }

    let query_tokens = tokenize(query);
    let doc_tokens: Vec<Vec<String>> = docs.iter().map(|d| tokenize(d)).collect();

    // Document frequency over the fitted corpus (query counts as a document)
    let n = 1 + docs.len();
    let mut df: HashMap<&str, usize> = HashMap::new();
    for tokens in std::iter::once(&query_tokens).chain(doc_tokens.iter()) {
        let mut seen: Vec<&str> = Vec::new();
        for token in tokens {
            if !seen.contains(&token.as_str()) {
                seen.push(token);
                *df.entry(token).or_insert(0) += 1;
            }
        }
    }
    let idf = |term: &str| -> f32 {
        let df = df.get(term).copied().unwrap_or(0);
        ((1.0 + n as f32) / (1.0 + df as f32)).ln() + 1.0
    };

    let weigh = |tokens: &[String]| -> HashMap<String, f32> {
        let counts = term_counts(tokens);
        let mut weights: HashMap<String, f32> = counts
            .into_iter()
            .map(|(term, tf)| (term.to_string(), tf * idf(term)))
            .collect();
        let norm: f32 = weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in weights.values_mut() {
                *w /= norm;
            }
        }
        weights
    };

    let query_weights = weigh(&query_tokens);
    doc_tokens
        .iter()
        .map(|tokens| {
            let doc_weights = weigh(tokens);
            query_weights
                .iter()
                .filter_map(|(term, qw)| doc_weights.get(term).map(|dw| qw * dw))
                .sum()
        })
        .collect()
}
