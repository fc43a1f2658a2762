//! Context assembly from retrieved clauses

use crate::rag::ScoredCandidate;

/// Assembler for creating bounded prompt context from ranked candidates
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_documents: usize,
    max_chars_per_document: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_documents: usize, max_chars_per_document: usize) -> Self {
        Self {
            max_documents,
            max_chars_per_document,
        }
    }

    /// Assemble context from ranked candidates.
    ///
    /// Each document is rendered as a `Source N / Section / Content / URL`
    /// block followed by a `---` delimiter; empty section hints and URLs are
    /// skipped. Text is truncated on a char boundary.
    #[must_use]
    pub fn assemble(&self, candidates: &[ScoredCandidate]) -> String {
        let mut parts: Vec<String> = Vec::new();

        for (idx, candidate) in candidates.iter().take(self.max_documents).enumerate() {
            let clause = &candidate.clause;
            parts.push(format!("Source {}: {}", idx + 1, clause.title));
            if !clause.section_hint.is_empty() {
                parts.push(format!("Section: {}", clause.section_hint));
            }
            let text: String = clause.text.chars().take(self.max_chars_per_document).collect();
            parts.push(format!("Content: {text}"));
            if !clause.url.is_empty() {
                parts.push(format!("URL: {}", clause.url));
            }
            parts.push("---".to_string());
        }

        parts.join("\n")
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(5, 800)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Clause;

    fn candidate(title: &str, text: &str, section: &str, url: &str) -> ScoredCandidate {
        ScoredCandidate {
            clause: Clause {
                title: title.to_string(),
                text: text.to_string(),
                section_hint: section.to_string(),
                url: url.to_string(),
                ..Clause::default()
            },
            score: 0.5,
        }
    }

    #[test]
    fn assembles_delimited_blocks() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&[candidate(
            "F-1 employment",
            "students may work on campus",
            "8 CFR 214.2(f)(9)",
            "https://example.gov/f1",
        )]);
        assert_eq!(
            context,
            "Source 1: F-1 employment\n\
             Section: 8 CFR 214.2(f)(9)\n\
             Content: students may work on campus\n\
             URL: https://example.gov/f1\n\
             ---"
        );
    }

    #[test]
    fn skips_empty_section_and_url() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&[candidate("Title", "text", "", "")]);
        assert_eq!(context, "Source 1: Title\nContent: text\n---");
    }

    #[test]
    fn truncates_long_text_and_caps_document_count() {
        let assembler = ContextAssembler::new(2, 10);
        let long = "x".repeat(100);
        let pool: Vec<ScoredCandidate> = (0..4)
            .map(|i| candidate(&format!("doc{i}"), &long, "", ""))
            .collect();
        let context = assembler.assemble(&pool);
        assert!(context.contains("Source 1"));
        assert!(context.contains("Source 2"));
        assert!(!context.contains("Source 3"));
        assert!(context.contains(&"x".repeat(10)));
        assert!(!context.contains(&"x".repeat(11)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let assembler = ContextAssembler::new(5, 3);
        let context = assembler.assemble(&[candidate("t", "日本語テキスト", "", "")]);
        assert!(context.contains("Content: 日本語"));
    }
}
