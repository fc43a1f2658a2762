//! Rule-based visa classification with typo detection

use std::sync::LazyLock;

use regex::Regex;

use super::VisaClassification;
use super::VisaType;

/// Greeting phrases bypass all other classification, matched on word
/// boundaries so "hi" inside "this" does not fire.
static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:hi|hello|hey|good morning|good afternoon|good evening|how are you|what's up)\b",
    )
    .expect("greeting pattern is valid")
});

/// Surface variants of visa codes scanned as typo/abbreviation candidates
const TYPO_VARIANTS: [&str; 13] = [
    "f.1", "f1", "f.2", "f2", "hvb", "h1b", "h.1b", "h.4", "h4", "j.1", "j1", "j.2", "j2",
];

/// Exact visa-code tokens score 3; any other category keyword scores 1
const CODE_TOKENS: [&str; 12] = [
    "f-1", "f1", "f-2", "f2", "h-1b", "h1b", "h-4", "h4", "j-1", "j1", "j-2", "j2",
];

/// Category keyword lists in declaration order. F2, H4 and J2 share generic
/// dependent-family keywords with no disambiguating weight; only the exact
/// code tokens (weight 3) separate them. That is an intentional limitation.
const VISA_KEYWORDS: [(VisaType, &[&str]); 6] = [
    (
        VisaType::F1,
        &[
            "f-1",
            "f1",
            "student",
            "study",
            "university",
            "college",
            "opt",
            "cpt",
            "on-campus",
            "off-campus",
            "practical training",
        ],
    ),
    (
        VisaType::F2,
        &["f-2", "f2", "dependent", "spouse", "child", "family"],
    ),
    (
        VisaType::H1B,
        &["h-1b", "h1b", "work", "employment", "specialty", "occupation"],
    ),
    (
        VisaType::H4,
        &["h-4", "h4", "dependent", "spouse", "child", "family"],
    ),
    (
        VisaType::J1,
        &["j-1", "j1", "exchange", "visitor", "research", "scholar"],
    ),
    (
        VisaType::J2,
        &["j-2", "j2", "dependent", "spouse", "child", "family"],
    ),
];

/// Classify a raw query into a visa category, `General`, or a clarification
/// request for likely typos.
///
/// Deterministic: greeting detection runs first and wins unconditionally,
/// then weighted keyword scoring with first-declared tie-break, then the
/// typo fallback when nothing scored.
#[must_use]
pub fn classify_visa(query: &str) -> VisaClassification {
    let query_lower = query.to_lowercase();

    if GREETING_RE.is_match(&query_lower) {
        return VisaClassification::General;
    }

    let typos: Vec<&str> = TYPO_VARIANTS
        .iter()
        .copied()
        .filter(|variant| query_lower.contains(variant))
        .collect();

    let mut best: Option<(VisaType, u32)> = None;
    let mut code_token_matched = false;
    for (visa, keywords) in VISA_KEYWORDS {
        let mut score = 0;
        for keyword in keywords {
            if query_lower.contains(keyword) {
                if CODE_TOKENS.contains(keyword) {
                    score += 3;
                    code_token_matched = true;
                } else {
                    score += 1;
                }
            }
        }
        // Strictly-higher wins; ties keep the earlier-declared category
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((visa, score));
        }
    }

    // A malformed code with no exact code token anywhere means the visa
    // signal itself is suspect; ask rather than guess from generic keywords.
    if !typos.is_empty() && !code_token_matched {
        let suggestions = suggestions_for(&typos);
        if !suggestions.is_empty() {
            return VisaClassification::NeedsClarification(suggestions);
        }
    }

    match best {
        Some((visa, score)) if score > 0 => VisaClassification::Visa(visa),
        _ => VisaClassification::General,
    }
}

/// Human-readable suggestions for detected typo variants, deduplicated
/// preserving first-occurrence order
fn suggestions_for(typos: &[&str]) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    for typo in typos {
        let suggestion = if typo.starts_with('f') {
            if typo.contains('1') {
                "F-1 (student visa)"
            } else if typo.contains('2') {
                "F-2 (dependent visa)"
            } else {
                "F-1 or F-2"
            }
        } else if typo.starts_with('h') {
            if typo.contains('1') || typo.contains('b') {
                "H-1B (work visa)"
            } else if typo.contains('4') {
                "H-4 (dependent visa)"
            } else {
                "H-1B or H-4"
            }
        } else if typo.contains('1') {
            "J-1 (exchange visitor)"
        } else if typo.contains('2') {
            "J-2 (dependent visa)"
        } else {
            "J-1 or J-2"
        };
        if !suggestions.iter().any(|s| s == suggestion) {
            suggestions.push(suggestion.to_string());
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_classifies_as_general() {
        assert_eq!(classify_visa("hello"), VisaClassification::General);
        assert_eq!(classify_visa("Good Morning!"), VisaClassification::General);
    }

    #[test]
    fn greeting_outranks_visa_keywords() {
        // Stated policy: the greeting check runs first, unconditionally
        assert_eq!(
            classify_visa("Hi, tell me about F-1"),
            VisaClassification::General
        );
    }

    #[test]
    fn word_boundary_prevents_embedded_greeting_match() {
        // "hi" inside "this" must not trigger the greeting path
        assert_eq!(
            classify_visa("is this within f-1 rules"),
            VisaClassification::Visa(VisaType::F1)
        );
    }

    #[test]
    fn exact_code_token_outweighs_generic_keywords() {
        // "spouse" and "dependent" alone would tie F2/H4/J2; "h-4" resolves it
        assert_eq!(
            classify_visa("can an h-4 spouse work"),
            VisaClassification::Visa(VisaType::H4)
        );
    }

    #[test]
    fn dependent_keyword_tie_resolves_to_first_declared() {
        // Only shared dependent-family keywords: F2 is declared first
        assert_eq!(
            classify_visa("rules for my dependent spouse"),
            VisaClassification::Visa(VisaType::F2)
        );
    }

    #[test]
    fn f1_student_question_classifies_as_f1() {
        assert_eq!(
            classify_visa("Can F-1 students work more than 20 hours during school?"),
            VisaClassification::Visa(VisaType::F1)
        );
    }

    #[test]
    fn typo_without_exact_code_requests_clarification() {
        match classify_visa("hvb work visa") {
            VisaClassification::NeedsClarification(suggestions) => {
                assert_eq!(suggestions, vec!["H-1B (work visa)".to_string()]);
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn exact_code_token_suppresses_typo_clarification() {
        // "h1b" is both a typo variant and an exact code token; the exact
        // match wins and the query resolves normally
        assert_eq!(
            classify_visa("h1b transfer process"),
            VisaClassification::Visa(VisaType::H1B)
        );
    }

    #[test]
    fn suggestions_are_deduplicated_in_order() {
        match classify_visa("hvb or h.1b visa") {
            VisaClassification::NeedsClarification(suggestions) => {
                assert_eq!(suggestions, vec!["H-1B (work visa)".to_string()]);
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn no_signal_classifies_as_general() {
        assert_eq!(
            classify_visa("what is the weather today"),
            VisaClassification::General
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let query = "difference between F-1 OPT and CPT";
        assert_eq!(classify_visa(query), classify_visa(query));
    }
}
