//! Question-intent classification

use super::QuestionType;

/// Intent keyword lists in declaration order. Matching is substring
/// containment, not word-boundary, and some keywords deliberately appear in
/// more than one list ("deadline", "timeline", "requirement"): a question can
/// legitimately signal both technical and procedural intent, and the
/// declaration order breaks the tie.
const INTENT_KEYWORDS: [(QuestionType, &[&str]); 4] = [
    (
        QuestionType::Technical,
        &[
            "exact",
            "specific",
            "precise",
            "limit",
            "requirement",
            "deadline",
            "timeline",
            "calculation",
            "formula",
            "percentage",
            "days",
            "hours",
            "weeks",
            "months",
            "unemployment",
            "cap",
            "quota",
            "prevailing wage",
            "lca",
            "i-765",
            "i-129",
            "sevis",
            "ds-2019",
            "i-20",
            "ead",
            "grace period",
            "extension",
        ],
    ),
    (
        QuestionType::Procedural,
        &[
            "how to",
            "step by step",
            "process",
            "procedure",
            "apply",
            "file",
            "submit",
            "application",
            "form",
            "document",
            "requirement",
            "checklist",
            "timeline",
            "deadline",
            "when to",
            "where to",
            "what forms",
            "which form",
        ],
    ),
    (
        QuestionType::Emergency,
        &[
            "emergency",
            "urgent",
            "immediately",
            "right now",
            "today",
            "tomorrow",
            "expired",
            "expiring",
            "terminated",
            "laid off",
            "fired",
            "lost job",
            "out of status",
            "violation",
            "deportation",
            "removal",
            "overstay",
        ],
    ),
    (
        QuestionType::Comparison,
        &[
            "difference between",
            "vs",
            "versus",
            "compare",
            "similar",
            "different",
            "better",
            "worse",
            "advantage",
            "disadvantage",
            "pros",
            "cons",
        ],
    ),
];

/// Classify question intent from keyword counts.
///
/// One point per matched keyword; strictly-highest category wins, ties keep
/// the earlier-declared category, zero everywhere means `General`.
#[must_use]
pub fn classify_intent(query: &str) -> QuestionType {
    let query_lower = query.to_lowercase();

    let mut best = QuestionType::General;
    let mut best_score = 0;
    for (intent, keywords) in INTENT_KEYWORDS {
        let score = keywords
            .iter()
            .filter(|keyword| query_lower.contains(*keyword))
            .count();
        if score > best_score {
            best = intent;
            best_score = score;
        }
    }
    best
}
