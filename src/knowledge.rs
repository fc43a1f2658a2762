//! Curated knowledge base for common technical details
//!
//! A static, ordered rule table mapping visa type + trigger keywords to
//! structured fact blocks with citations. Retrieval sometimes surfaces the
//! right clause without the headline figure (caps, day counts, form numbers);
//! these blocks guarantee the figure reaches the prompt.

use crate::classify::VisaType;

/// One trigger rule: fires when the visa matches and any trigger keyword
/// appears in the lowercased query
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeRule {
    pub applies_to: &'static [VisaType],
    pub triggers: &'static [&'static str],
    pub heading: &'static str,
    pub facts: &'static [(&'static str, &'static str)],
    pub source: &'static str,
}

/// Rule table in declaration order; matching blocks are appended in this order
const RULES: [KnowledgeRule; 5] = [
    KnowledgeRule {
        applies_to: &[VisaType::F1],
        triggers: &["unemployment", "limit", "days", "opt"],
        heading: "OPT Unemployment Limits",
        facts: &[
            ("Standard OPT", "90 days total during the 12-month OPT period"),
            (
                "STEM OPT",
                "150 days total (90 days from initial OPT + 60 days during STEM extension)",
            ),
        ],
        source: "USCIS Policy Manual, Volume 2, Part F, Chapter 5",
    },
    KnowledgeRule {
        applies_to: &[VisaType::F1],
        triggers: &["cpt", "curricular", "practical training"],
        heading: "CPT Limits",
        facts: &[
            (
                "Full-time CPT",
                "12 months or more of full-time CPT eliminates OPT eligibility at the same educational level",
            ),
            ("Part-time CPT", "Part-time CPT does not reduce OPT eligibility"),
        ],
        source: "8 CFR § 214.2(f)(10)(i)",
    },
    KnowledgeRule {
        applies_to: &[VisaType::H1B],
        triggers: &["cap", "quota", "limit", "65,000", "20,000"],
        heading: "H-1B Cap Information",
        facts: &[
            ("Regular Cap", "65,000 visas per fiscal year"),
            ("Masters Cap", "20,000 additional visas for advanced degree holders"),
            (
                "Exemptions",
                "H-1B workers at institutions of higher education, nonprofit research organizations, and government research organizations are cap-exempt",
            ),
        ],
        source: "INA § 214(g)",
    },
    KnowledgeRule {
        applies_to: &[VisaType::H4],
        triggers: &["work", "employment", "ead", "i-765"],
        heading: "H-4 EAD Eligibility",
        facts: &[
            (
                "Requirements",
                "H-4 spouse must have H-1B spouse with approved I-140 or H-1B status extended beyond 6 years under AC21",
            ),
            ("Form", "Form I-765"),
            ("Processing Time", "3-6 months"),
        ],
        source: "8 CFR § 274a.12(c)(26)",
    },
    KnowledgeRule {
        applies_to: &[VisaType::J1, VisaType::J2],
        triggers: &["waiver", "2-year", "home residency", "212(e)"],
        heading: "J-1 Waiver Categories",
        facts: &[
            ("No Objection", "Home country government provides no-objection statement"),
            ("Interested Government", "U.S. federal agency requests waiver"),
            (
                "Persecution",
                "Fear of persecution based on race, religion, or political opinion",
            ),
            (
                "Exceptional Hardship",
                "Exceptional hardship to U.S. citizen or permanent resident spouse/child",
            ),
            ("Conrad 30", "Physicians working in underserved areas"),
        ],
        source: "INA § 212(e)",
    },
];

/// Read-only knowledge base, initialized once at startup
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    rules: &'static [KnowledgeRule],
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self { rules: &RULES }
    }
}

impl KnowledgeBase {
    /// Append the fact blocks of every matching rule to `context`.
    ///
    /// Blocks are appended in rule-declaration order; when no rule fires the
    /// context is returned unchanged. Precondition: called once per request —
    /// there is no duplication guard.
    #[must_use]
    pub fn augment(&self, query: &str, context: &str, visa: VisaType) -> String {
        let query_lower = query.to_lowercase();

        let mut blocks: Vec<String> = Vec::new();
        for rule in self.rules {
            if !rule.applies_to.contains(&visa) {
                continue;
            }
            if !rule.triggers.iter().any(|t| query_lower.contains(t)) {
                continue;
            }
            let mut lines: Vec<String> = Vec::new();
            lines.push(format!("{} (Knowledge Base):", rule.heading));
            for (label, value) in rule.facts {
                lines.push(format!("• {label}: {value}"));
            }
            lines.push(format!("Source: {}", rule.source));
            blocks.push(lines.join("\n"));
        }

        if blocks.is_empty() {
            context.to_string()
        } else {
            format!("{context}\n\n{}", blocks.join("\n"))
        }
    }
}
