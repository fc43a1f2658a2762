//! Query classification: visa category and question intent
//!
//! Both classifiers are pure functions over static keyword tables. The tables
//! are ordered arrays, not maps: ties resolve to the first-declared entry and
//! that order is part of the contract.

pub mod intent;
pub mod visa;

pub use intent::classify_intent;
pub use visa::classify_visa;

/// Visa category with a dedicated document index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisaType {
    F1,
    F2,
    H1B,
    H4,
    J1,
    J2,
}

impl VisaType {
    /// Raw tag form used for tag-set membership and index keys (e.g. "H1B")
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::H1B => "H1B",
            Self::H4 => "H4",
            Self::J1 => "J1",
            Self::J2 => "J2",
        }
    }

    /// Hyphenated display form used for text matching (e.g. "H-1B")
    #[must_use]
    pub const fn standardized(self) -> &'static str {
        match self {
            Self::F1 => "F-1",
            Self::F2 => "F-2",
            Self::H1B => "H-1B",
            Self::H4 => "H-4",
            Self::J1 => "J-1",
            Self::J2 => "J-2",
        }
    }

    /// Dependent-family visa types (clauses for these are easily conflated
    /// with the sponsoring visa's clauses in embedding space)
    #[must_use]
    pub const fn is_dependent(self) -> bool {
        matches!(self, Self::F2 | Self::H4 | Self::J2)
    }
}

/// Outcome of visa classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisaClassification {
    /// A resolved visa category
    Visa(VisaType),
    /// Greeting or no visa signal; answered from the general index
    General,
    /// Likely-misspelled visa code; carries human-readable suggestions
    NeedsClarification(Vec<String>),
}

impl VisaClassification {
    /// Caller-facing `visa_type` label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Visa(visa) => visa.tag(),
            Self::General => "general",
            Self::NeedsClarification(_) => "typo_clarification",
        }
    }
}

/// Question intent category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    Technical,
    Procedural,
    Emergency,
    Comparison,
    General,
}

impl QuestionType {
    /// Caller-facing `question_type` label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Procedural => "procedural",
            Self::Emergency => "emergency",
            Self::Comparison => "comparison",
            Self::General => "general",
        }
    }

    /// Complex questions widen retrieval depth from 5 to 8
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Technical | Self::Procedural | Self::Emergency)
    }
}
