//! Diary analysis data as returned by the analysis model.
//!
//! Field names follow the JSON the model is asked to produce, so the same
//! types serve as the response schema target and the history file format.

use serde::{Deserialize, Serialize};

/// Group label for vocabulary without a part-of-speech tag.
pub const UNTAGGED_POS: &str = "Autre";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryAnalysis {
    pub translated_text: String,
    pub segmented_text: Vec<SentenceSegment>,
    pub grammar_points: Vec<GrammarPoint>,
    pub verb_conjugations: Vec<VerbConjugation>,
    pub vocabulary: Vec<VocabularyItem>,
    pub fixed_expressions: Vec<FixedExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural_note: Option<String>,
}

impl DiaryAnalysis {
    /// Concatenation of every segment's text, in order.
    pub fn joined_segments(&self) -> String {
        self.segmented_text.iter().map(|s| s.text.as_str()).collect()
    }

    /// Whether the segments reproduce the translation verbatim.
    pub fn segments_match_translation(&self) -> bool {
        self.joined_segments() == self.translated_text
    }

    /// Vocabulary grouped by part of speech, groups in first-appearance order.
    pub fn vocabulary_by_pos(&self) -> Vec<(&str, Vec<&VocabularyItem>)> {
        let mut groups: Vec<(&str, Vec<&VocabularyItem>)> = Vec::new();
        for item in &self.vocabulary {
            let pos = item.pos_label();
            match groups.iter_mut().find(|(label, _)| *label == pos) {
                Some((_, items)) => items.push(item),
                None => groups.push((pos, vec![item])),
            }
        }
        groups
    }

    /// The cultural note, if the model wrote a non-blank one.
    pub fn cultural_note(&self) -> Option<&str> {
        self.cultural_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    Subject,
    Object,
    Predicate,
    Preposition,
    Modifier,
    Connective,
    Other,
}

impl SegmentRole {
    pub const ALL: [SegmentRole; 7] = [
        Self::Subject,
        Self::Object,
        Self::Predicate,
        Self::Preposition,
        Self::Modifier,
        Self::Connective,
        Self::Other,
    ];

    /// Wire name used in the response schema enum.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Object => "object",
            Self::Predicate => "predicate",
            Self::Preposition => "preposition",
            Self::Modifier => "modifier",
            Self::Connective => "connective",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Subject => "Sujet (主语)",
            Self::Object => "Complément (宾语)",
            Self::Predicate => "Prédicat/Verbe (谓语)",
            Self::Preposition => "Préposition (介词)",
            Self::Modifier => "Modificateur",
            Self::Connective => "Connecteur",
            Self::Other => "Autre",
        }
    }
}

impl std::fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSegment {
    pub text: String,
    pub role: SegmentRole,
    pub meaning_cn: String,
    pub meaning_en: String,
    pub grammar_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPoint {
    pub point: String,
    pub explanation: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbConjugation {
    pub infinitive: String,
    pub tense: String,
    pub group: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpression {
    pub expression: String,
    pub meaning: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub gender: String,
    pub meaning: String,
    pub pos: String,
}

/// Interpretation of the free-text `gender` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender<'a> {
    Masculine,
    Feminine,
    NotApplicable,
    /// A value the model invented; shown as-is.
    Unrecognized(&'a str),
}

impl Gender<'_> {
    /// Short badge text, `None` when no badge should be shown.
    pub fn badge(&self) -> Option<&str> {
        match self {
            Gender::Masculine => Some("m"),
            Gender::Feminine => Some("f"),
            Gender::NotApplicable => None,
            Gender::Unrecognized(raw) => Some(*raw),
        }
    }
}

impl VocabularyItem {
    pub fn gender_kind(&self) -> Gender<'_> {
        let raw = self.gender.trim();
        match raw.to_lowercase().as_str() {
            "masculine" | "masculin" | "masc" | "m" => Gender::Masculine,
            "feminine" | "féminin" | "feminin" | "fem" | "f" => Gender::Feminine,
            "" | "n/a" | "na" | "none" | "-" => Gender::NotApplicable,
            _ => Gender::Unrecognized(raw),
        }
    }

    pub fn pos_label(&self) -> &str {
        let pos = self.pos.trim();
        if pos.is_empty() {
            UNTAGGED_POS
        } else {
            pos
        }
    }
}
