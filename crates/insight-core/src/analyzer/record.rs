use serde::{Deserialize, Serialize};

/// One insight extracted from an uploaded document.
///
/// This is the exchange format with external analyzers; optional fields
/// default so analyzers may omit what they do not detect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub domain: String,
    pub impact_type: String,
    pub sentence: String,
    #[serde(default)]
    pub timeframes: Vec<String>,
    #[serde(default)]
    pub ai_similarity: f64,
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub pattern_type: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    /// Name of the document the sentence came from
    #[serde(default)]
    pub source_document: Option<String>,
}

impl InsightRecord {
    /// Sentence length in words.
    pub fn sentence_length(&self) -> u32 {
        self.sentence.split_whitespace().count() as u32
    }
}
