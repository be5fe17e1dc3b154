//! Typed rows of the derived tables.
//!
//! Field names are the persisted column names; serde maps them one-to-one
//! onto the CSV header row.

use serde::{Deserialize, Serialize};

/// One extracted insight sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    pub domain: String,
    pub impact_type: String,
    /// Timeframes mentioned by the sentence, joined with `"; "`
    pub timeframes: String,
    pub ai_similarity: f64,
    pub sentence_length: u32,
    pub sentiment_score: f64,
    pub sentence: String,
}

/// Insight counts per (domain, impact type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRow {
    pub domain: String,
    pub impact_type: String,
    pub insight_count: u64,
    pub avg_ai_similarity: f64,
}

/// Insight aggregates per timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRow {
    pub timeframe: String,
    pub dominant_domain: String,
    pub avg_magnitude: f64,
    pub insight_count: u64,
    pub dominant_impact: String,
}

/// Insight aggregates per linguistic pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRow {
    pub pattern_type: String,
    pub avg_ai_similarity: f64,
    pub insight_count: u64,
    /// Distinct domains the pattern appeared in, joined with `", "`
    pub domains_found: String,
    pub success_rate: f64,
}

/// Mentions per affected entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRow {
    pub affected_entity: String,
    pub mention_count: u64,
    pub avg_magnitude_when_mentioned: f64,
}
