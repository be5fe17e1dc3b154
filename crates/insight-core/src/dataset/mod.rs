//! Derived dataset: the five fixed-schema tables produced per analysis run.

mod filter;
mod rows;
mod summary;

pub use filter::{InsightColumn, InsightFilter, distinct_values};
pub use rows::{DomainRow, EntityRow, InsightRow, PatternRow, TemporalRow};
pub use summary::DatasetSummary;

use serde::{Deserialize, Serialize};
use std::fmt;

/// File extension of persisted tables.
pub const TABLE_EXTENSION: &str = "csv";

/// Names one of the five derived tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Insights,
    Domain,
    Temporal,
    Pattern,
    Entity,
}

impl TableKind {
    /// Every table in canonical order.
    pub const ALL: [TableKind; 5] = [
        TableKind::Insights,
        TableKind::Domain,
        TableKind::Temporal,
        TableKind::Pattern,
        TableKind::Entity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Insights => "insights",
            TableKind::Domain => "domain",
            TableKind::Temporal => "temporal",
            TableKind::Pattern => "pattern",
            TableKind::Entity => "entity",
        }
    }

    /// On-disk file name, e.g. `insights.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.as_str(), TABLE_EXTENSION)
    }

    /// Required header row of the table.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Insights => &[
                "domain",
                "impact_type",
                "timeframes",
                "ai_similarity",
                "sentence_length",
                "sentiment_score",
                "sentence",
            ],
            TableKind::Domain => &["domain", "impact_type", "insight_count", "avg_ai_similarity"],
            TableKind::Temporal => &[
                "timeframe",
                "dominant_domain",
                "avg_magnitude",
                "insight_count",
                "dominant_impact",
            ],
            TableKind::Pattern => &[
                "pattern_type",
                "avg_ai_similarity",
                "insight_count",
                "domains_found",
                "success_rate",
            ],
            TableKind::Entity => &[
                "affected_entity",
                "mention_count",
                "avg_magnitude_when_mentioned",
            ],
        }
    }

    /// Parses a table name as typed by a user (`insights`, `domain`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five derived tables of one analysis, any of which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedDataset {
    pub insights: Vec<InsightRow>,
    pub domain: Vec<DomainRow>,
    pub temporal: Vec<TemporalRow>,
    pub pattern: Vec<PatternRow>,
    pub entity: Vec<EntityRow>,
}

impl DerivedDataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Insights => self.insights.len(),
            TableKind::Domain => self.domain.len(),
            TableKind::Temporal => self.temporal.len(),
            TableKind::Pattern => self.pattern.len(),
            TableKind::Entity => self.entity.len(),
        }
    }

    /// True when every table is empty.
    pub fn is_empty(&self) -> bool {
        TableKind::ALL.iter().all(|kind| self.row_count(*kind) == 0)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_dataset(self)
    }
}
