//! Sentence explorer: narrowing the insights table by column values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::InsightRow;

/// Insights columns the explorer can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightColumn {
    Domain,
    ImpactType,
    Timeframes,
}

impl InsightColumn {
    pub const ALL: [InsightColumn; 3] = [
        InsightColumn::Domain,
        InsightColumn::ImpactType,
        InsightColumn::Timeframes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightColumn::Domain => "domain",
            InsightColumn::ImpactType => "impact_type",
            InsightColumn::Timeframes => "timeframes",
        }
    }

    fn value<'a>(&self, row: &'a InsightRow) -> &'a str {
        match self {
            InsightColumn::Domain => &row.domain,
            InsightColumn::ImpactType => &row.impact_type,
            InsightColumn::Timeframes => &row.timeframes,
        }
    }
}

/// Exact-match filter over the insights table. Unset fields match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightFilter {
    pub domain: Option<String>,
    pub impact_type: Option<String>,
    /// Compared against the whole `timeframes` cell
    pub timeframe: Option<String>,
}

impl InsightFilter {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.impact_type.is_none() && self.timeframe.is_none()
    }

    pub fn matches(&self, row: &InsightRow) -> bool {
        let check = |wanted: &Option<String>, column: InsightColumn| match wanted {
            Some(value) => column.value(row) == value,
            None => true,
        };
        check(&self.domain, InsightColumn::Domain)
            && check(&self.impact_type, InsightColumn::ImpactType)
            && check(&self.timeframe, InsightColumn::Timeframes)
    }

    /// Rows passing the filter, in table order.
    pub fn apply(&self, rows: &[InsightRow]) -> Vec<InsightRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// Sorted distinct non-empty values of `column`, the choices offered for filtering.
pub fn distinct_values(rows: &[InsightRow], column: InsightColumn) -> Vec<String> {
    rows.iter()
        .map(|row| column.value(row))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
