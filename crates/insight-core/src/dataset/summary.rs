use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::DerivedDataset;

/// Headline metrics of a dataset: total insights, domains covered, time
/// periods analyzed and entities found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_insights: usize,
    pub domains_covered: usize,
    pub time_periods: usize,
    pub entities_found: usize,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &DerivedDataset) -> Self {
        let domains: BTreeSet<&str> = dataset.domain.iter().map(|r| r.domain.as_str()).collect();
        let periods: BTreeSet<&str> = dataset
            .temporal
            .iter()
            .map(|r| r.timeframe.as_str())
            .collect();

        Self {
            total_insights: dataset.insights.len(),
            domains_covered: domains.len(),
            time_periods: periods.len(),
            entities_found: dataset.entity.len(),
        }
    }
}
