//! Default reduction of insight records into the five derived tables.
//!
//! Groups are keyed by `BTreeMap`, so output order is the sorted key order
//! and two reductions of the same input are identical.

use std::collections::{BTreeMap, BTreeSet};

use super::InsightRecord;
use crate::dataset::{DerivedDataset, DomainRow, EntityRow, InsightRow, PatternRow, TemporalRow};

#[derive(Default)]
struct TemporalAcc {
    count: u64,
    magnitude_sum: f64,
    domains: BTreeMap<String, u64>,
    impacts: BTreeMap<String, u64>,
}

#[derive(Default)]
struct PatternAcc {
    count: u64,
    similarity_sum: f64,
    domains: BTreeSet<String>,
    positives: u64,
}

/// Reduces analyzer output into the five derived tables.
pub fn reduce_insights(records: &[InsightRecord]) -> DerivedDataset {
    DerivedDataset {
        insights: records.iter().map(insight_row).collect(),
        domain: domain_rows(records),
        temporal: temporal_rows(records),
        pattern: pattern_rows(records),
        entity: entity_rows(records),
    }
}

fn insight_row(record: &InsightRecord) -> InsightRow {
    InsightRow {
        domain: record.domain.clone(),
        impact_type: record.impact_type.clone(),
        timeframes: record.timeframes.join("; "),
        ai_similarity: record.ai_similarity,
        sentence_length: record.sentence_length(),
        sentiment_score: record.sentiment_score,
        sentence: record.sentence.clone(),
    }
}

fn domain_rows(records: &[InsightRecord]) -> Vec<DomainRow> {
    let mut groups: BTreeMap<(&str, &str), (u64, f64)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.domain.as_str(), record.impact_type.as_str()))
            .or_default();
        entry.0 += 1;
        entry.1 += record.ai_similarity;
    }

    groups
        .into_iter()
        .map(|((domain, impact_type), (count, similarity_sum))| DomainRow {
            domain: domain.to_string(),
            impact_type: impact_type.to_string(),
            insight_count: count,
            avg_ai_similarity: mean(similarity_sum, count),
        })
        .collect()
}

fn temporal_rows(records: &[InsightRecord]) -> Vec<TemporalRow> {
    let mut groups: BTreeMap<&str, TemporalAcc> = BTreeMap::new();
    for record in records {
        let timeframes: BTreeSet<&str> = record.timeframes.iter().map(String::as_str).collect();
        for timeframe in timeframes {
            let acc = groups.entry(timeframe).or_default();
            acc.count += 1;
            acc.magnitude_sum += record.magnitude;
            *acc.domains.entry(record.domain.clone()).or_default() += 1;
            *acc.impacts.entry(record.impact_type.clone()).or_default() += 1;
        }
    }

    groups
        .into_iter()
        .map(|(timeframe, acc)| TemporalRow {
            timeframe: timeframe.to_string(),
            dominant_domain: most_frequent(&acc.domains),
            avg_magnitude: mean(acc.magnitude_sum, acc.count),
            insight_count: acc.count,
            dominant_impact: most_frequent(&acc.impacts),
        })
        .collect()
}

fn pattern_rows(records: &[InsightRecord]) -> Vec<PatternRow> {
    let mut groups: BTreeMap<&str, PatternAcc> = BTreeMap::new();
    for record in records {
        let Some(pattern) = record.pattern_type.as_deref() else {
            continue;
        };
        let acc = groups.entry(pattern).or_default();
        acc.count += 1;
        acc.similarity_sum += record.ai_similarity;
        acc.domains.insert(record.domain.clone());
        if record.sentiment_score > 0.0 {
            acc.positives += 1;
        }
    }

    groups
        .into_iter()
        .map(|(pattern, acc)| PatternRow {
            pattern_type: pattern.to_string(),
            avg_ai_similarity: mean(acc.similarity_sum, acc.count),
            insight_count: acc.count,
            domains_found: acc.domains.into_iter().collect::<Vec<_>>().join(", "),
            success_rate: mean(acc.positives as f64, acc.count),
        })
        .collect()
}

fn entity_rows(records: &[InsightRecord]) -> Vec<EntityRow> {
    let mut groups: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for record in records {
        let entities: BTreeSet<&str> = record.entities.iter().map(String::as_str).collect();
        for entity in entities {
            let entry = groups.entry(entity).or_default();
            entry.0 += 1;
            entry.1 += record.magnitude;
        }
    }

    groups
        .into_iter()
        .map(|(entity, (count, magnitude_sum))| EntityRow {
            affected_entity: entity.to_string(),
            mention_count: count,
            avg_magnitude_when_mentioned: mean(magnitude_sum, count),
        })
        .collect()
}

fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Key with the highest count; ties go to the smallest key.
fn most_frequent(counts: &BTreeMap<String, u64>) -> String {
    let mut best: Option<(&String, u64)> = None;
    for (key, count) in counts {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((key, *count)),
        }
    }
    best.map(|(key, _)| key.clone()).unwrap_or_default()
}
