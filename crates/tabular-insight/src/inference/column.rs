//! Column-level semantic type inference by sample voting.

use super::value::classify_value;
use crate::config::AnalysisConfig;
use crate::dataset::{Cell, Column};
use crate::types::SemanticType;
use rand::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Assigns one [`SemanticType`] to a column.
///
/// A seeded sample of the non-missing values is classified value by value and
/// the majority type wins. Currency, date and boolean winners are accepted as
/// is; any other winner is replaced by [`SemanticType::Id`] when the full
/// column is nearly all distinct.
#[derive(Debug, Clone)]
pub struct SemanticClassifier {
    sample_size: usize,
    seed: u64,
    id_uniqueness_threshold: f64,
}

impl Default for SemanticClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl SemanticClassifier {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            seed: config.sample_seed,
            id_uniqueness_threshold: config.id_uniqueness_threshold,
        }
    }

    /// Infer the semantic type of a column.
    pub fn classify(&self, column: &Column) -> SemanticType {
        let values: Vec<&Cell> = column.non_missing().collect();
        if values.is_empty() {
            debug!(column = column.name(), "No non-missing values, type unknown");
            return SemanticType::Unknown;
        }

        let samples = self.sample(&values);
        let winner = vote(samples.iter().map(|s| classify_value(s)));

        if winner.is_trusted() {
            debug!(column = column.name(), semantic = %winner, "Trusted sample vote");
            return winner;
        }

        let ratio = uniqueness_ratio(&values);
        if ratio > self.id_uniqueness_threshold {
            if is_sequential_run(&values) {
                debug!(column = column.name(), ratio, "Sequential numeric id");
            } else {
                debug!(column = column.name(), ratio, "High-cardinality id");
            }
            return SemanticType::Id;
        }

        debug!(column = column.name(), semantic = %winner, ratio, "Sample vote kept");
        winner
    }

    /// Deterministic sample without replacement, rendered to text.
    fn sample(&self, values: &[&Cell]) -> Vec<String> {
        let sample_size = std::cmp::min(self.sample_size, values.len());
        let mut rng = StdRng::seed_from_u64(self.seed);
        values
            .choose_multiple(&mut rng, sample_size)
            .filter_map(|cell| cell.render())
            .collect()
    }
}

/// Majority vote. Among equal tallies the type seen first in the sample wins.
fn vote(types: impl Iterator<Item = SemanticType>) -> SemanticType {
    let mut tally: Vec<(SemanticType, usize)> = Vec::new();
    for semantic in types {
        match tally.iter_mut().find(|(t, _)| *t == semantic) {
            Some((_, count)) => *count += 1,
            None => tally.push((semantic, 1)),
        }
    }

    let mut best: Option<(SemanticType, usize)> = None;
    for (semantic, count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((semantic, count));
        }
    }
    best.map(|(semantic, _)| semantic)
        .unwrap_or(SemanticType::Unknown)
}

/// Distinct rendered values over the number of non-missing values.
fn uniqueness_ratio(values: &[&Cell]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<String> = values.iter().filter_map(|c| c.render()).collect();
    distinct.len() as f64 / values.len() as f64
}

/// Every value is numeric and the sorted values are exactly `min..=max`.
fn is_sequential_run(values: &[&Cell]) -> bool {
    let numbers: Option<Vec<f64>> = values.iter().map(|c| c.to_number()).collect();
    let Some(mut numbers) = numbers else {
        return false;
    };
    numbers.sort_by(f64::total_cmp);

    let Some(&first) = numbers.first() else {
        return false;
    };
    if first.fract() != 0.0 {
        return false;
    }
    numbers
        .iter()
        .enumerate()
        .all(|(i, v)| *v == first + i as f64)
}
