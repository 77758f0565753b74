use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::FieldAccumulator;

/// Count and range of one field, reported alongside its mean.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatistics {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub struct AggregateReporter;

impl AggregateReporter {
    pub fn new() -> Self {
        Self
    }

    /// Mean of every accumulated field.
    pub fn summarize(&self, accumulator: &FieldAccumulator) -> Result<BTreeMap<String, f64>> {
        accumulator
            .iter()
            .map(|(field, values)| mean(field, values).map(|average| (field.to_string(), average)))
            .collect()
    }

    pub fn statistics(
        &self,
        accumulator: &FieldAccumulator,
    ) -> Result<BTreeMap<String, FieldStatistics>> {
        accumulator
            .iter()
            .map(|(field, values)| {
                mean(field, values).map(|average| {
                    let stats = FieldStatistics {
                        count: values.len(),
                        mean: average,
                        min: values.iter().copied().fold(f64::INFINITY, f64::min),
                        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    };
                    (field.to_string(), stats)
                })
            })
            .collect()
    }

    /// Summarize and write the averages to the log.
    pub fn log_summary(&self, accumulator: &FieldAccumulator) -> Result<BTreeMap<String, f64>> {
        let averages = self.summarize(accumulator)?;

        for (field, values) in accumulator.iter() {
            debug!("{} data: {:?}", field, values);
            if let Some(average) = averages.get(field) {
                info!("Average {} = {:.6}", field, average);
            }
        }

        Ok(averages)
    }

    /// Generate a summary report
    pub fn generate_summary(&self, accumulator: &FieldAccumulator) -> Result<String> {
        let statistics = self.statistics(accumulator)?;
        let mut summary = String::new();

        summary.push_str("=== Field Summary ===\n");
        summary.push_str(&format!("Fields: {}\n", statistics.len()));

        for (field, stats) in &statistics {
            summary.push_str(&format!(
                "  {}: mean={:.2} min={:.2} max={:.2} ({} value(s))\n",
                field, stats.mean, stats.min, stats.max, stats.count
            ));
        }

        Ok(summary)
    }
}

impl Default for AggregateReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(field: &str, values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(ProcessingError::EmptySequence {
            field: field.to_string(),
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}
