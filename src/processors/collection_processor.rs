use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, Level};

use crate::config::{Settings, SinkBackend};
use crate::error::Result;
use crate::processors::aggregate_reporter::AggregateReporter;
use crate::processors::station_parser::{ParsedBatch, StationRecordParser};
use crate::readers::{fetch_until_nonempty, RetryPolicy, StationSource};
use crate::utils::progress::ProgressReporter;
use crate::writers::PointSink;

/// Outcome of one collection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionReport {
    pub stations: usize,
    pub points: usize,
    pub averages: BTreeMap<String, f64>,
    pub backend: SinkBackend,
    /// True only when a real backend stored at least one point
    pub persisted: bool,
}

impl CollectionReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Collection Report ===\n");
        summary.push_str(&format!("Stations: {}\n", self.stations));
        summary.push_str(&format!("Points: {}\n", self.points));
        for (field, average) in &self.averages {
            summary.push_str(&format!("Average {} = {:.2}\n", field, average));
        }
        summary.push_str(&format!("Backend: {}\n", self.backend));
        summary.push_str(&format!(
            "Persisted: {}\n",
            if self.persisted { "yes" } else { "no" }
        ));

        summary
    }
}

/// Drives one run: fetch, parse, report, persist.
pub struct CollectionProcessor {
    parser: StationRecordParser,
    reporter: AggregateReporter,
    retry: RetryPolicy,
}

impl CollectionProcessor {
    pub fn new(parser: StationRecordParser, retry: RetryPolicy) -> Self {
        Self {
            parser,
            reporter: AggregateReporter::new(),
            retry,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            StationRecordParser::from_settings(&settings.global),
            RetryPolicy::from_settings(&settings.global),
        )
    }

    /// Parse a station list and log the results. No side effects beyond
    /// logging.
    pub fn process(
        &self,
        stations: &[Value],
        now: i64,
    ) -> Result<(ParsedBatch, BTreeMap<String, f64>)> {
        let batch = self.parser.parse_all(stations, now)?;

        if tracing::enabled!(Level::DEBUG) {
            debug!("{}", serde_json::to_string(&batch.points)?);
        }

        let averages = self.reporter.log_summary(&batch.accumulator)?;
        Ok((batch, averages))
    }

    pub async fn run<S, K>(
        &self,
        source: &S,
        sink: &K,
        now: i64,
        progress: Option<&ProgressReporter>,
    ) -> Result<CollectionReport>
    where
        S: StationSource + ?Sized,
        K: PointSink + ?Sized,
    {
        let mut report = CollectionReport {
            backend: sink.backend(),
            ..CollectionReport::default()
        };

        let stations = fetch_until_nonempty(source, &self.retry, progress).await?;
        if stations.is_empty() {
            info!("No station returned for the configured area, nothing to process");
            return Ok(report);
        }

        if let Some(p) = progress {
            p.set_message(&format!("Parsing {} station(s)...", stations.len()));
        }
        let (batch, averages) = self.process(&stations, now)?;

        report.stations = batch.stations;
        report.points = batch.points.len();
        report.averages = averages;

        if batch.points.is_empty() {
            info!("No fresh reading found, nothing to persist");
            return Ok(report);
        }

        if let Some(p) = progress {
            p.set_message(&format!("Writing {} point(s)...", batch.points.len()));
        }
        let written = sink.write(&batch.points).await?;
        report.persisted = report.backend == SinkBackend::Influxdb && written > 0;
        if !report.persisted {
            info!("{} point(s) not stored by backend {}", report.points, report.backend);
        }

        Ok(report)
    }
}
