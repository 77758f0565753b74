pub mod netatmo_client;
pub mod station_reader;

pub use netatmo_client::NetatmoClient;
pub use station_reader::StationReader;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::config::GlobalSettings;
use crate::error::{ProcessingError, Result};
use crate::utils::progress::ProgressReporter;

/// Anything that can produce raw station records for one run.
#[async_trait]
pub trait StationSource: Send + Sync {
    async fn fetch_stations(&self) -> Result<Vec<Value>>;
}

/// How often to ask the source again when it returns nothing or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_settings(global: &GlobalSettings) -> Self {
        Self::new(global.retries, Duration::from_secs(global.retry_backoff_secs))
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_for(&self, _attempt: u32) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&GlobalSettings::default())
    }
}

/// Query `source` until it returns at least one station or the attempts run
/// out. An empty final answer is returned as-is; if no attempt succeeded the
/// last error is returned. Authentication failures are not retried.
pub async fn fetch_until_nonempty<S: StationSource + ?Sized>(
    source: &S,
    policy: &RetryPolicy,
    progress: Option<&ProgressReporter>,
) -> Result<Vec<Value>> {
    let mut last_empty = None;
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        info!("Request weather data (attempt {})", attempt);
        if let Some(p) = progress {
            p.set_message(&format!(
                "Requesting weather data (attempt {}/{})...",
                attempt, policy.max_attempts
            ));
        }

        match source.fetch_stations().await {
            Ok(stations) if !stations.is_empty() => {
                info!("{} station(s) found", stations.len());
                return Ok(stations);
            }
            Ok(stations) => {
                info!("No station found, retry");
                last_empty = Some(stations);
            }
            Err(err @ ProcessingError::Authentication(_)) => return Err(err),
            Err(err) => {
                error!("{}", err);
                last_error = Some(err);
            }
        }

        if attempt < policy.max_attempts {
            let delay = policy.delay_for(attempt);
            info!("Waiting {:?} before retrying", delay);
            tokio::time::sleep(delay).await;
        }
    }

    match (last_empty, last_error) {
        (Some(stations), _) => Ok(stations),
        (None, Some(err)) => Err(err),
        (None, None) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays scripted answers, one per call.
    struct ScriptedSource {
        answers: Mutex<Vec<Result<Vec<Value>>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(mut answers: Vec<Result<Vec<Value>>>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl StationSource for ScriptedSource {
        async fn fetch_stations(&self) -> Result<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retries_until_nonempty() {
        let source = ScriptedSource::new(vec![
            Ok(vec![]),
            Err(ProcessingError::Fetch("502 Bad Gateway".to_string())),
            Ok(vec![json!({"_id": "a"})]),
        ]);

        let stations = fetch_until_nonempty(&source, &policy(3), None).await.unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_budget_with_empty_result() {
        let source = ScriptedSource::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![]), Ok(vec![])]);

        let stations = fetch_until_nonempty(&source, &policy(3), None).await.unwrap();

        assert!(stations.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_failures_surface_last_error() {
        let source = ScriptedSource::new(vec![
            Err(ProcessingError::Fetch("first".to_string())),
            Err(ProcessingError::Fetch("second".to_string())),
        ]);

        let err = fetch_until_nonempty(&source, &policy(2), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Weather data request failed: second");
    }

    #[tokio::test]
    async fn test_authentication_failure_is_not_retried() {
        let source = ScriptedSource::new(vec![Err(ProcessingError::Authentication(
            "400 invalid_grant".to_string(),
        ))]);

        let err = fetch_until_nonempty(&source, &policy(3), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Authentication(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
