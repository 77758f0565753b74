/// True when `reading_timestamp` lies within `max_age_seconds` of `now`,
/// in either direction. Readings from slightly in the future count as fresh.
pub fn is_fresh(reading_timestamp: i64, now: i64, max_age_seconds: u64) -> bool {
    now.abs_diff(reading_timestamp) <= max_age_seconds
}

/// The freshness window applied to every reading of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindow {
    max_age_seconds: u64,
}

impl FreshnessWindow {
    pub fn new(max_age_seconds: u64) -> Self {
        Self { max_age_seconds }
    }

    pub fn max_age_seconds(&self) -> u64 {
        self.max_age_seconds
    }

    pub fn contains(&self, reading_timestamp: i64, now: i64) -> bool {
        is_fresh(reading_timestamp, now, self.max_age_seconds)
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self::new(crate::utils::constants::DEFAULT_INTERVAL_SECS)
    }
}
