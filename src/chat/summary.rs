use std::time::Duration;

use tokio::time::Instant;

/// How long a generated summary is reused instead of asking the backend again.
pub const SUMMARY_TTL: Duration = Duration::from_millis(30_000);

/// Shown in place of a summary when generation fails.
pub const SUMMARY_FAILED: &str = "Failed to generate summary. Please try again.";

#[derive(Debug, Clone)]
struct CachedSummary {
    text: String,
    generated_at: Instant,
}

/// Last generated visit summary. Never persisted.
#[derive(Debug)]
pub struct SummaryCache {
    ttl: Duration,
    entry: Option<CachedSummary>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(SUMMARY_TTL)
    }
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached text if it was generated less than the TTL before `now`.
    pub fn fresh(&self, now: Instant) -> Option<&str> {
        self.entry
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.generated_at) < self.ttl)
            .map(|entry| entry.text.as_str())
    }

    pub fn store(&mut self, text: impl Into<String>, generated_at: Instant) {
        self.entry = Some(CachedSummary {
            text: text.into(),
            generated_at,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// What the summary panel shows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SummaryPanel {
    pub open: bool,
    pub loading: bool,
    pub text: String,
}

impl SummaryPanel {
    /// True once a real summary (not the failure notice) is on screen.
    pub fn has_summary(&self) -> bool {
        !self.loading && !self.text.is_empty() && self.text != SUMMARY_FAILED
    }
}
