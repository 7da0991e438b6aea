//! Background scan for policies whose coverage ended recently.
//!
//! Every cycle looks for policies whose end date equals the calendar date of
//! "now minus one hour" and logs each one the first time it is seen. The seen
//! set lives only in memory: it grows for the life of the process and is lost
//! on restart, so an expiration still inside the matching window is logged
//! again after a restart.

use crate::domain::model::ExpiredPolicy;
use crate::domain::ports::InsuranceStore;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(59 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Date-only threshold: the hour offset matters only just after midnight.
pub fn expiry_threshold(now: DateTime<Utc>) -> NaiveDate {
    (now - TimeDelta::hours(1)).date_naive()
}

pub struct ExpirationPoller {
    store: Arc<dyn InsuranceStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    seen: HashSet<i64>,
}

impl ExpirationPoller {
    pub fn new(store: Arc<dyn InsuranceStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            interval: DEFAULT_CHECK_INTERVAL,
            seen: HashSet::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Runs one cycle and returns the expirations logged for the first time.
    ///
    /// The seen set is only touched after the query succeeded.
    pub async fn scan_once(&mut self) -> Result<Vec<ExpiredPolicy>> {
        let threshold = expiry_threshold(self.clock.now());
        let candidates = self.store.policies_ending_on(threshold).await?;

        let mut fresh = Vec::new();
        for policy in candidates {
            if !self.seen.insert(policy.policy_id) {
                continue;
            }
            tracing::warn!(
                policy_id = policy.policy_id,
                car_vin = %policy.vin,
                expiry_date = %policy.end_date,
                "Policy {} for car {} expired at {}",
                policy.policy_id,
                policy.vin,
                policy.end_date
            );
            fresh.push(policy);
        }

        tracing::debug!(
            "Expiration scan for {}: {} new, {} seen in total",
            threshold,
            fresh.len(),
            self.seen.len()
        );
        Ok(fresh)
    }

    /// Loops until `cancel` fires. A failed cycle is logged and the next one
    /// runs after the usual delay.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            "Expiration poller started (interval {}s)",
            self.interval.as_secs()
        );

        while !cancel.is_cancelled() {
            if let Err(e) = self.scan_once().await {
                tracing::error!("Error processing expired policies: {}", e);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Expiration poller stopped");
    }
}
