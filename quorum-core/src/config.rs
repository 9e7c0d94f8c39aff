//! Cluster timing configuration.

use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;
use tracing::warn;

/// Randomized election timeout.
///
/// Each `wait` draws exactly one float `r` in [0, 1) from the
/// randomization source and suspends for `min + r * (max - min)`. The
/// source is injectable so tests can pin the timeout to a known value.
pub struct ElectionTimeout {
    min: Duration,
    max: Duration,
    randomization: Mutex<Box<dyn Iterator<Item = f64> + Send>>,
}

impl ElectionTimeout {
    /// Uniformly randomized timeout in `[min, max]`.
    pub fn new(min: Duration, max: Duration) -> Self {
        let mut rng = StdRng::from_entropy();
        Self::with_randomization(min, max, std::iter::repeat_with(move || rng.gen::<f64>()))
    }

    /// Timeout driven by an explicit float stream in [0, 1).
    pub fn with_randomization(
        min: Duration,
        max: Duration,
        randomization: impl Iterator<Item = f64> + Send + 'static,
    ) -> Self {
        Self {
            min,
            max,
            randomization: Mutex::new(Box::new(randomization)),
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Suspends the caller for one randomized timeout span.
    pub async fn wait(&self) {
        sleep(self.sample()).await;
    }

    fn sample(&self) -> Duration {
        // an exhausted finite source degrades to the maximum timeout
        let r = self.randomization.lock().next().unwrap_or(1.0);
        self.min + self.max.saturating_sub(self.min).mul_f64(r)
    }
}

/// Timing parameters shared by every node in a cluster.
pub struct ClusterConfiguration {
    pub election_timeout: ElectionTimeout,
    pub heartbeat_period: Duration,
}

impl ClusterConfiguration {
    pub fn new(election_timeout: ElectionTimeout, heartbeat_period: Duration) -> Self {
        if heartbeat_period >= election_timeout.min() {
            warn!(
                "heartbeat period {:?} is not below the minimum election timeout {:?}; \
                 a stable leader cannot reliably suppress elections",
                heartbeat_period,
                election_timeout.min(),
            );
        }
        Self {
            election_timeout,
            heartbeat_period,
        }
    }
}
