//! Runner configuration.

use std::time::Duration;

const DEFAULT_MAX_VISITS: usize = 100;
const DEFAULT_PAUSE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Tunables for [`FlowRunner`](super::FlowRunner).
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Total node-visit ceiling per run before a repeating node abandons its
    /// branch (cycle defense, default 100).
    pub max_visits: usize,
    /// Retention window passed to the pause store with each snapshot
    /// (default 7 days).
    pub pause_ttl: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_visits: DEFAULT_MAX_VISITS,
            pause_ttl: DEFAULT_PAUSE_TTL,
        }
    }
}

impl RunnerConfig {
    /// Load overrides from the environment (reading a `.env` file when
    /// present): `BRICKFLOW_MAX_NODE_VISITS`, `BRICKFLOW_PAUSE_TTL_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Some(max) = env_parse::<usize>("BRICKFLOW_MAX_NODE_VISITS") {
            config.max_visits = max;
        }
        if let Some(secs) = env_parse::<u64>("BRICKFLOW_PAUSE_TTL_SECS") {
            config.pause_ttl = Duration::from_secs(secs);
        }
        config
    }

    #[must_use]
    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }

    #[must_use]
    pub fn with_pause_ttl(mut self, pause_ttl: Duration) -> Self {
        self.pause_ttl = pause_ttl;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}
