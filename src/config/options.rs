// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::engine::types::LoadPlan;
use crate::retry::RetryPolicy;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub collect: CollectOptions,
    pub browser: BrowserOptions,
    pub export: ExportOptions,
}

/// Knobs for one collection run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    pub target_count: usize,
    pub max_rounds: usize,
    pub max_stagnant_rounds: usize,
    pub scroll_pause: Duration,
    pub expand_batch: usize,
    /// Wait after clicking the star-rating affordance before re-counting.
    pub settle: Duration,
    /// Readiness wait after navigating and after each entry click.
    pub ready_timeout: Duration,
    pub retry: RetryPolicy,
    /// Harvest every pagination round instead of only the final snapshot.
    pub incremental: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET,
            max_rounds: MAX_ROUNDS,
            max_stagnant_rounds: MAX_STAGNANT_ROUNDS,
            scroll_pause: Duration::from_millis(SCROLL_PAUSE_MS),
            expand_batch: EXPAND_BATCH,
            settle: Duration::from_millis(SETTLE_MS),
            ready_timeout: Duration::from_secs(TIMEOUT_SECS),
            retry: RetryPolicy::new(MAX_RETRIES, Duration::from_millis(RETRY_BACKOFF_MS)),
            incremental: false,
        }
    }
}

impl CollectOptions {
    /// Same limits with every wait set to zero. For offline sources.
    pub fn without_waits(mut self) -> Self {
        self.scroll_pause = Duration::ZERO;
        self.settle = Duration::ZERO;
        self.ready_timeout = Duration::ZERO;
        self.retry.backoff = Duration::ZERO;
        self
    }

    pub fn load_plan(&self) -> LoadPlan {
        LoadPlan {
            target_count: self.target_count.max(1),
            max_rounds: self.max_rounds,
            max_stagnant_rounds: self.max_stagnant_rounds,
            pause: self.scroll_pause,
            expand_batch: self.expand_batch,
            retry: self.retry,
        }
    }
}

/// Client identity presented by the browser. Picked explicitly so runs are reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UserAgent {
    #[default]
    ChromeWindows,
    SafariMac,
    FirefoxWindows,
    ChromeLinux,
}

impl UserAgent {
    pub const ALL: [UserAgent; 4] = [
        UserAgent::ChromeWindows,
        UserAgent::SafariMac,
        UserAgent::FirefoxWindows,
        UserAgent::ChromeLinux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserAgent::ChromeWindows => "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            UserAgent::SafariMac => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
            UserAgent::FirefoxWindows => "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
            UserAgent::ChromeLinux => "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,
    pub timeout: Duration,
    pub user_agent: UserAgent,
    pub window: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(TIMEOUT_SECS),
            user_agent: UserAgent::default(),
            window: (WINDOW_W, WINDOW_H),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { out_dir: PathBuf::from(DEFAULT_OUT_DIR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_plan_clamps_target_to_one() {
        let mut opts = CollectOptions::default();
        opts.target_count = 0;
        assert_eq!(opts.load_plan().target_count, 1);
    }

    #[test]
    fn without_waits_keeps_limits() {
        let opts = CollectOptions::default().without_waits();
        assert_eq!(opts.max_rounds, MAX_ROUNDS);
        assert_eq!(opts.retry.max_attempts, MAX_RETRIES);
        assert!(opts.scroll_pause.is_zero() && opts.retry.backoff.is_zero());
    }

    #[test]
    fn user_agents_are_distinct() {
        let mut all: Vec<_> = UserAgent::ALL.iter().map(|u| u.as_str()).collect();
        all.dedup();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|ua| ua.starts_with("Mozilla/5.0")));
    }
}
