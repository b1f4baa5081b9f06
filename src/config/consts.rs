// src/config/consts.rs

// Collection
pub const DEFAULT_TARGET: usize = 100;
pub const MAX_ROUNDS: usize = 50; // safety ceiling on scroll rounds
pub const MAX_STAGNANT_ROUNDS: usize = 5;
pub const SCROLL_PAUSE_MS: u64 = 1500;
pub const EXPAND_BATCH: usize = 10; // "More" buttons clicked per round
pub const SETTLE_MS: u64 = 2000; // after clicking the star-rating affordance

// Retry
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_BACKOFF_MS: u64 = 2000;

// Browser
pub const TIMEOUT_SECS: u64 = 30;
pub const WINDOW_W: u32 = 1920;
pub const WINDOW_H: u32 = 1080;

// Export
pub const DEFAULT_OUT_DIR: &str = "scraped_data";
pub const ARTIFACT_SUFFIX: &str = "reviews";
pub const TIMESTAMP_FMT: &str = "%Y%m%d_%H%M%S";

// Logging
pub const LOG_FILE: &str = "review_scrape.log";
