// src/cli.rs
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::consts::*;
use crate::config::options::{AppOptions, UserAgent};
use crate::file::FileOutput;
use crate::progress::Progress;
use crate::runner::{Collector, Outcome, Target};
use crate::source::chrome::ChromeSource;
use crate::source::{MemorySource, Source};

/// Collect reviews for one place into CSV + JSON.
/// Without arguments an interactive menu runs instead.
#[derive(Parser, Debug)]
#[command(name = "review_scrape", version, about)]
pub struct Args {
    /// Business name to look up
    #[arg(long, conflicts_with = "url", required_unless_present_any = ["url", "replay"])]
    pub business: Option<String>,

    /// Place URL, skips the lookup
    #[arg(long)]
    pub url: Option<String>,

    /// Number of reviews to collect
    #[arg(short = 'n', long = "reviews", default_value_t = DEFAULT_TARGET)]
    pub reviews: usize,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = UserAgent::ChromeWindows)]
    pub user_agent: UserAgent,

    /// Safety ceiling on scroll rounds
    #[arg(long, default_value_t = MAX_ROUNDS)]
    pub max_rounds: usize,

    /// Give up after this many rounds without new reviews
    #[arg(long, default_value_t = MAX_STAGNANT_ROUNDS)]
    pub stagnant_rounds: usize,

    /// Pause after each scroll, in milliseconds
    #[arg(long, default_value_t = SCROLL_PAUSE_MS)]
    pub pause_ms: u64,

    /// Extract every scroll round, not just the final page
    #[arg(long)]
    pub incremental: bool,

    /// Run offline against a saved reviews page
    #[arg(long, value_name = "HTML", conflicts_with_all = ["business", "url"])]
    pub replay: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn options(&self) -> AppOptions {
        let mut opts = AppOptions::default();
        opts.collect.target_count = self.reviews;
        opts.collect.max_rounds = self.max_rounds;
        opts.collect.max_stagnant_rounds = self.stagnant_rounds;
        opts.collect.scroll_pause = Duration::from_millis(self.pause_ms);
        opts.collect.incremental = self.incremental;
        opts.browser.headless = self.headless;
        opts.browser.user_agent = self.user_agent;
        opts.export.out_dir = self.output.clone();
        opts
    }

    pub fn target(&self) -> Option<Target> {
        match (&self.url, &self.business, &self.replay) {
            (Some(url), _, _) => Some(Target::Url(url.clone())),
            (None, Some(name), _) => Some(Target::Query(name.clone())),
            (None, None, Some(path)) => Some(Target::Url(path.display().to_string())),
            _ => None,
        }
    }
}

pub fn run() -> Result<()> {
    // only program name
    if std::env::args().len() == 1 {
        crate::log::init(LOG_FILE.as_ref(), false).wrap_err("opening log file")?;
        return interactive(&mut io::stdin().lock(), &mut io::stdout());
    }

    let args = Args::parse();
    crate::log::init(LOG_FILE.as_ref(), args.verbose).wrap_err("opening log file")?;
    let opts = args.options();
    let Some(target) = args.target() else {
        color_eyre::eyre::bail!("Either --business, --url or --replay is required");
    };

    let outcome = match &args.replay {
        Some(path) => {
            let html = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
            let mut collect = opts.collect.clone().without_waits();
            collect.max_stagnant_rounds = collect.max_stagnant_rounds.min(1);
            let opts = AppOptions { collect, ..opts.clone() };
            execute(MemorySource::records_view(vec![html]), &target, &opts)
        }
        None => execute(ChromeSource::launch(&opts.browser)?, &target, &opts),
    };

    report(&mut io::stdout(), &outcome, &opts)?;
    if outcome.is_done() { Ok(()) } else { std::process::exit(1) }
}

fn execute<S: Source>(source: S, target: &Target, opts: &AppOptions) -> Outcome {
    let bar = BarProgress::new();
    let mut output = FileOutput::new(&opts.export);
    Collector::new(source, opts.collect.clone(), &bar).run(target, &mut output)
}

fn report(out: &mut impl Write, outcome: &Outcome, opts: &AppOptions) -> io::Result<()> {
    match outcome {
        Outcome::Done(done) => {
            let place = &done.run.place;
            writeln!(out, "\nSuccessfully scraped {} reviews for {}", done.run.records.len(), place.name)?;
            writeln!(out, "Overall rating: {}", place.overall_rating.as_deref().unwrap_or("No overall rating"))?;
            writeln!(out, "Total reviews: {}", place.reported_total)?;
            writeln!(out, "Data saved to {} directory", opts.export.out_dir.display())?;
        }
        Outcome::Failed(_) => writeln!(out, "Failed to scrape reviews. Check the log file for details.")?,
    }
    Ok(())
}

/* ---------------- Interactive menu ---------------- */

#[derive(Debug, PartialEq, Eq)]
pub struct MenuChoice {
    pub target: Target,
    pub reviews: usize,
    pub headless: bool,
    pub output: PathBuf,
}

fn ask(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> io::Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y")
}

/// One pass through the menu. `None` means exit.
pub fn prompt_menu(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<MenuChoice>> {
    writeln!(out, "\n=== Google Reviews Scraper ===")?;
    writeln!(out, "1. Scrape by Business Name")?;
    writeln!(out, "2. Scrape by URL")?;
    writeln!(out, "3. Exit")?;

    let choice = ask(input, out, "\nEnter your choice (1-3): ")?;
    if choice != "1" && choice != "2" {
        return Ok(None);
    }

    let reviews = ask(input, out, "Number of reviews to scrape (default: 100): ")?
        .parse::<usize>()
        .unwrap_or(DEFAULT_TARGET);
    let headless = yes(&ask(input, out, "Run in headless mode? (y/N): ")?);
    let output = ask(input, out, &format!("Output directory (default: {DEFAULT_OUT_DIR}): "))?;
    let output = PathBuf::from(if output.is_empty() { DEFAULT_OUT_DIR } else { output.as_str() });

    let target = if choice == "1" {
        let name = ask(input, out, "Enter business name: ")?;
        if name.is_empty() {
            writeln!(out, "Error: Business name is required")?;
            return Ok(None);
        }
        Target::Query(name)
    } else {
        let url = ask(input, out, "Enter Google Maps URL: ")?;
        if url.is_empty() {
            writeln!(out, "Error: URL is required")?;
            return Ok(None);
        }
        Target::Url(url)
    };

    Ok(Some(MenuChoice { target, reviews, headless, output }))
}

/// Menu loop. Every iteration gets its own browser session.
pub fn interactive(input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    while let Some(choice) = prompt_menu(input, out)? {
        let mut opts = AppOptions::default();
        opts.collect.target_count = choice.reviews;
        opts.browser.headless = choice.headless;
        opts.export.out_dir = choice.output;

        match ChromeSource::launch(&opts.browser) {
            Ok(source) => {
                let outcome = execute(source, &choice.target, &opts);
                report(out, &outcome, &opts)?;
            }
            Err(e) => {
                tracing::error!("Chrome: {e}");
                writeln!(out, "Failed to scrape reviews. Check the log file for details.")?;
            }
        }

        if !yes(&ask(input, out, "\nWould you like to scrape another business? (y/N): ")?) {
            break;
        }
    }
    writeln!(out, "\nThank you for using Google Reviews Scraper!")?;
    Ok(())
}

/* ---------------- Progress bar ---------------- */

/// Scroll progress on stderr; log lines are printed around the bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self { bar: ProgressBar::hidden() }
    }
}

impl Default for BarProgress {
    fn default() -> Self { Self::new() }
}

impl Progress for BarProgress {
    fn begin(&self, target: usize) {
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reviews {msg}") {
            self.bar.set_style(style.progress_chars("█▓▒░ "));
        }
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_length(target as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, loaded: usize) {
        self.bar.set_position(loaded as u64);
    }

    fn finish(&self, loaded: usize) {
        self.bar.finish_with_message(format!("done at {loaded}"));
    }

    fn debug(&self, msg: &str) { self.bar.suspend(|| tracing::debug!("{msg}")); }
    fn info(&self, msg: &str) { self.bar.suspend(|| tracing::info!("{msg}")); }
    fn warn(&self, msg: &str) { self.bar.suspend(|| tracing::warn!("{msg}")); }
    fn error(&self, msg: &str) { self.bar.suspend(|| tracing::error!("{msg}")); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(script: &str) -> Option<MenuChoice> {
        let mut out = Vec::new();
        prompt_menu(&mut script.as_bytes(), &mut out).unwrap()
    }

    #[test]
    fn menu_by_name_with_defaults() {
        let choice = menu("1\n\n\n\nBlue Door Cafe\n").unwrap();
        assert_eq!(choice.target, Target::Query("Blue Door Cafe".into()));
        assert_eq!(choice.reviews, DEFAULT_TARGET);
        assert!(!choice.headless);
        assert_eq!(choice.output, PathBuf::from(DEFAULT_OUT_DIR));
    }

    #[test]
    fn menu_by_url_with_overrides() {
        let choice = menu("2\n25\ny\nout\nhttps://maps.test/p\n").unwrap();
        assert_eq!(choice.target, Target::Url("https://maps.test/p".into()));
        assert_eq!(choice.reviews, 25);
        assert!(choice.headless);
        assert_eq!(choice.output, PathBuf::from("out"));
    }

    #[test]
    fn menu_exit_and_missing_name() {
        assert_eq!(menu("3\n"), None);
        assert_eq!(menu("1\n\n\n\n\n"), None);
    }

    #[test]
    fn args_map_onto_options() {
        let args = Args::parse_from(["review_scrape", "--url", "https://maps.test/p", "-n", "40", "--pause-ms", "0", "--incremental"]);
        let opts = args.options();
        assert_eq!(opts.collect.target_count, 40);
        assert!(opts.collect.scroll_pause.is_zero());
        assert!(opts.collect.incremental);
        assert!(!opts.browser.headless);
        assert_eq!(args.target(), Some(Target::Url("https://maps.test/p".into())));
    }

    #[test]
    fn business_and_url_conflict() {
        assert!(Args::try_parse_from(["review_scrape", "--business", "x", "--url", "y"]).is_err());
        assert!(Args::try_parse_from(["review_scrape"]).is_err());
    }
}
