// src/file.rs

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::consts::{ARTIFACT_SUFFIX, TIMESTAMP_FMT};
use crate::config::options::ExportOptions;
use crate::core::sanitize::sanitize_business_filename;
use crate::engine::types::CollectionRun;
use crate::error::ExportError;

/// CSV header, in `Record` field order.
pub const CSV_COLUMNS: [&str; 6] = ["reviewer_name", "rating", "date", "text", "is_local_guide", "review_id"];

/// Where a finished run goes. Returns the paths it wrote, if any.
pub trait Output {
    fn persist(&mut self, run: &CollectionRun) -> Result<Vec<PathBuf>, ExportError>;
}

/// Writes `<stem>_reviews.csv` and `<stem>_reviews.json` side by side.
#[derive(Clone, Debug)]
pub struct FileOutput {
    out_dir: PathBuf,
}

impl FileOutput {
    pub fn new(export: &ExportOptions) -> Self {
        Self { out_dir: normalize_dir_path(&export.out_dir.to_string_lossy()) }
    }

    pub fn out_dir(&self) -> &Path { &self.out_dir }
}

impl Output for FileOutput {
    fn persist(&mut self, run: &CollectionRun) -> Result<Vec<PathBuf>, ExportError> {
        ensure_directory(&self.out_dir)?;
        let stem = format!(
            "{}_{}",
            sanitize_business_filename(&run.place.name),
            run.place.collected_at.format(TIMESTAMP_FMT)
        );
        let stem = resolve_artifact_stem(&self.out_dir, &stem);

        let csv_path = self.out_dir.join(format!("{stem}_{ARTIFACT_SUFFIX}.csv"));
        write_csv(&csv_path, run)?;
        let json_path = self.out_dir.join(format!("{stem}_{ARTIFACT_SUFFIX}.json"));
        write_json(&json_path, run)?;

        tracing::info!(
            "Export: Saved {} reviews to {} and {}",
            run.records.len(),
            csv_path.display(),
            json_path.display()
        );
        Ok(vec![csv_path, json_path])
    }
}

/// Keeps runs in memory only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOutput;

impl Output for NullOutput {
    fn persist(&mut self, _run: &CollectionRun) -> Result<Vec<PathBuf>, ExportError> {
        Ok(Vec::new())
    }
}

/// One row per record, header always present.
pub fn write_csv(path: &Path, run: &CollectionRun) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(CSV_COLUMNS)?;
    for record in &run.records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `{place_info, reviews}`, pretty-printed.
pub fn write_json(path: &Path, run: &CollectionRun) -> Result<(), ExportError> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, run)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Two runs for the same place within one second must not overwrite each
/// other: the second gets `<stem> (2)`, then `(3)`, ...
pub fn resolve_artifact_stem(dir: &Path, stem: &str) -> String {
    let taken = |s: &str| dir.join(format!("{s}_{ARTIFACT_SUFFIX}.csv")).exists();
    if !taken(stem) {
        return stem.to_string();
    }
    (2..)
        .map(|n| format!("{stem} ({n})"))
        .find(|s| !taken(s))
        .unwrap_or_else(|| stem.to_string())
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c=='/'||c=='\\' { sep } else { c }).collect()
}

pub fn normalize_dir_path(p: &str) -> PathBuf {
    PathBuf::from(normalize_separators(p))
}

pub fn ensure_directory(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.display().to_string()));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}
