// tests/export_artifacts.rs
use std::fs;

use chrono::{Local, TimeZone};

use review_scrape::config::options::{CollectOptions, ExportOptions};
use review_scrape::engine::{CollectionRun, PlaceSummary, Record};
use review_scrape::error::ExportError;
use review_scrape::file::{FileOutput, Output, CSV_COLUMNS};
use review_scrape::progress::NullProgress;
use review_scrape::source::MemorySource;
use review_scrape::{Collector, Outcome, Target};

fn sample_run(name: &str) -> CollectionRun {
    let mut a = Record::empty("r1");
    a.author_name = "Ana, from \"Lisbon\"".into();
    a.rating = 5.0;
    a.body_text = "Great food.\nWill return.".into();
    a.is_verified_contributor = true;
    let b = Record::empty("unknown-0123456789abcdef");
    CollectionRun {
        place: PlaceSummary {
            name: name.into(),
            overall_rating: Some("4.7".into()),
            reported_total: 1234,
            collected_count: 2,
            collected_at: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
        },
        records: vec![a, b],
    }
}

fn output_in(dir: &std::path::Path) -> FileOutput {
    FileOutput::new(&ExportOptions { out_dir: dir.join("scraped") })
}

#[test]
fn writes_sibling_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = output_in(dir.path());
    let paths = out.persist(&sample_run("Café Luna & Co.")).unwrap();

    assert_eq!(paths.len(), 2);
    let csv_name = paths[0].file_name().unwrap().to_string_lossy().into_owned();
    let json_name = paths[1].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(csv_name, "caf_luna_co_20240309_140507_reviews.csv");
    assert_eq!(json_name, "caf_luna_co_20240309_140507_reviews.json");

    let mut rdr = csv::Reader::from_path(&paths[0]).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, CSV_COLUMNS);
    let rows: Vec<Record> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].author_name, "Ana, from \"Lisbon\"");
    assert_eq!(rows[0].body_text, "Great food.\nWill return.");
    assert!(rows[0].is_verified_contributor);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&paths[1]).unwrap()).unwrap();
    assert_eq!(json["place_info"]["name"], "Café Luna & Co.");
    assert_eq!(json["place_info"]["total_reviews"], 1234);
    assert_eq!(json["place_info"]["scraped_reviews_count"], 2);
    assert_eq!(json["reviews"][0]["review_id"], "r1");
    assert_eq!(json["reviews"][1]["reviewer_name"], "Anonymous");
}

#[test]
fn json_round_trips_into_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = sample_run("Luna");
    let paths = output_in(dir.path()).persist(&run).unwrap();
    let back: CollectionRun = serde_json::from_str(&fs::read_to_string(&paths[1]).unwrap()).unwrap();
    assert_eq!(back, run);
}

#[test]
fn same_second_runs_do_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = output_in(dir.path());
    let first = out.persist(&sample_run("Luna")).unwrap();
    let second = out.persist(&sample_run("Luna")).unwrap();
    assert_ne!(first[0], second[0]);
    assert!(second[0].to_string_lossy().contains("luna_20240309_140507 (2)_reviews.csv"));
}

#[test]
fn empty_run_still_has_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut run = sample_run("");
    run.records.clear();
    let paths = output_in(dir.path()).persist(&run).unwrap();
    assert!(paths[0].file_name().unwrap().to_string_lossy().starts_with("business_"));
    let csv = fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(csv.trim_end(), CSV_COLUMNS.join(","));
}

#[test]
fn output_path_blocked_by_a_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("scraped"), "not a dir").unwrap();
    let err = output_in(dir.path()).persist(&sample_run("Luna")).unwrap_err();
    assert!(matches!(err, ExportError::NotADirectory(_)));
}

#[test]
fn collector_writes_through_file_output() {
    let dir = tempfile::tempdir().unwrap();
    let frame = r#"<h1 class="DUwDvf">Luna</h1><div class="DxyBCb">
        <div data-review-id="a"><span class="kvMYJc" aria-label="3 stars"></span></div>
        <div data-review-id="b"><span class="kvMYJc" aria-label="5 stars"></span></div></div>"#;
    let src = MemorySource::records_view(vec![frame.into()]);
    let mut opts = CollectOptions::default().without_waits();
    opts.max_stagnant_rounds = 1;
    let mut collector = Collector::new(src, opts, &NullProgress);

    let Outcome::Done(done) = collector.run(&Target::Url("u".into()), &mut output_in(dir.path())) else {
        panic!("run should complete");
    };
    assert_eq!(done.artifacts.len(), 2);
    assert!(done.artifacts.iter().all(|p| p.exists()));
    let rows = csv::Reader::from_path(&done.artifacts[0]).unwrap().records().count();
    assert_eq!(rows, 2);
}
