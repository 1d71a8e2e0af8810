use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use bgg_tiers_scraper::fetch::PAUSE_BETWEEN_DOWNLOADS;
use bgg_tiers_scraper::{
    CollectionItem, CollectionSource, FetchEvent, FetchOptions, GameRecord, ImageSource,
    ItemOutcome, ScrapeError, run_fetch,
};

thread_local! {
    static PAUSES: RefCell<Vec<Duration>> = const { RefCell::new(Vec::new()) };
}

fn record_pause(pause: Duration) {
    PAUSES.with(|p| p.borrow_mut().push(pause));
}

fn read_manifest(path: &Path) -> Vec<GameRecord> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

struct FakeCollection(Option<Vec<CollectionItem>>);

impl CollectionSource for FakeCollection {
    fn owned_collection(&self, user: &str) -> Result<Vec<CollectionItem>, ScrapeError> {
        self.0
            .clone()
            .ok_or_else(|| ScrapeError::unavailable(user, "Invalid username specified"))
    }
}

/// Serves fixed bytes per URL; any other URL answers 404.
#[derive(Default)]
struct FakeImages {
    images: HashMap<String, Vec<u8>>,
    requested: RefCell<Vec<String>>,
}

impl FakeImages {
    fn with(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }
}

impl ImageSource for FakeImages {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.requested.borrow_mut().push(url.to_string());
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::ServerError {
                status: 404,
                message: "Not Found".to_string(),
            })
    }
}

fn game(id: Option<&str>, name: &str, thumbnail: Option<&str>) -> CollectionItem {
    CollectionItem {
        id: id.map(str::to_string),
        name: Some(name.to_string()),
        thumbnail: thumbnail.map(str::to_string),
        image: None,
    }
}

fn options(root: &Path) -> FetchOptions {
    FetchOptions {
        pause: Duration::ZERO,
        ..FetchOptions::new(root)
    }
}

fn run(
    items: Option<Vec<CollectionItem>>,
    images: &FakeImages,
    opts: &FetchOptions,
) -> (Result<bgg_tiers_scraper::FetchResult, ScrapeError>, Vec<FetchEvent>) {
    let (tx, rx) = mpsc::channel();
    let result = run_fetch(&FakeCollection(items), images, "alice", opts, &tx);
    drop(tx);
    (result, rx.iter().collect())
}

#[test]
fn test_default_layout() {
    let opts = FetchOptions::new(Path::new("/project"));
    assert_eq!(opts.images_dir, Path::new("/project/frontend/public/games"));
    assert_eq!(opts.manifest_path, Path::new("/project/frontend/src/games.json"));
    assert_eq!(opts.pause, Duration::from_millis(500));
}

#[test]
fn test_failed_download_still_exports_record() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let images = FakeImages::default();

    let (result, _) = run(
        Some(vec![game(Some("13"), "Catan", Some("http://x/img.jpg"))]),
        &images,
        &opts,
    );
    let result = result.unwrap();

    assert_eq!(
        read_manifest(&opts.manifest_path),
        vec![GameRecord {
            id: "13".to_string(),
            name: "Catan".to_string(),
            image: "/games/13.jpg".to_string(),
        }]
    );
    assert!(!opts.images_dir.join("13.jpg").exists());
    assert!(matches!(
        result.log.entries()[0].outcome,
        ItemOutcome::Failed { .. }
    ));
    assert_eq!(images.requested.borrow().as_slice(), ["http://x/img.jpg"]);
}

#[test]
fn test_record_count_matches_items_with_ids() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let images = FakeImages::default().with("http://x/1.jpg", b"one");

    let items = vec![
        game(Some("1"), "Azul", Some("http://x/1.jpg")),
        game(None, "Mystery", Some("http://x/missing.jpg")),
        game(Some("2"), "Brass", Some("http://x/2.jpg")),
        game(Some("3"), "Coup", None),
    ];
    let (result, _) = run(Some(items), &images, &opts);
    let result = result.unwrap();

    let ids: Vec<_> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(read_manifest(&opts.manifest_path), result.records);

    let summary = result.log.summary();
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.without_image, 1);
    assert_eq!(summary.skipped_without_id, 1);

    assert_eq!(std::fs::read(opts.images_dir.join("1.jpg")).unwrap(), b"one");
    assert!(!opts.images_dir.join("2.jpg").exists());
    // The id-less item is never downloaded.
    assert!(!images.requested.borrow().iter().any(|u| u.contains("missing")));
}

#[test]
fn test_item_without_id_not_counted_in_progress() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());

    let items = vec![
        game(None, "Mystery", None),
        game(Some("1"), "Azul", None),
        game(Some("2"), "Brass", None),
    ];
    let (result, events) = run(Some(items), &FakeImages::default(), &opts);
    result.unwrap();

    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            FetchEvent::GameExported {
                index, total, id, ..
            } => Some((*index, *total, id.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![(1, 2, "1".to_string()), (2, 2, "2".to_string())]
    );
}

#[test]
fn test_empty_collection_writes_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());

    let (result, events) = run(Some(Vec::new()), &FakeImages::default(), &opts);
    assert!(result.unwrap().records.is_empty());

    assert_eq!(std::fs::read_to_string(&opts.manifest_path).unwrap(), "[]");
    assert!(!opts.images_dir.exists());
    assert!(events.iter().any(|e| matches!(e, FetchEvent::EmptyCollection)));
}

#[test]
fn test_unavailable_collection_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());

    let (result, _) = run(None, &FakeImages::default(), &opts);
    assert!(matches!(
        result,
        Err(ScrapeError::CollectionUnavailable { .. })
    ));
    assert!(!opts.manifest_path.exists());
    assert!(!opts.images_dir.exists());
}

#[test]
fn test_unavailable_collection_keeps_previous_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    std::fs::create_dir_all(opts.manifest_path.parent().unwrap()).unwrap();
    std::fs::write(&opts.manifest_path, "[\"stale\"]").unwrap();

    let (result, _) = run(None, &FakeImages::default(), &opts);
    assert!(result.is_err());
    assert_eq!(
        std::fs::read_to_string(&opts.manifest_path).unwrap(),
        "[\"stale\"]"
    );
}

#[test]
fn test_rerun_produces_identical_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let images = FakeImages::default().with("http://x/1.jpg", b"one");
    let items = vec![
        game(Some("1"), "Azul", Some("http://x/1.jpg")),
        game(Some("2"), "Brass", Some("http://x/2.jpg")),
    ];

    run(Some(items.clone()), &images, &opts).0.unwrap();
    let first = std::fs::read(&opts.manifest_path).unwrap();
    run(Some(items), &images, &opts).0.unwrap();
    let second = std::fs::read(&opts.manifest_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_event_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let images = FakeImages::default().with("http://x/1.jpg", b"one");

    let (result, events) = run(
        Some(vec![game(Some("1"), "Azul", Some("http://x/1.jpg"))]),
        &images,
        &opts,
    );
    result.unwrap();

    assert!(matches!(
        events.first(),
        Some(FetchEvent::FetchingCollection { user }) if user == "alice"
    ));
    assert!(matches!(
        events[1],
        FetchEvent::CollectionReceived { total: 1 }
    ));
    assert!(matches!(events[2], FetchEvent::Downloading { index: 1, .. }));
    assert!(matches!(
        events[3],
        FetchEvent::GameExported {
            outcome: ItemOutcome::Downloaded { .. },
            ..
        }
    ));
    assert!(matches!(
        events.last(),
        Some(FetchEvent::ManifestWritten { count: 1, .. })
    ));
}

#[test]
fn test_pause_follows_every_download_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let opts = FetchOptions {
        pause: PAUSE_BETWEEN_DOWNLOADS,
        sleep: record_pause,
        ..FetchOptions::new(dir.path())
    };
    let images = FakeImages::default().with("http://x/1.jpg", b"one");

    let items = vec![
        game(Some("1"), "Azul", Some("http://x/1.jpg")),
        game(Some("2"), "Brass", None),
        game(Some("3"), "Coup", Some("http://x/3.jpg")),
    ];
    let (result, _) = run(Some(items), &images, &opts);
    let result = result.unwrap();

    let summary = result.log.summary();
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.without_image, 1);
    assert_eq!(summary.failed, 1);

    // One pause per request, none for the item without a URL, and the last
    // item still pauses.
    let pauses = PAUSES.with(|p| p.borrow().clone());
    assert_eq!(pauses, vec![Duration::from_millis(500); 2]);
}

#[test]
fn test_id_escaping_images_dir_is_not_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let images = FakeImages::default()
        .with("http://x/evil.jpg", b"evil")
        .with("http://x/1.jpg", b"one");

    let items = vec![
        game(Some("../escape"), "Evil", Some("http://x/evil.jpg")),
        game(Some("1"), "Azul", Some("http://x/1.jpg")),
    ];
    let (result, _) = run(Some(items), &images, &opts);
    let result = result.unwrap();

    assert!(matches!(
        result.log.entries()[0].outcome,
        ItemOutcome::Failed { .. }
    ));
    assert!(matches!(
        result.log.entries()[1].outcome,
        ItemOutcome::Downloaded { .. }
    ));
    assert_eq!(images.requested.borrow().as_slice(), ["http://x/1.jpg"]);
    assert!(!opts.images_dir.join("../escape.jpg").exists());

    // The record is still exported.
    let ids: Vec<_> = read_manifest(&opts.manifest_path)
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["../escape", "1"]);
}
