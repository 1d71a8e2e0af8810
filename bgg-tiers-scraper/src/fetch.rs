use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::client::{CollectionSource, ImageSource};
use crate::error::ScrapeError;
use crate::export;
use crate::media;
use crate::report::{FetchLog, ItemOutcome, LogEntry};
use crate::types::{CollectionItem, GameRecord};

/// Courtesy delay after each image download attempt.
pub const PAUSE_BETWEEN_DOWNLOADS: Duration = Duration::from_millis(500);

/// Options for a fetch run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory downloaded images are written to
    pub images_dir: PathBuf,
    /// Path of the JSON manifest
    pub manifest_path: PathBuf,
    /// Delay after each image download attempt
    pub pause: Duration,
    /// How the pause is waited out
    pub sleep: fn(Duration),
}

impl FetchOptions {
    /// Default layout for a frontend project rooted at `root`.
    pub fn new(root: &Path) -> Self {
        let frontend = root.join("frontend");
        Self {
            images_dir: frontend.join("public").join("games"),
            manifest_path: frontend.join("src").join("games.json"),
            pause: PAUSE_BETWEEN_DOWNLOADS,
            sleep: std::thread::sleep,
        }
    }
}

/// Progress events emitted during a run, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// Requesting the collection from the catalog.
    FetchingCollection { user: String },
    /// The collection arrived. `total` counts items that have an id.
    CollectionReceived { total: usize },
    /// The user owns nothing; an empty manifest will be written.
    EmptyCollection,
    /// Downloading the image for a game.
    Downloading { index: usize, total: usize, name: String },
    /// A game was added to the manifest.
    GameExported {
        index: usize,
        total: usize,
        id: String,
        name: String,
        outcome: ItemOutcome,
    },
    /// The manifest was written.
    ManifestWritten { path: PathBuf, count: usize },
}

/// Result of a completed run.
#[derive(Debug)]
pub struct FetchResult {
    pub records: Vec<GameRecord>,
    pub log: FetchLog,
    pub manifest_path: PathBuf,
}

/// Fetch `user`'s owned collection, download images, and write the manifest.
///
/// Failing to load the collection or to write the manifest aborts the run.
/// Image failures are recorded in the log and never drop a record.
pub fn run_fetch(
    collection: &dyn CollectionSource,
    images: &dyn ImageSource,
    user: &str,
    options: &FetchOptions,
    events: &mpsc::Sender<FetchEvent>,
) -> Result<FetchResult, ScrapeError> {
    let _ = events.send(FetchEvent::FetchingCollection {
        user: user.to_string(),
    });
    let items = collection.owned_collection(user)?;

    let mut log = FetchLog::new();
    let mut records = Vec::new();

    if items.is_empty() {
        let _ = events.send(FetchEvent::EmptyCollection);
    } else {
        std::fs::create_dir_all(&options.images_dir)?;

        let total = items.iter().filter(|item| item.id().is_some()).count();
        let _ = events.send(FetchEvent::CollectionReceived { total });

        let mut index = 0;
        for item in &items {
            let Some(id) = item.id() else {
                log.skip_without_id();
                continue;
            };
            index += 1;
            let name = item.display_name();

            let outcome = process_item(images, item, id, options, index, total, events);

            records.push(GameRecord::new(id, name));
            log.add(LogEntry {
                id: id.to_string(),
                name: name.to_string(),
                outcome: outcome.clone(),
            });
            let _ = events.send(FetchEvent::GameExported {
                index,
                total,
                id: id.to_string(),
                name: name.to_string(),
                outcome,
            });
        }
    }

    export::write_manifest(&options.manifest_path, &records)?;
    let _ = events.send(FetchEvent::ManifestWritten {
        path: options.manifest_path.clone(),
        count: records.len(),
    });

    Ok(FetchResult {
        records,
        log,
        manifest_path: options.manifest_path.clone(),
    })
}

/// Download one game's image, if it has one.
///
/// Every download attempt, successful or not, is followed by the pause.
fn process_item(
    images: &dyn ImageSource,
    item: &CollectionItem,
    id: &str,
    options: &FetchOptions,
    index: usize,
    total: usize,
    events: &mpsc::Sender<FetchEvent>,
) -> ItemOutcome {
    let Some(url) = item.image_url() else {
        return ItemOutcome::NoImage;
    };
    let dest = match media::image_path(&options.images_dir, id) {
        Ok(dest) => dest,
        Err(e) => {
            log::warn!("  Skip thumbnail for {:?}: {}", item.display_name(), e);
            return ItemOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let _ = events.send(FetchEvent::Downloading {
        index,
        total,
        name: item.display_name().to_string(),
    });

    let outcome = match media::download_image(images, url, &dest) {
        Ok(path) => ItemOutcome::Downloaded { path },
        Err(e) => {
            log::warn!("  Skip thumbnail for {:?}: {}", item.display_name(), e);
            ItemOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    if !options.pause.is_zero() {
        (options.sleep)(options.pause);
    }

    outcome
}
