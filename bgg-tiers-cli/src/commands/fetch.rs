use std::path::Path;
use std::sync::mpsc;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use bgg_tiers_scraper::{BggClient, Credentials, FetchEvent, FetchOptions, ItemOutcome};

use crate::error::CliError;

/// Run the fetch command: credentials are validated before any request is made.
pub(crate) fn run_fetch(root: &Path, quiet: bool) -> Result<(), CliError> {
    let creds = Credentials::load(root)?;
    let client = BggClient::new(creds)?;
    let options = FetchOptions::new(root);

    let client = &client;
    let options = &options;
    let user = client.credentials().user.as_str();

    let (tx, rx) = mpsc::channel();
    let joined = std::thread::scope(|s| {
        let worker = s.spawn(move || bgg_tiers_scraper::run_fetch(client, client, user, options, &tx));

        let mut spinner: Option<ProgressBar> = None;
        for event in rx {
            render_event(event, quiet, &mut spinner);
        }
        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }

        worker.join()
    });

    let result = joined.map_err(|_| CliError::runtime("fetch worker panicked"))??;

    let summary = result.log.summary();
    log::info!(
        "Images: {} downloaded, {} failed, {} without image",
        summary.downloaded,
        summary.failed,
        summary.without_image,
    );
    if summary.skipped_without_id > 0 {
        log::debug!(
            "Ignored {} collection entries without an id",
            summary.skipped_without_id
        );
    }
    for entry in result.log.failures() {
        if let ItemOutcome::Failed { reason } = &entry.outcome {
            log::debug!("  {} (id={}): {}", entry.name, entry.id, reason);
        }
    }

    Ok(())
}

fn render_event(event: FetchEvent, quiet: bool, spinner: &mut Option<ProgressBar>) {
    match event {
        FetchEvent::FetchingCollection { user } => {
            log::info!(
                "Fetching collection for user: {}",
                user.if_supports_color(Stderr, |t| t.cyan()),
            );
            *spinner = Some(collection_spinner(quiet));
        }
        FetchEvent::EmptyCollection => {
            clear_spinner(spinner);
            log::info!("No owned games in collection.");
        }
        FetchEvent::CollectionReceived { total } => {
            clear_spinner(spinner);
            log::info!("Found {} owned games", total);
        }
        FetchEvent::Downloading { index, total, name } => {
            log::debug!("  [{}/{}] downloading image for {}", index, total, name);
        }
        FetchEvent::GameExported {
            index,
            total,
            id,
            name,
            ..
        } => {
            log::info!("  [{}/{}] {} (id={})", index, total, name, id);
        }
        FetchEvent::ManifestWritten { path, count } => {
            log::info!(
                "{} Wrote {} games to {}",
                "\u{2714}".if_supports_color(Stderr, |t| t.green()),
                count,
                path.display().if_supports_color(Stderr, |t| t.cyan()),
            );
        }
    }
}

fn collection_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.set_message("Waiting for BoardGameGeek...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn clear_spinner(spinner: &mut Option<ProgressBar>) {
    if let Some(pb) = spinner.take() {
        pb.finish_and_clear();
    }
}
