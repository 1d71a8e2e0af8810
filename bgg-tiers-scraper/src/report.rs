use std::path::PathBuf;

/// What happened to a game's image during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The image was downloaded and written to `path`.
    Downloaded { path: PathBuf },
    /// The catalog had no thumbnail or image URL for the game.
    NoImage,
    /// The download or the write failed. The record is still exported.
    Failed { reason: String },
}

/// A single exported game and its image outcome.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: String,
    pub name: String,
    pub outcome: ItemOutcome,
}

/// Collects per-game results for a run.
#[derive(Debug, Default)]
pub struct FetchLog {
    entries: Vec<LogEntry>,
    skipped_without_id: usize,
}

impl FetchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Count a collection item that was dropped for lacking an id.
    pub fn skip_without_id(&mut self) {
        self.skipped_without_id += 1;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries whose image could not be fetched.
    pub fn failures(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ItemOutcome::Failed { .. }))
    }

    pub fn summary(&self) -> LogSummary {
        let mut summary = LogSummary {
            total_records: self.entries.len(),
            skipped_without_id: self.skipped_without_id,
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.outcome {
                ItemOutcome::Downloaded { .. } => summary.downloaded += 1,
                ItemOutcome::NoImage => summary.without_image += 1,
                ItemOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub total_records: usize,
    pub downloaded: usize,
    pub without_image: usize,
    pub failed: usize,
    pub skipped_without_id: usize,
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
