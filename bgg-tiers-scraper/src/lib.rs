pub mod client;
pub mod collection;
pub mod credentials;
pub mod error;
pub mod export;
pub mod fetch;
pub mod media;
pub mod report;
pub mod types;

pub use client::{BggClient, CollectionSource, ImageSource};
pub use credentials::{
    CredentialLayers, CredentialSource, CredentialSources, Credentials, config_path,
    credential_sources, mask_value,
};
pub use error::ScrapeError;
pub use fetch::{FetchEvent, FetchOptions, FetchResult, run_fetch};
pub use report::{FetchLog, ItemOutcome, LogEntry, LogSummary};
pub use types::{CollectionItem, GameRecord};
