use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::collection;
use crate::credentials::Credentials;
use crate::error::ScrapeError;
use crate::types::CollectionItem;

const BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
const EXCLUDED_SUBTYPE: &str = "boardgameexpansion";
const USER_AGENT: &str = concat!("bgg-tiers/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to every request, API and image alike.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can list a user's owned, non-expansion games.
pub trait CollectionSource {
    fn owned_collection(&self, user: &str) -> Result<Vec<CollectionItem>, ScrapeError>;
}

/// Something that can fetch image bytes by URL.
pub trait ImageSource {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

/// Blocking HTTP client for the BoardGameGeek XML API2.
pub struct BggClient {
    http: Client,
    creds: Credentials,
}

impl BggClient {
    pub fn new(creds: Credentials) -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, creds })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.creds
    }
}

/// Query parameters for an owned, non-expansion collection request.
pub fn collection_query(user: &str) -> Vec<(&'static str, String)> {
    vec![
        ("username", user.to_string()),
        ("own", "1".to_string()),
        ("excludesubtype", EXCLUDED_SUBTYPE.to_string()),
    ]
}

/// Map a non-200 collection response to an error. `body` is the response text.
pub fn check_collection_status(
    status: StatusCode,
    body: &str,
    user: &str,
) -> Result<(), ScrapeError> {
    if status == StatusCode::OK {
        return Ok(());
    }
    if status == StatusCode::ACCEPTED {
        return Err(ScrapeError::CollectionQueued(user.to_string()));
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ScrapeError::InvalidCredentials(
            "BoardGameGeek rejected the API token".to_string(),
        ));
    }
    Err(ScrapeError::ServerError {
        status: status.as_u16(),
        message: body.chars().take(200).collect(),
    })
}

impl CollectionSource for BggClient {
    fn owned_collection(&self, user: &str) -> Result<Vec<CollectionItem>, ScrapeError> {
        let url = format!("{}/collection", BASE_URL);
        log::debug!("GET {} (user: {})", url, user);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.creds.api_key)
            .query(&collection_query(user))
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        check_collection_status(status, &text, user)?;

        collection::parse_collection(text.as_bytes(), user)
    }
}

impl ImageSource for BggClient {
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let resp = self.http.get(url).send()?.error_for_status()?;
        let bytes = resp.bytes()?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
