/// Errors that can occur while fetching and exporting a collection.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Could not load collection for user '{user}': {reason}")]
    CollectionUnavailable { user: String, reason: String },

    #[error(
        "BoardGameGeek is still preparing the collection for user '{0}'. Run again in a few seconds"
    )]
    CollectionQueued(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Game id {0:?} is not a plain file name")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unavailable(user: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CollectionUnavailable {
            user: user.into(),
            reason: reason.into(),
        }
    }
}
