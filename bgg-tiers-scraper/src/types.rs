use serde::{Deserialize, Serialize};

/// Display name used when the catalog returns an item without one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A single entry from a BoardGameGeek collection response.
///
/// Every field is optional on the wire; use the accessors to resolve defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
}

impl CollectionItem {
    /// The identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    /// The display name, falling back to [`UNKNOWN_NAME`].
    pub fn display_name(&self) -> &str {
        present(&self.name).unwrap_or(UNKNOWN_NAME)
    }

    /// URL to download: the thumbnail, or the full image when there is no thumbnail.
    pub fn image_url(&self) -> Option<&str> {
        present(&self.thumbnail).or_else(|| present(&self.image))
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// One manifest entry, in the shape the frontend's `Game` type expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    /// Site-relative image path (`/games/{id}.jpg`), present even if the
    /// download failed.
    pub image: String,
}

impl GameRecord {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            image: crate::media::public_image_path(id),
        }
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
