use std::fs::File;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::client::ImageSource;
use crate::error::ScrapeError;

/// URL prefix the frontend serves downloaded images from.
pub const PUBLIC_IMAGE_PREFIX: &str = "/games";

/// File name of a game's image inside the images directory.
pub fn image_file_name(id: &str) -> String {
    format!("{}.jpg", id)
}

/// Site-relative path the frontend uses to reference a game's image.
pub fn public_image_path(id: &str) -> String {
    format!("{}/{}", PUBLIC_IMAGE_PREFIX, image_file_name(id))
}

/// Destination of a game's image inside `images_dir`.
///
/// The id must be a single normal path component, so the file always lands
/// directly inside `images_dir`.
pub fn image_path(images_dir: &Path, id: &str) -> Result<PathBuf, ScrapeError> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == id => {
            Ok(images_dir.join(image_file_name(id)))
        }
        _ => Err(ScrapeError::InvalidId(id.to_string())),
    }
}

/// Download `url` and write the bytes unchanged to `dest`.
///
/// Nothing is left at `dest` when the request or the write fails.
pub fn download_image(
    source: &dyn ImageSource,
    url: &str,
    dest: &Path,
) -> Result<PathBuf, ScrapeError> {
    let bytes = source.fetch_image(url)?;
    write_image(dest, &bytes, |p: &Path| File::create(p))?;
    log::debug!("Saved {} bytes to {}", bytes.len(), dest.display());
    Ok(dest.to_path_buf())
}

fn write_image<W, F>(dest: &Path, bytes: &[u8], create: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&Path) -> io::Result<W>,
{
    let mut file = create(dest)?;
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        if let Err(rm) = std::fs::remove_file(dest) {
            log::debug!("Could not remove partial {}: {}", dest.display(), rm);
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
