use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One entry of the photo list bound to the wall.
///
/// `title` and `subtitle` are untrusted text: they must always be rendered
/// as text, never interpreted as markup (see `markup::escape`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Display title shown on the hover mask
    #[serde(default)]
    pub title: String,
    /// Secondary line shown under the title
    #[serde(default)]
    pub subtitle: String,
    /// Link target opened when the item is activated
    #[serde(default)]
    pub url: String,
    /// Image URL (or local path) for the item background
    #[serde(default)]
    pub img: String,
}

/// TOML photo lists use a `[[photos]]` table array
#[derive(Debug, Deserialize)]
struct PhotoFile {
    #[serde(default)]
    photos: Vec<PhotoRecord>,
}

/// Load a photo list from a `.json` (bare array) or `.toml`
/// (`[[photos]]` tables) file.
pub fn load_photos(path: &Path) -> Result<Vec<PhotoRecord>> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        "toml" => {
            let file: PhotoFile = toml::from_str(&content)?;
            Ok(file.photos)
        }
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_array() {
        let dir = std::env::temp_dir().join("photowall-test-json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("photos.json");
        std::fs::write(
            &path,
            r#"[{"title":"A","subtitle":"a","url":"https://a","img":"https://a.jpg"}]"#,
        )
        .unwrap();

        let photos = load_photos(&path).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].title, "A");
    }

    #[test]
    fn test_load_toml_tables() {
        let dir = std::env::temp_dir().join("photowall-test-toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("photos.toml");
        std::fs::write(
            &path,
            "[[photos]]\ntitle = \"B\"\nimg = \"https://b.jpg\"\n",
        )
        .unwrap();

        let photos = load_photos(&path).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].title, "B");
        assert!(photos[0].subtitle.is_empty());
    }

    #[test]
    fn test_unknown_extension() {
        let dir = std::env::temp_dir().join("photowall-test-ext");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("photos.csv");
        std::fs::write(&path, "x").unwrap();

        assert!(matches!(
            load_photos(&path),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
