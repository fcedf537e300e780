//! Image download and terminal render cache.
//!
//! Each distinct image URL is downloaded at most once per session; the
//! decoded image is kept together with a lazily-built terminal protocol
//! so every wall item bound to the same photo shares one cache entry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use image::DynamicImage;
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol;

/// Get the global image picker instance with automatic protocol detection
pub fn get_image_picker() -> &'static Picker {
    static PICKER: OnceLock<Picker> = OnceLock::new();
    PICKER.get_or_init(|| {
        // Query terminal capabilities for the best protocol,
        // fall back to halfblocks if the query fails
        Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 16)))
    })
}

/// A cached image with its protocol render state
pub struct CachedImage {
    pub image: DynamicImage,
    /// Protocol-specific render data, built for `protocol_area`
    protocol: Option<Protocol>,
    protocol_area: Rect,
}

impl CachedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            protocol: None,
            protocol_area: Rect::default(),
        }
    }

    /// Get the protocol for rendering into `area`, (re)building it when
    /// the target cell size changed (e.g. after a layout refresh).
    pub fn protocol(&mut self, area: Rect) -> Option<&Protocol> {
        let size_changed =
            area.width != self.protocol_area.width || area.height != self.protocol_area.height;
        if self.protocol.is_none() || size_changed {
            let mut picker = *get_image_picker();
            self.protocol = picker
                .new_protocol(self.image.clone(), area, ratatui_image::Resize::Fit(None))
                .ok();
            self.protocol_area = area;
        }
        self.protocol.as_ref()
    }
}

/// Image loading state
pub enum ImageState {
    /// Image is being downloaded
    Loading,
    /// Image loaded and ready to render
    Loaded(CachedImage),
    /// Image failed to load
    Failed(String),
}

/// Per-session image cache keyed by URL
#[derive(Default)]
pub struct PhotoCache {
    entries: HashMap<String, ImageState>,
}

impl PhotoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a URL as in flight; returns false if it was already tracked
    pub fn start_loading(&mut self, url: &str) -> bool {
        if self.entries.contains_key(url) {
            return false;
        }
        self.entries.insert(url.to_string(), ImageState::Loading);
        true
    }

    pub fn insert_image(&mut self, url: String, image: DynamicImage) {
        self.entries
            .insert(url, ImageState::Loaded(CachedImage::new(image)));
    }

    pub fn insert_failure(&mut self, url: String, error: String) {
        tracing::debug!(%url, %error, "image load failed");
        self.entries.insert(url, ImageState::Failed(error));
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut ImageState> {
        self.entries.get_mut(url)
    }

    pub fn is_failed(&self, url: &str) -> bool {
        matches!(self.entries.get(url), Some(ImageState::Failed(_)))
    }

    pub fn loading_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, ImageState::Loading))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Load an image from a URL or a local path
pub async fn load_image(src: &str) -> Result<DynamicImage, String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        let bytes = download_bytes(src).await?;
        decode_image_bytes(&bytes)
    } else {
        let path = Path::new(src);
        image::open(path).map_err(|e| format!("Open failed: {}", e))
    }
}

/// Download image bytes over HTTP
async fn download_bytes(url: &str) -> Result<Vec<u8>, String> {
    let referer = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| format!("{}://{}/", u.scheme(), h)))
        .unwrap_or_default();

    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
        .timeout(std::time::Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| format!("Client error: {}", e))?;

    let response = client
        .get(url)
        .header("Accept", "image/png,image/jpeg,image/gif,image/*;q=0.8")
        .header("Referer", &referer)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| format!("Read error: {}", e))
}

/// Decode image bytes with format detection
fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, String> {
    if bytes.is_empty() {
        return Err("Empty data".to_string());
    }
    image::load_from_memory(bytes).map_err(|e| format!("Decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_loading_deduplicates() {
        let mut cache = PhotoCache::new();
        assert!(cache.start_loading("https://example.com/a.jpg"));
        assert!(!cache.start_loading("https://example.com/a.jpg"));
        assert_eq!(cache.loading_count(), 1);
    }

    #[test]
    fn test_failure_recorded() {
        let mut cache = PhotoCache::new();
        cache.start_loading("u");
        cache.insert_failure("u".to_string(), "HTTP 404".to_string());
        assert!(cache.is_failed("u"));
        assert_eq!(cache.loading_count(), 0);
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(decode_image_bytes(&[]).is_err());
    }
}
