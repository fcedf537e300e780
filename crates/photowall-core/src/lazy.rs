//! Deferred image assignment.
//!
//! When `lazy_load` is on, items are created with `pending_src` instead of
//! an assigned image. Polling reports each pending item exactly once, as
//! soon as its bounding box enters the viewport expanded by
//! `lazy_load_threshold` on the main axis. Pending state lives on the
//! items themselves, so a layout rebuild discards and restarts the
//! tracking for free.

use crate::engine::Wall;

/// A pending image whose item entered the tracked margin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub lane: usize,
    pub slot: usize,
    /// Image URL to assign
    pub src: String,
}

/// Collect pending items inside the lazy-load margin, marking each as
/// assigned so it is reported once.
pub fn poll(wall: &mut Wall) -> Vec<PendingImage> {
    if !wall.config().lazy_load {
        return Vec::new();
    }

    let threshold = wall.config().lazy_load_threshold as f64;
    let item_main = wall.plan().item_main;
    let viewport_main = wall.plan().viewport_main;
    let translations: Vec<f64> = (0..wall.lane_count())
        .map(|i| wall.lane_translation(i))
        .collect();

    let mut ready = Vec::new();
    for (li, lane) in wall.lanes_mut().iter_mut().enumerate() {
        for (si, item) in lane.items.iter_mut().enumerate() {
            if item.pending_src.is_none() {
                continue;
            }
            let abs = translations[li] + item.main_pos;
            let in_margin = abs + item_main > -threshold && abs < viewport_main + threshold;
            if in_margin {
                if let Some(src) = item.pending_src.take() {
                    ready.push(PendingImage { lane: li, slot: si, src });
                }
            }
        }
    }

    if !ready.is_empty() {
        tracing::debug!(count = ready.len(), "lazy-load margin reached");
    }
    ready
}

/// Assign every pending image immediately.
///
/// Fallback for hosts without visibility tracking, and useful when the
/// wall is exported as a static snapshot.
pub fn load_all(wall: &mut Wall) -> Vec<PendingImage> {
    let mut ready = Vec::new();
    for (li, lane) in wall.lanes_mut().iter_mut().enumerate() {
        for (si, item) in lane.items.iter_mut().enumerate() {
            if let Some(src) = item.pending_src.take() {
                ready.push(PendingImage { lane: li, slot: si, src });
            }
        }
    }
    ready
}
