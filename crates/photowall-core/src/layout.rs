//! Layout generation for the wall.
//!
//! Derives lane count, item sizes and initial randomized offsets from the
//! configuration and the current viewport, then materializes lane/item
//! collections. All randomness flows through the caller's RNG so layouts
//! are reproducible under a seeded generator.

use rand::Rng;

use crate::config::{Direction, WallConfig};
use crate::photo::PhotoRecord;

/// Host surface size in layout units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Lane arrangement derived from the scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Lanes are columns, main axis is Y
    Vertical,
    /// Lanes are rows, main axis is X
    Horizontal,
}

impl From<Direction> for Orientation {
    fn from(direction: Direction) -> Self {
        if direction.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Sizing decisions shared by every lane of a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePlan {
    pub orientation: Orientation,
    /// Number of lanes laid side by side on the cross axis
    pub lane_count: usize,
    /// Items per lane; one extra item guarantees seamless wrap coverage
    pub items_per_lane: usize,
    /// Item extent along the main (scroll) axis
    pub item_main: f64,
    /// Item extent along the cross axis
    pub item_cross: f64,
    /// Distance between consecutive lane origins on the cross axis
    pub lane_stride: f64,
    /// Wrap period: `(item_main + gap) * items_per_lane`
    pub total_len: f64,
    /// Viewport extent along the main axis
    pub viewport_main: f64,
}

impl LanePlan {
    /// Compute the plan for a configuration and viewport.
    ///
    /// Lane count is floor of the cross extent over the configured lane
    /// size, never below 1, so degenerate viewports still produce a wall.
    pub fn compute(config: &WallConfig, viewport: Viewport) -> Self {
        let gap = config.gap as f64;

        match Orientation::from(config.direction) {
            Orientation::Vertical => {
                let lane_count = ((viewport.width / config.cols_width.max(1)) as usize).max(1);
                let items_per_lane =
                    (viewport.height.div_ceil(config.item_height.max(1)) as usize) + 1;
                let item_cross =
                    ((viewport.width / lane_count as u32).saturating_sub(config.gap)).max(1) as f64;
                let lane_stride = (viewport.width as f64 / lane_count as f64).round();
                let item_main = config.item_height.max(1) as f64;

                Self {
                    orientation: Orientation::Vertical,
                    lane_count,
                    items_per_lane,
                    item_main,
                    item_cross,
                    lane_stride,
                    total_len: (item_main + gap) * items_per_lane as f64,
                    viewport_main: viewport.height as f64,
                }
            }
            Orientation::Horizontal => {
                let lane_count = ((viewport.height / config.item_height.max(1)) as usize).max(1);
                let items_per_lane =
                    (viewport.width.div_ceil(config.cols_width.max(1)) as usize) + 1;
                let item_cross =
                    ((viewport.height / lane_count as u32).saturating_sub(config.gap)).max(1) as f64;
                let lane_stride = (viewport.height as f64 / lane_count as f64).round();
                let item_main = config.cols_width.max(1) as f64;

                Self {
                    orientation: Orientation::Horizontal,
                    lane_count,
                    items_per_lane,
                    item_main,
                    item_cross,
                    lane_stride,
                    total_len: (item_main + gap) * items_per_lane as f64,
                    viewport_main: viewport.width as f64,
                }
            }
        }
    }
}

/// One rendered photo slot. The photo binding is fixed for the item's
/// lifetime; only `main_pos` moves (and wraps) after creation.
#[derive(Debug, Clone)]
pub struct Item {
    pub photo: PhotoRecord,
    /// Fixed position on the cross axis
    pub cross_pos: f64,
    /// Mutable position on the main axis, relative to the lane offset
    pub main_pos: f64,
    /// Image URL still waiting for lazy assignment
    pub pending_src: Option<String>,
}

/// One column (vertical) or row (horizontal) of items sharing a scroll
/// offset.
#[derive(Debug, Clone)]
pub struct Lane {
    pub index: usize,
    /// Per-lane speed multiplier; 1.0 unless `variable_speed` is on
    pub speed_mul: f64,
    /// Cumulative scroll offset (variable-speed mode)
    pub offset: f64,
    /// Excluded from advancement while hovered under stop-on-hover
    pub active: bool,
    pub items: Vec<Item>,
}

/// Materialize lanes and items for a plan.
///
/// Each lane gets a random initial phase in `[0, item_main)` so lanes are
/// not visually synchronized, and (when enabled) a speed multiplier in
/// `[1 - speed_variation, 1 + speed_variation]`. Photos are assigned from
/// a single counter over `data` modulo its length, lane-major.
pub fn build_lanes<R: Rng>(config: &WallConfig, plan: &LanePlan, rng: &mut R) -> Vec<Lane> {
    let gap = config.gap as f64;
    let pitch = plan.item_main + gap;
    let mut photo_index = 0usize;
    let mut lanes = Vec::with_capacity(plan.lane_count);

    for i in 0..plan.lane_count {
        let phase = rng.random_range(0.0..plan.item_main);
        let speed_mul = if config.variable_speed && config.speed_variation > 0.0 {
            1.0 - config.speed_variation + rng.random_range(0.0..config.speed_variation * 2.0)
        } else {
            1.0
        };

        let cross_pos = plan.lane_stride * i as f64 + gap / 2.0;
        let mut items = Vec::with_capacity(plan.items_per_lane);
        for j in 0..plan.items_per_lane {
            let photo = config.data[photo_index % config.data.len()].clone();
            photo_index += 1;

            let pending_src = if config.lazy_load && !photo.img.is_empty() {
                Some(photo.img.clone())
            } else {
                None
            };

            items.push(Item {
                photo,
                cross_pos,
                main_pos: phase + pitch * j as f64,
                pending_src,
            });
        }

        lanes.push(Lane {
            index: i,
            speed_mul,
            offset: 0.0,
            active: false,
            items,
        });
    }

    lanes
}
