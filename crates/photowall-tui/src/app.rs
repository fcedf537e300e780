use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use photowall_core::{
    Viewport, Wall, WallHandle, WallOptions, WallRegistry, WallState,
};

use crate::event::ImageLoadResult;
use crate::images::PhotoCache;

/// Terminal front-end state around one bound wall.
pub struct App {
    registry: WallRegistry,
    handle: Option<WallHandle>,
    /// Item currently under the pointer
    pub hovered: Option<(usize, usize)>,
    /// Screen region the wall was last drawn into
    pub wall_area: Rect,
    /// Downloaded/decoded images shared by all items
    pub photos: PhotoCache,
    /// Whether the pointer was inside the wall at the last mouse event
    pointer_inside: bool,
    /// Resize waiting for the debounce window to elapse
    pending_resize: Option<(Viewport, Instant)>,
    debounce_ms: u64,
    pub should_quit: bool,
}

impl App {
    /// Bind a wall for the given options and initial viewport.
    ///
    /// Returns `None` (after a warning) when validation rejects the
    /// options, matching the non-fatal binding contract.
    pub fn bind(options: WallOptions, viewport: Viewport) -> Option<Self> {
        let mut registry = WallRegistry::new();
        let handle = registry.bind(options, viewport)?;
        let debounce_ms = registry
            .get(handle)
            .map(|w| w.config().debounce_delay_ms)
            .unwrap_or(150);

        Some(Self {
            registry,
            handle: Some(handle),
            hovered: None,
            pointer_inside: false,
            wall_area: Rect::default(),
            photos: PhotoCache::new(),
            pending_resize: None,
            debounce_ms,
            should_quit: false,
        })
    }

    pub fn wall(&self) -> Option<&Wall> {
        self.registry.get(self.handle?)
    }

    pub fn wall_mut(&mut self) -> Option<&mut Wall> {
        let handle = self.handle?;
        self.registry.get_mut(handle)
    }

    /// Map a terminal cell to wall coordinates, if inside the wall area
    fn wall_coords(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.wall_area;
        if column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        Some(((column - area.x) as f64, (row - area.y) as f64))
    }

    /// Pointer movement and clicks.
    ///
    /// Hover drives one of two mutually exclusive policies: pause the
    /// whole wall while the pointer is inside it, or freeze only the
    /// hovered lane.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let coords = self.wall_coords(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let hit = match (coords, self.wall()) {
                    (Some((x, y)), Some(wall)) => wall.hit_test(x, y),
                    _ => None,
                };
                self.apply_hover(coords.is_some(), hit);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let (Some((x, y)), Some(wall)) = (coords, self.wall()) {
                    if let Some((lane, slot)) = wall.hit_test(x, y) {
                        let url = wall
                            .photo(lane, slot)
                            .map(|p| p.url.clone())
                            .unwrap_or_default();
                        if !url.is_empty() {
                            tracing::debug!(%url, "opening item link");
                            if let Err(e) = open::that_detached(&url) {
                                tracing::warn!(%url, error = %e, "failed to open link");
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn apply_hover(&mut self, inside_wall: bool, hit: Option<(usize, usize)>) {
        if hit == self.hovered && inside_wall == self.pointer_inside {
            return;
        }
        let was_inside = self.pointer_inside;
        self.pointer_inside = inside_wall;
        self.hovered = if inside_wall { hit } else { None };

        let hovered_lane = self.hovered.map(|(lane, _)| lane);
        let Some(wall) = self.wall_mut() else {
            return;
        };

        if wall.config().pause_all_on_hover {
            // container-level enter/leave pauses and resumes the wall
            if inside_wall && !was_inside {
                wall.pause();
            } else if !inside_wall && was_inside {
                wall.resume();
            }
        } else {
            wall.set_active_lane(hovered_lane);
        }
    }

    /// Record a resize; the refresh happens after the debounce delay
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some((viewport, Instant::now()));
    }

    /// Advance the wall one scheduled frame and collect image URLs whose
    /// items entered the lazy-load margin (deduplicated per session).
    pub fn on_tick(&mut self, now: Instant) -> Vec<String> {
        if let Some((viewport, at)) = self.pending_resize {
            if now.saturating_duration_since(at).as_millis() as u64 >= self.debounce_ms {
                self.pending_resize = None;
                if let Some(wall) = self.wall_mut() {
                    wall.set_viewport(viewport);
                    wall.refresh();
                }
            }
        }

        let Some(wall) = self.wall_mut() else {
            return Vec::new();
        };
        wall.tick(now);
        let pending = wall.lazy_poll();

        let mut urls = Vec::new();
        for p in pending {
            if self.photos.start_loading(&p.src) {
                urls.push(p.src);
            }
        }
        urls
    }

    /// Image URLs for eager (non-lazy) walls, deduplicated
    pub fn eager_urls(&mut self) -> Vec<String> {
        let srcs: Vec<String> = match self.wall() {
            Some(wall) if !wall.config().lazy_load => wall
                .items()
                .map(|v| v.photo.img.clone())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        let mut urls = Vec::new();
        for src in srcs {
            if self.photos.start_loading(&src) {
                urls.push(src);
            }
        }
        urls
    }

    pub fn handle_image_result(&mut self, result: ImageLoadResult) {
        match result {
            ImageLoadResult::Success { url, image } => self.photos.insert_image(url, image),
            ImageLoadResult::Failure { url, error } => self.photos.insert_failure(url, error),
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Some(wall) = self.wall_mut() {
            match wall.state() {
                WallState::Running => wall.pause(),
                WallState::Paused | WallState::Stopped => wall.resume(),
            }
        }
    }

    pub fn refresh(&mut self) {
        if let Some(wall) = self.wall_mut() {
            wall.refresh();
        }
    }
}
