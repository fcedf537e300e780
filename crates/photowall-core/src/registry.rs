//! Instance registry and command dispatch.
//!
//! Binding a wall returns an opaque [`WallHandle`]; the registry owns the
//! instance map and routes [`Command`]s to it. Misuse (unknown handle,
//! empty photo list) is reported as a warning and never panics: the
//! binding surface always returns normally.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::config::WallOptions;
use crate::engine::Wall;
use crate::layout::Viewport;

/// Opaque identity of a bound wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallHandle(Uuid);

/// Lifecycle commands dispatched through the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Refresh,
    Destroy,
}

/// Owns every bound wall, keyed by handle
#[derive(Default)]
pub struct WallRegistry {
    walls: HashMap<WallHandle, Wall>,
}

impl WallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve options over the defaults snapshot, validate them and
    /// create a running wall.
    ///
    /// An empty photo list aborts the bind with a warning and no
    /// instance; the caller may re-bind with corrected input.
    pub fn bind(&mut self, options: WallOptions, viewport: Viewport) -> Option<WallHandle> {
        self.bind_with_rng(options, viewport, SmallRng::from_os_rng())
    }

    /// `bind` with a caller-supplied RNG, for deterministic layouts
    pub fn bind_with_rng(
        &mut self,
        options: WallOptions,
        viewport: Viewport,
        rng: SmallRng,
    ) -> Option<WallHandle> {
        let config = options.resolve();
        if config.data.is_empty() {
            tracing::warn!("photowall: data must be a non-empty photo list");
            return None;
        }

        let mut wall = Wall::new(config, viewport, rng);
        wall.resume();
        let handle = WallHandle(wall.id());
        self.walls.insert(handle, wall);
        Some(handle)
    }

    /// Dispatch a lifecycle command to a bound wall.
    ///
    /// Unknown handles (including already-destroyed walls) produce a
    /// warning and no state change.
    pub fn call(&mut self, handle: WallHandle, command: Command) {
        if command == Command::Destroy {
            match self.walls.remove(&handle) {
                Some(mut wall) => wall.stop(),
                None => tracing::warn!("photowall: cannot call {:?} before initialization", command),
            }
            return;
        }

        match self.walls.get_mut(&handle) {
            Some(wall) => match command {
                Command::Pause => wall.pause(),
                Command::Resume => wall.resume(),
                Command::Refresh => wall.refresh(),
                Command::Destroy => unreachable!("handled above"),
            },
            None => tracing::warn!("photowall: cannot call {:?} before initialization", command),
        }
    }

    pub fn get(&self, handle: WallHandle) -> Option<&Wall> {
        self.walls.get(&handle)
    }

    pub fn get_mut(&mut self, handle: WallHandle) -> Option<&mut Wall> {
        self.walls.get_mut(&handle)
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WallState;
    use crate::photo::PhotoRecord;

    fn options_with_data() -> WallOptions {
        WallOptions {
            data: Some(vec![PhotoRecord {
                title: "a".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_bind_starts_running() {
        let mut registry = WallRegistry::new();
        let handle = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();
        assert_eq!(registry.get(handle).unwrap().state(), WallState::Running);
    }

    #[test]
    fn test_bind_empty_data_aborts() {
        let mut registry = WallRegistry::new();
        let handle = registry.bind(WallOptions::default(), Viewport::new(800, 600));
        assert!(handle.is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_command_dispatch() {
        let mut registry = WallRegistry::new();
        let handle = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();

        registry.call(handle, Command::Pause);
        assert_eq!(registry.get(handle).unwrap().state(), WallState::Paused);
        registry.call(handle, Command::Resume);
        assert_eq!(registry.get(handle).unwrap().state(), WallState::Running);
    }

    #[test]
    fn test_call_after_destroy_warns_not_crashes() {
        let mut registry = WallRegistry::new();
        let handle = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();

        registry.call(handle, Command::Destroy);
        assert!(registry.is_empty());

        // misuse: only a warning, no panic, no state
        registry.call(handle, Command::Pause);
        assert!(registry.get(handle).is_none());
    }

    #[test]
    fn test_instances_are_independent() {
        let mut registry = WallRegistry::new();
        let a = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();
        let b = registry
            .bind(options_with_data(), Viewport::new(400, 300))
            .unwrap();
        assert_ne!(a, b);

        registry.call(a, Command::Pause);
        assert_eq!(registry.get(a).unwrap().state(), WallState::Paused);
        assert_eq!(registry.get(b).unwrap().state(), WallState::Running);
        assert_ne!(
            registry.get(a).unwrap().lane_count(),
            registry.get(b).unwrap().lane_count()
        );
    }

    #[test]
    fn test_rebind_after_destroy_creates_fresh_instance() {
        let mut registry = WallRegistry::new();
        let first = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();
        registry.call(first, Command::Destroy);

        let second = registry
            .bind(options_with_data(), Viewport::new(800, 600))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(registry.len(), 1);
    }
}
