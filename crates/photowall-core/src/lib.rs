pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod lazy;
pub mod markup;
pub mod photo;
pub mod registry;

pub use config::{defaults, set_defaults, update_defaults, Direction, WallConfig, WallOptions, WallWidth};
pub use engine::{ItemRect, ItemView, Wall, WallState};
pub use error::{Error, Result};
pub use layout::{Lane, LanePlan, Orientation, Viewport};
pub use lazy::PendingImage;
pub use photo::{load_photos, PhotoRecord};
pub use registry::{Command, WallHandle, WallRegistry};
