pub mod app;
pub mod event;
pub mod images;
pub mod input;
pub mod widgets;

pub use app::App;
