// Marknote library exports

pub mod app;
pub mod command_processor;
pub mod config;
pub mod keymap;
pub mod status_manager;
pub mod storage;
pub mod text_width;
pub mod ui;
pub mod ui_state;

pub use app::App;
pub use config::Config;
pub use storage::{Storage, Theme};
pub use ui_state::{Mode, UIState};
