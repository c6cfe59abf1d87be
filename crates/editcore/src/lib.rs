pub mod buffer;
pub mod commands;
pub mod controller;
pub mod history;
pub mod motion;
pub mod selection;
pub mod transform;
pub mod typing;

pub use buffer::Buffer;
pub use commands::Command;
pub use controller::{Change, EditController, Origin};
pub use history::History;
pub use motion::Motion;
pub use selection::{Selection, SelectionTracker};
pub use transform::Transform;
