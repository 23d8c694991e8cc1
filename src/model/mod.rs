pub mod asset;
pub mod board;
pub mod comment;
pub mod config;
pub mod project;
pub mod task;
pub mod view;

pub use asset::*;
pub use board::*;
pub use comment::*;
pub use config::*;
pub use project::*;
pub use task::*;
pub use view::ViewState;
