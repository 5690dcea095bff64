//! Application state module

mod app_state;
mod entities;
mod forms;

pub use app_state::*;
pub use entities::*;
pub use forms::*;
