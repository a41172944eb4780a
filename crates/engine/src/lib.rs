pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod state;
pub mod view;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use state::*;
pub use view::*;
