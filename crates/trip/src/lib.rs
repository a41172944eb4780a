pub mod focus;
pub mod loader;
pub mod model;

pub use focus::*;
pub use loader::*;
pub use model::*;
