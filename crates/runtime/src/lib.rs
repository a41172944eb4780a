pub mod event_bus;
pub mod pass;

pub use event_bus::*;
pub use pass::*;
