pub mod builder;
pub mod host;
pub mod layer;
pub mod manager;
pub mod primitive;
pub mod recording;
pub mod split;
pub mod symbology;
pub mod wrap;

pub use builder::*;
pub use host::*;
pub use layer::*;
pub use manager::*;
pub use primitive::*;
pub use recording::*;
