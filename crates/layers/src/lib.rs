pub mod marker;
pub mod projector;
pub mod surface;

pub use marker::*;
pub use projector::*;
pub use surface::*;
