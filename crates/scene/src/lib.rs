pub mod panel;
pub mod selection;

pub use panel::*;
pub use selection::*;
