pub mod loader;
pub mod outcome;
pub mod source;

pub use loader::*;
pub use outcome::*;
pub use source::*;
