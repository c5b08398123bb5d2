pub mod directory;
pub mod regions;

pub use directory::*;
pub use regions::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
    DuplicateRegion(String),
    EmptyRegionId,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "catalog parse error: {msg}"),
            CatalogError::DuplicateRegion(id) => write!(f, "duplicate region id: {id}"),
            CatalogError::EmptyRegionId => write!(f, "region id must not be empty"),
        }
    }
}

impl std::error::Error for CatalogError {}
