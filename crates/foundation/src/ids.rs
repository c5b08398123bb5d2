use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable catalog key of a region (e.g. `"CORDOBA"`).
///
/// Doubles as the geometry-source key: documents are located by this id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        RegionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        RegionId(s.to_string())
    }
}

impl From<String> for RegionId {
    fn from(s: String) -> Self {
        RegionId(s)
    }
}

#[cfg(test)]
mod tests {
    use super::RegionId;
    use std::collections::BTreeMap;

    #[test]
    fn lookup_by_str_through_borrow() {
        let mut m = BTreeMap::new();
        m.insert(RegionId::new("SALTA"), 1);
        assert_eq!(m.get("SALTA"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&RegionId::new("JUJUY")).unwrap();
        assert_eq!(json, "\"JUJUY\"");
    }
}
