use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, error};

use crate::CatalogError;

/// Project list shipped with the binary.
pub const BUILTIN_PROJECTS_JSON: &str = include_str!("../assets/projects.json");

const EMAIL_FIELD: &str = "contacto";

// Display order for well-known fields; anything else sorts after these
// (alphabetically), with the email field always last.
const KNOWN_FIELDS: &[(&str, &str)] = &[
    ("instagram", "Instagram"),
    ("x", "X"),
    ("facebook", "Facebook"),
    ("web", "Web"),
    ("youtube", "YouTube"),
    ("tiktok", "TikTok"),
    ("linkedin", "LinkedIn"),
    ("threads", "Threads"),
    ("mastodon", "Mastodon"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMethod {
    pub label: String,
    pub value: String,
    /// Normalised `https://` link, or a `mailto:` target for email contacts.
    pub href: String,
}

impl ContactMethod {
    pub fn is_mailto(&self) -> bool {
        self.href.starts_with("mailto:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    pub contacts: Vec<ContactMethod>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
struct RawDirectory {
    #[serde(default)]
    provincial: BTreeMap<String, Vec<RawProject>>,
    #[serde(default)]
    national: Vec<RawProject>,
}

/// What the detail panel is showing projects for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKey<'a> {
    Province(&'a str),
    National,
}

/// Outreach projects by province display name, plus nation-wide ones.
///
/// Projects without any populated contact field never make it in here, and
/// provinces left without projects are dropped entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDirectory {
    provincial: BTreeMap<String, Vec<ProjectRecord>>,
    national: Vec<ProjectRecord>,
}

impl ProjectDirectory {
    pub fn from_json_str(payload: &str) -> Result<Self, CatalogError> {
        let raw: RawDirectory =
            serde_json::from_str(payload).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut provincial = BTreeMap::new();
        for (province, projects) in raw.provincial {
            let kept = filter_projects(projects);
            if kept.is_empty() {
                debug!("dropping province without usable projects: {province}");
                continue;
            }
            provincial.insert(province, kept);
        }

        Ok(Self {
            provincial,
            national: filter_projects(raw.national),
        })
    }

    /// Parses `payload`, falling back to an empty directory on error.
    pub fn load_or_empty(payload: &str) -> Self {
        match Self::from_json_str(payload) {
            Ok(dir) => dir,
            Err(err) => {
                error!("error loading projects configuration: {err}");
                Self::default()
            }
        }
    }

    pub fn builtin() -> Self {
        Self::load_or_empty(BUILTIN_PROJECTS_JSON)
    }

    pub fn projects_for(&self, key: DirectoryKey<'_>) -> &[ProjectRecord] {
        match key {
            DirectoryKey::National => &self.national,
            DirectoryKey::Province(name) => self
                .provincial
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    pub fn provinces(&self) -> impl Iterator<Item = &str> {
        self.provincial.keys().map(String::as_str)
    }

    pub fn project_count(&self) -> usize {
        self.national.len() + self.provincial.values().map(Vec::len).sum::<usize>()
    }
}

fn filter_projects(projects: Vec<RawProject>) -> Vec<ProjectRecord> {
    projects
        .into_iter()
        .filter_map(|raw| {
            let contacts = contact_methods(&raw.fields);
            if contacts.is_empty() {
                debug!("dropping project without contact fields: {}", raw.name);
                return None;
            }
            Some(ProjectRecord {
                name: raw.name,
                contacts,
            })
        })
        .collect()
}

fn contact_methods(fields: &BTreeMap<String, Option<String>>) -> Vec<ContactMethod> {
    let mut populated: Vec<(&str, &str)> = fields
        .iter()
        .filter_map(|(k, v)| {
            let v = v.as_deref()?;
            (!v.trim().is_empty()).then_some((k.as_str(), v))
        })
        .collect();
    // Stable sort keeps unknown keys in BTreeMap (alphabetical) order.
    populated.sort_by_key(|(k, _)| field_rank(k));

    populated
        .into_iter()
        .map(|(key, value)| {
            let href = if key == EMAIL_FIELD {
                format!("mailto:{}", value.trim())
            } else {
                normalize_url(value)
            };
            ContactMethod {
                label: field_label(key),
                value: value.to_string(),
                href,
            }
        })
        .collect()
}

fn field_rank(key: &str) -> usize {
    if key == EMAIL_FIELD {
        return KNOWN_FIELDS.len() + 1;
    }
    KNOWN_FIELDS
        .iter()
        .position(|(k, _)| *k == key)
        .unwrap_or(KNOWN_FIELDS.len())
}

fn field_label(key: &str) -> String {
    if key == EMAIL_FIELD {
        return "Contacto".to_string();
    }
    if let Some((_, label)) = KNOWN_FIELDS.iter().find(|(k, _)| *k == key) {
        return label.to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trims `value` and prefixes `https://` unless it already has a scheme.
pub fn normalize_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    format!("https://{trimmed}")
}
