use std::path::PathBuf;

use streaming::{Concurrency, DEFAULT_GEOJSON_BASE_URL};

pub const ENV_GEOJSON_URL: &str = "ATLAS_GEOJSON_URL";
pub const ENV_GEOJSON_DIR: &str = "ATLAS_GEOJSON_DIR";
pub const ENV_PROJECTS: &str = "ATLAS_PROJECTS";
pub const ENV_MAX_IN_FLIGHT: &str = "ATLAS_MAX_IN_FLIGHT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryLocation {
    Http(String),
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub geometry: GeometryLocation,
    /// `None` means the built-in project list.
    pub projects: Option<PathBuf>,
    pub concurrency: Concurrency,
}

/// Values given on the command line; each overrides its environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub geojson_url: Option<String>,
    pub geojson_dir: Option<PathBuf>,
    pub projects: Option<PathBuf>,
    pub max_in_flight: Option<usize>,
    pub sequential: bool,
}

impl AppConfig {
    pub fn from_env(flags: ConfigFlags) -> Result<Self, String> {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// Flags win over environment variables, which win over defaults. A
    /// local directory (flag or env) wins over any URL.
    pub fn resolve(
        flags: ConfigFlags,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let dir = flags
            .geojson_dir
            .or_else(|| env(ENV_GEOJSON_DIR).filter(|s| !s.is_empty()).map(PathBuf::from));
        let geometry = match dir {
            Some(dir) => GeometryLocation::Directory(dir),
            None => GeometryLocation::Http(
                flags
                    .geojson_url
                    .or_else(|| env(ENV_GEOJSON_URL).filter(|s| !s.is_empty()))
                    .unwrap_or_else(|| DEFAULT_GEOJSON_BASE_URL.to_string()),
            ),
        };

        let projects = flags
            .projects
            .or_else(|| env(ENV_PROJECTS).filter(|s| !s.is_empty()).map(PathBuf::from));

        let concurrency = if flags.sequential {
            Concurrency::Sequential
        } else {
            let max_in_flight = match flags.max_in_flight {
                Some(n) => Some(n),
                None => env(ENV_MAX_IN_FLIGHT)
                    .map(|v| {
                        v.parse::<usize>()
                            .map_err(|_| format!("invalid {ENV_MAX_IN_FLIGHT}: {v}"))
                    })
                    .transpose()?,
            };
            match max_in_flight {
                Some(0) => return Err("max in flight must be at least 1".to_string()),
                Some(n) => Concurrency::Parallel { max_in_flight: n },
                None => Concurrency::default(),
            }
        };

        Ok(Self {
            geometry,
            projects,
            concurrency,
        })
    }
}
