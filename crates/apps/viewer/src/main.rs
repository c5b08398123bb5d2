mod config;
mod report;

use std::path::{Path, PathBuf};

use catalog::{DirectoryKey, ProjectDirectory, RegionCatalog};
use clap::{Parser, Subcommand};
use layers::{Projection, SurfaceStatus, SvgSurface, project};
use scene::{Panel, Selection, SelectionState, SurfaceEvent};
use streaming::{
    FilesystemGeometrySource, GeometryLoader, GeometrySource, HttpGeometrySource, LoadProgress,
    RegionLoadState,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigFlags, GeometryLocation};

#[derive(Parser, Debug)]
#[command(author, version, about = "Map of native-flora outreach projects by Argentine province")]
struct Args {
    /// Base URL of the per-province GeoJSON documents
    #[arg(long, global = true)]
    geojson_url: Option<String>,

    /// Read GeoJSON documents from a local directory instead of HTTP
    #[arg(long, global = true)]
    geojson_dir: Option<PathBuf>,

    /// Projects directory (JSON). Defaults to the built-in list
    #[arg(long, global = true)]
    projects: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every province, project the geometry and write the map as SVG
    Render {
        /// Output file
        #[arg(long, default_value = "map.svg")]
        out: PathBuf,

        /// Retry rounds for provinces that failed to load
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Province to select (catalog id or display name)
        #[arg(long, conflicts_with = "country")]
        select: Option<String>,

        /// Select the whole-country marker
        #[arg(long)]
        country: bool,

        /// Province to draw as hovered
        #[arg(long)]
        hover: Option<String>,

        /// Max concurrent downloads
        #[arg(long)]
        max_in_flight: Option<usize>,

        /// Download one province at a time
        #[arg(long, conflicts_with = "max_in_flight")]
        sequential: bool,
    },

    /// Print the projects for a province, or nation-wide ones
    Projects {
        /// Province (catalog id or display name); omit for national projects
        province: Option<String>,
    },

    /// List the province catalog
    Regions,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let catalog = RegionCatalog::argentina();

    match args.command {
        Command::Render {
            out,
            retries,
            select,
            country,
            hover,
            max_in_flight,
            sequential,
        } => {
            let config = AppConfig::from_env(ConfigFlags {
                geojson_url: args.geojson_url,
                geojson_dir: args.geojson_dir,
                projects: args.projects,
                max_in_flight,
                sequential,
            })?;
            let mut interaction = SelectionState::new();
            if let Some(arg) = &hover {
                interaction.apply(&SurfaceEvent::HoverEnter(report::resolve_region(
                    &catalog, arg,
                )?));
            }
            if let Some(arg) = &select {
                interaction.apply(&SurfaceEvent::Select(report::resolve_region(&catalog, arg)?));
            }
            if country {
                interaction.apply(&SurfaceEvent::SelectCountry);
            }
            render(&config, &catalog, &out, retries, &interaction).await?
        }
        Command::Projects { province } => {
            let config = AppConfig::from_env(ConfigFlags {
                projects: args.projects,
                ..ConfigFlags::default()
            })?;
            let directory = load_directory(config.projects.as_deref()).await?;
            let selection = match province {
                Some(arg) => Selection::Region(report::resolve_region(&catalog, &arg)?),
                None => Selection::Country,
            };
            print!("{}", Panel::build(&selection, &catalog, &directory));
        }
        Command::Regions => {
            let config = AppConfig::from_env(ConfigFlags {
                projects: args.projects,
                ..ConfigFlags::default()
            })?;
            let directory = load_directory(config.projects.as_deref()).await?;
            for region in catalog.iter() {
                let count = directory
                    .projects_for(DirectoryKey::Province(&region.display_name))
                    .len();
                println!(
                    "{:<18} {:<20} {count} projects",
                    region.id, region.display_name
                );
            }
        }
    }

    Ok(())
}

async fn render(
    config: &AppConfig,
    catalog: &RegionCatalog,
    out: &Path,
    retries: u32,
    interaction: &SelectionState,
) -> Result<(), Box<dyn std::error::Error>> {
    let directory = load_directory(config.projects.as_deref()).await?;

    let source: Box<dyn GeometrySource> = match &config.geometry {
        GeometryLocation::Http(url) => Box::new(HttpGeometrySource::new(url.clone())),
        GeometryLocation::Directory(dir) => Box::new(FilesystemGeometrySource::new(dir)),
    };
    let loader = GeometryLoader::new(source).with_concurrency(config.concurrency);
    let map = draw_map(&loader, catalog, retries, interaction, out).await?;
    for warning in &map.warnings {
        warn!("{warning}");
    }
    info!(
        "wrote {} ({} regions drawn)",
        out.display(),
        map.projection.paths.len()
    );

    for line in report::region_lines(catalog, &map.state) {
        println!("{line}");
    }
    let panel = Panel::build(interaction.selection(), catalog, &directory);
    if panel.is_open() {
        println!();
        print!("{panel}");
    }

    Ok(())
}

/// What one `draw_map` run produced.
struct DrawnMap {
    state: RegionLoadState,
    projection: Projection,
    /// User-facing partial-failure messages, in the order they were raised.
    warnings: Vec<String>,
}

/// Loads every region, runs up to `retries` retry rounds, projects the
/// result and writes the SVG to `out`.
///
/// When nothing loads the SVG carries only the error message and the load
/// error is returned.
async fn draw_map<S: GeometrySource>(
    loader: &GeometryLoader<S>,
    catalog: &RegionCatalog,
    retries: u32,
    interaction: &SelectionState,
    out: &Path,
) -> Result<DrawnMap, Box<dyn std::error::Error>> {
    let mut state = RegionLoadState::new();
    let mut warnings = Vec::new();

    let report = match loader.load_all(catalog, &mut state, log_progress).await {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            let empty = project(&Default::default(), None);
            let status = SurfaceStatus::from_outcomes(state.outcomes());
            let svg = SvgSurface::new(&empty, catalog).render(&status, interaction);
            tokio::fs::write(out, svg).await?;
            return Err(err.into());
        }
    };
    warnings.extend(report.warning(catalog));

    for round in 1..=retries {
        if state.failed_ids().is_empty() {
            break;
        }
        let retry = loader.retry_failed(&mut state, log_progress).await;
        if retry.changed() {
            info!(
                "reintento {round}: Se cargaron {} provincias adicionales",
                retry.reloaded.len()
            );
        } else {
            warn!("reintento {round}: No se pudieron cargar las provincias faltantes");
        }
        warnings.extend(retry.warning(catalog));
    }

    let projection = project(state.documents(), catalog.distinguished());
    for (id, issue) in &projection.issues {
        warn!("{}: skipped unusable feature ({issue})", catalog.display_name(id));
    }
    if let Some(bounds) = &projection.bounds {
        info!(
            "map bounds x=[{}, {}] y=[{}, {}], frame {}",
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y,
            projection.view_frame()
        );
    }

    let status = SurfaceStatus::from_outcomes(state.outcomes());
    let svg = SvgSurface::new(&projection, catalog).render(&status, interaction);
    tokio::fs::write(out, svg).await?;

    Ok(DrawnMap {
        state,
        projection,
        warnings,
    })
}

fn log_progress(progress: LoadProgress) {
    debug!(
        "loading map: {}/{} ({}%)",
        progress.settled,
        progress.total,
        progress.percent()
    );
}

/// Missing files are an error; a malformed one falls back to an empty directory.
async fn load_directory(path: Option<&Path>) -> Result<ProjectDirectory, std::io::Error> {
    match path {
        None => Ok(ProjectDirectory::builtin()),
        Some(path) => {
            let payload = tokio::fs::read_to_string(path).await?;
            let directory = ProjectDirectory::load_or_empty(&payload);
            info!(
                "loaded {} projects from {}",
                directory.project_count(),
                path.display()
            );
            Ok(directory)
        }
    }
}
