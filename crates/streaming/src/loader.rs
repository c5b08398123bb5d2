use catalog::RegionCatalog;
use foundation::RegionId;
use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, warn};

use crate::outcome::{LoadOutcome, RegionLoadState};
use crate::source::{FetchError, GeometrySource};

/// How many fetches may be outstanding at once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Concurrency {
    Sequential,
    Parallel { max_in_flight: usize },
}

impl Concurrency {
    pub fn max_in_flight(self) -> usize {
        match self {
            Concurrency::Sequential => 1,
            Concurrency::Parallel { max_in_flight } => max_in_flight.max(1),
        }
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Concurrency::Parallel { max_in_flight: 8 }
    }
}

/// Settled regions out of the batch size, for the current cycle only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    pub settled: usize,
    pub total: usize,
}

impl LoadProgress {
    pub fn new(settled: usize, total: usize) -> Self {
        Self { settled, total }
    }

    /// Rounded percentage; an empty batch counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.settled as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.settled >= self.total
    }
}

/// Result of one load cycle in which at least one region loaded.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Catalog order.
    pub loaded: Vec<RegionId>,
    /// Catalog order.
    pub failed: Vec<RegionId>,
    pub failures: Vec<FetchError>,
}

impl LoadReport {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Non-fatal summary naming the regions that are missing, if any.
    pub fn warning(&self, catalog: &RegionCatalog) -> Option<String> {
        missing_regions_warning(&self.failed, catalog)
    }
}

#[derive(Debug)]
pub enum LoadError {
    /// Nothing loaded in this cycle; nothing should be rendered.
    AllRegionsFailed { failures: Vec<FetchError> },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::AllRegionsFailed { failures } => {
                write!(
                    f,
                    "No se pudo cargar ninguna provincia ({} intentos)",
                    failures.len()
                )?;
                if let Some(first) = failures.first() {
                    write!(f, ": {first}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::AllRegionsFailed { failures } => {
                failures.first().map(|e| e as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// Outcome of retrying the failed subset.
#[derive(Debug, Default)]
pub struct RetryReport {
    pub reloaded: Vec<RegionId>,
    pub still_failed: Vec<RegionId>,
    pub failures: Vec<FetchError>,
}

impl RetryReport {
    pub fn attempted(&self) -> usize {
        self.reloaded.len() + self.still_failed.len()
    }

    /// Whether the aggregate changed and needs re-projecting.
    pub fn changed(&self) -> bool {
        !self.reloaded.is_empty()
    }

    pub fn warning(&self, catalog: &RegionCatalog) -> Option<String> {
        missing_regions_warning(&self.still_failed, catalog)
    }
}

fn missing_regions_warning(failed: &[RegionId], catalog: &RegionCatalog) -> Option<String> {
    if failed.is_empty() {
        return None;
    }
    let names: Vec<&str> = failed.iter().map(|id| catalog.display_name(id)).collect();
    let names = names.join(", ");
    Some(if failed.len() == 1 {
        format!("No se pudo cargar 1 provincia: {names}")
    } else {
        format!("No se pudieron cargar {} provincias: {names}", failed.len())
    })
}

/// Drives fetches for a catalog against a `GeometrySource`.
///
/// Every fetch in a batch is independent; a batch completes once every
/// region has settled, whichever order they finish in.
pub struct GeometryLoader<S> {
    source: S,
    concurrency: Concurrency,
}

impl<S: GeometrySource> GeometryLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency: Concurrency::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one load cycle over the whole catalog.
    ///
    /// `state` is reset first. Progress is reported once up front (0 settled)
    /// and after each settlement.
    pub async fn load_all(
        &self,
        catalog: &RegionCatalog,
        state: &mut RegionLoadState,
        mut on_progress: impl FnMut(LoadProgress),
    ) -> Result<LoadReport, LoadError> {
        let ids: Vec<RegionId> = catalog.ids().cloned().collect();
        state.reset(&ids);
        info!(
            "loading geometry for {} regions ({} in flight max)",
            ids.len(),
            self.concurrency.max_in_flight()
        );

        let failures = self.fetch_batch(&ids, state, &mut on_progress).await;

        let loaded: Vec<RegionId> = ids
            .iter()
            .filter(|id| state.outcome(id.as_str()) == Some(LoadOutcome::Loaded))
            .cloned()
            .collect();
        let failed: Vec<RegionId> = failures.iter().map(|e| e.region.clone()).collect();
        let failed = in_catalog_order(&ids, &failed);

        if !ids.is_empty() && loaded.is_empty() {
            warn!("load cycle failed: no region could be loaded");
            return Err(LoadError::AllRegionsFailed { failures });
        }

        info!(
            "load cycle complete: {} loaded, {} failed",
            loaded.len(),
            failed.len()
        );
        Ok(LoadReport {
            loaded,
            failed,
            failures,
        })
    }

    /// Re-attempts only the regions currently `Failed`, leaving loaded ones
    /// untouched. Progress counts against the retried subset.
    pub async fn retry_failed(
        &self,
        state: &mut RegionLoadState,
        mut on_progress: impl FnMut(LoadProgress),
    ) -> RetryReport {
        let ids = state.failed_ids();
        if ids.is_empty() {
            debug!("retry requested with no failed regions");
            return RetryReport::default();
        }
        info!("retrying {} failed regions", ids.len());

        let failures = self.fetch_batch(&ids, state, &mut on_progress).await;
        let still: Vec<RegionId> = failures.iter().map(|e| e.region.clone()).collect();
        let still_failed = in_catalog_order(&ids, &still);
        let reloaded: Vec<RegionId> = ids
            .iter()
            .filter(|id| !still_failed.contains(id))
            .cloned()
            .collect();

        if reloaded.is_empty() {
            warn!("retry recovered no regions");
        } else {
            info!("retry recovered {} regions", reloaded.len());
        }

        RetryReport {
            reloaded,
            still_failed,
            failures,
        }
    }

    async fn fetch_batch(
        &self,
        ids: &[RegionId],
        state: &mut RegionLoadState,
        on_progress: &mut impl FnMut(LoadProgress),
    ) -> Vec<FetchError> {
        let total = ids.len();
        let mut settled = 0;
        on_progress(LoadProgress::new(settled, total));

        let mut results = stream::iter(ids)
            .map(|id| async move { (id, self.source.fetch(id).await) })
            .buffer_unordered(self.concurrency.max_in_flight());

        let mut failures = Vec::new();
        while let Some((id, result)) = results.next().await {
            let applied = match result {
                Ok(document) => {
                    if !document.issues.is_empty() {
                        warn!(
                            "{id}: skipped {} unusable features",
                            document.issues.len()
                        );
                    }
                    debug!("{id}: loaded {} rings", document.ring_count());
                    state.mark_loaded(id, document)
                }
                Err(err) => {
                    warn!("{err}");
                    let applied = state.mark_failed(id, err.to_string());
                    failures.push(err);
                    applied
                }
            };
            if let Err(err) = applied {
                warn!("ignoring settlement: {err}");
            }
            settled += 1;
            on_progress(LoadProgress::new(settled, total));
        }

        failures
    }
}

fn in_catalog_order(order: &[RegionId], subset: &[RegionId]) -> Vec<RegionId> {
    order
        .iter()
        .filter(|id| subset.contains(id))
        .cloned()
        .collect()
}
