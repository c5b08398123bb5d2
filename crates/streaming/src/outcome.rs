use std::collections::BTreeMap;

use formats::GeometryDocument;
use foundation::RegionId;

/// Per-region load lifecycle.
///
/// Pending → Loaded | Failed, then Failed → Loaded | Failed on retry only.
/// Loaded is terminal within a load cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Pending,
    Loaded,
    Failed,
}

impl LoadOutcome {
    pub fn is_settled(self) -> bool {
        !matches!(self, LoadOutcome::Pending)
    }

    pub fn can_transition_to(self, next: LoadOutcome) -> bool {
        matches!(
            (self, next),
            (LoadOutcome::Pending, LoadOutcome::Loaded)
                | (LoadOutcome::Pending, LoadOutcome::Failed)
                | (LoadOutcome::Failed, LoadOutcome::Loaded)
                | (LoadOutcome::Failed, LoadOutcome::Failed)
        )
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoadOutcome::Pending => "pending",
            LoadOutcome::Loaded => "loaded",
            LoadOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why a region is (or is not) on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionStatus<'a> {
    Pending,
    Failed(&'a str),
    LoadedEmpty,
    Loaded,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    UnknownRegion(RegionId),
    Invalid {
        region: RegionId,
        from: LoadOutcome,
        to: LoadOutcome,
    },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::UnknownRegion(id) => write!(f, "region not tracked: {id}"),
            TransitionError::Invalid { region, from, to } => {
                write!(f, "invalid transition for {region}: {from} -> {to}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Single owner of per-region outcomes and the documents that loaded.
///
/// Only the orchestrating flow mutates this (it is taken by `&mut` for the
/// duration of a load cycle or retry).
#[derive(Debug, Default)]
pub struct RegionLoadState {
    outcomes: BTreeMap<RegionId, LoadOutcome>,
    documents: BTreeMap<RegionId, GeometryDocument>,
    errors: BTreeMap<RegionId, String>,
}

impl RegionLoadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh cycle: every id becomes `Pending`, prior data is dropped.
    pub fn reset<'a>(&mut self, ids: impl IntoIterator<Item = &'a RegionId>) {
        self.outcomes = ids
            .into_iter()
            .map(|id| (id.clone(), LoadOutcome::Pending))
            .collect();
        self.documents.clear();
        self.errors.clear();
    }

    pub fn mark_loaded(
        &mut self,
        region: &RegionId,
        document: GeometryDocument,
    ) -> Result<(), TransitionError> {
        self.transition(region, LoadOutcome::Loaded)?;
        self.errors.remove(region);
        self.documents.insert(region.clone(), document);
        Ok(())
    }

    pub fn mark_failed(
        &mut self,
        region: &RegionId,
        reason: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.transition(region, LoadOutcome::Failed)?;
        self.errors.insert(region.clone(), reason.into());
        Ok(())
    }

    fn transition(&mut self, region: &RegionId, to: LoadOutcome) -> Result<(), TransitionError> {
        let current = self
            .outcomes
            .get_mut(region)
            .ok_or_else(|| TransitionError::UnknownRegion(region.clone()))?;
        if !current.can_transition_to(to) {
            return Err(TransitionError::Invalid {
                region: region.clone(),
                from: *current,
                to,
            });
        }
        *current = to;
        Ok(())
    }

    pub fn outcome(&self, region: &str) -> Option<LoadOutcome> {
        self.outcomes.get(region).copied()
    }

    pub fn outcomes(&self) -> &BTreeMap<RegionId, LoadOutcome> {
        &self.outcomes
    }

    pub fn documents(&self) -> &BTreeMap<RegionId, GeometryDocument> {
        &self.documents
    }

    pub fn last_error(&self, region: &str) -> Option<&str> {
        self.errors.get(region).map(String::as_str)
    }

    pub fn status(&self, region: &str) -> RegionStatus<'_> {
        match self.outcome(region) {
            None => RegionStatus::Unknown,
            Some(LoadOutcome::Pending) => RegionStatus::Pending,
            Some(LoadOutcome::Failed) => {
                RegionStatus::Failed(self.last_error(region).unwrap_or("unknown error"))
            }
            Some(LoadOutcome::Loaded) => match self.documents.get(region) {
                Some(doc) if doc.ring_count() > 0 => RegionStatus::Loaded,
                _ => RegionStatus::LoadedEmpty,
            },
        }
    }

    pub fn ids_with(&self, outcome: LoadOutcome) -> Vec<RegionId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| **o == outcome)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn loaded_ids(&self) -> Vec<RegionId> {
        self.ids_with(LoadOutcome::Loaded)
    }

    pub fn failed_ids(&self) -> Vec<RegionId> {
        self.ids_with(LoadOutcome::Failed)
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn settled_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_settled()).count()
    }

    pub fn is_settled(&self) -> bool {
        self.outcomes.values().all(|o| o.is_settled())
    }
}
