use catalog::RegionCatalog;
use foundation::RegionId;
use streaming::{RegionLoadState, RegionStatus};

/// One line per catalog region explaining whether it is on the map.
pub fn region_lines(catalog: &RegionCatalog, state: &RegionLoadState) -> Vec<String> {
    catalog
        .iter()
        .map(|region| {
            let status = match state.status(region.id.as_str()) {
                RegionStatus::Loaded => "loaded".to_string(),
                RegionStatus::LoadedEmpty => "loaded (no geometry)".to_string(),
                RegionStatus::Pending => "pending".to_string(),
                RegionStatus::Failed(reason) => format!("failed: {reason}"),
                RegionStatus::Unknown => "not requested".to_string(),
            };
            format!("{:<14} {:<20} {status}", region.id, region.display_name)
        })
        .collect()
}

/// Accepts a catalog id (any case) or an exact display name.
pub fn resolve_region(catalog: &RegionCatalog, arg: &str) -> Result<RegionId, String> {
    let upper = arg.trim().to_uppercase();
    if let Some(region) = catalog.get(&upper) {
        return Ok(region.id.clone());
    }
    if let Some(region) = catalog.by_display_name(arg.trim()) {
        return Ok(region.id.clone());
    }
    Err(format!("unknown region: {arg}"))
}

#[cfg(test)]
mod tests {
    use super::{region_lines, resolve_region};
    use catalog::RegionCatalog;
    use foundation::RegionId;
    use streaming::RegionLoadState;

    #[test]
    fn resolves_ids_and_names() {
        let cat = RegionCatalog::argentina();
        assert_eq!(resolve_region(&cat, "salta"), Ok(RegionId::new("SALTA")));
        assert_eq!(resolve_region(&cat, "Río Negro"), Ok(RegionId::new("RIONEGRO")));
        assert!(resolve_region(&cat, "Montevideo").is_err());
    }

    #[test]
    fn every_region_is_explained() {
        let cat = RegionCatalog::argentina();
        let mut state = RegionLoadState::new();
        state.reset(cat.ids());
        state
            .mark_failed(&RegionId::new("CHACO"), "HTTP error: 404 Not Found")
            .expect("fail");
        let lines = region_lines(&cat, &state);
        assert_eq!(lines.len(), cat.len());
        let chaco = lines.iter().find(|l| l.starts_with("CHACO")).expect("chaco");
        assert!(chaco.ends_with("failed: HTTP error: 404 Not Found"));
        assert_eq!(
            lines.iter().filter(|l| l.ends_with("pending")).count(),
            cat.len() - 1
        );
    }
}
