use foundation::RegionId;

/// What the detail panel is open for.
///
/// A region and the whole-country marker are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Region(RegionId),
    Country,
}

/// Interaction events raised by the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    HoverEnter(RegionId),
    HoverLeave(RegionId),
    Select(RegionId),
    SelectCountry,
    CountryHoverEnter,
    CountryHoverLeave,
    ClosePanel,
}

/// Hover and selection state for the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selection: Selection,
    hovered: Option<RegionId>,
    country_hovered: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hovered(&self) -> Option<&RegionId> {
        self.hovered.as_ref()
    }

    pub fn selected_region(&self) -> Option<&RegionId> {
        match &self.selection {
            Selection::Region(id) => Some(id),
            _ => None,
        }
    }

    pub fn country_selected(&self) -> bool {
        self.selection == Selection::Country
    }

    /// Hovered or selected regions are drawn with the active style.
    pub fn is_region_active(&self, id: &RegionId) -> bool {
        self.hovered.as_ref() == Some(id) || self.selected_region() == Some(id)
    }

    pub fn is_country_active(&self) -> bool {
        self.country_selected() || self.country_hovered
    }

    /// Applies `event`. Returns `true` if the state changed.
    ///
    /// Selecting the current target again clears it.
    pub fn apply(&mut self, event: &SurfaceEvent) -> bool {
        let before = self.clone();
        match event {
            SurfaceEvent::HoverEnter(id) => self.hovered = Some(id.clone()),
            SurfaceEvent::HoverLeave(id) => {
                if self.hovered.as_ref() == Some(id) {
                    self.hovered = None;
                }
            }
            SurfaceEvent::Select(id) => {
                self.selection = if self.selected_region() == Some(id) {
                    Selection::None
                } else {
                    Selection::Region(id.clone())
                };
            }
            SurfaceEvent::SelectCountry => {
                self.selection = if self.country_selected() {
                    Selection::None
                } else {
                    Selection::Country
                };
            }
            SurfaceEvent::CountryHoverEnter => self.country_hovered = true,
            SurfaceEvent::CountryHoverLeave => self.country_hovered = false,
            SurfaceEvent::ClosePanel => self.selection = Selection::None,
        }
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::{Selection, SelectionState, SurfaceEvent};
    use foundation::RegionId;

    fn id(s: &str) -> RegionId {
        RegionId::new(s)
    }

    #[test]
    fn selecting_a_region_clears_the_country_and_back() {
        let mut s = SelectionState::new();
        assert!(s.apply(&SurfaceEvent::SelectCountry));
        assert!(s.country_selected());

        assert!(s.apply(&SurfaceEvent::Select(id("SALTA"))));
        assert_eq!(s.selection(), &Selection::Region(id("SALTA")));
        assert!(!s.country_selected());

        assert!(s.apply(&SurfaceEvent::SelectCountry));
        assert_eq!(s.selection(), &Selection::Country);
        assert!(s.selected_region().is_none());
    }

    #[test]
    fn reselecting_toggles_off() {
        let mut s = SelectionState::new();
        s.apply(&SurfaceEvent::Select(id("JUJUY")));
        assert!(s.apply(&SurfaceEvent::Select(id("JUJUY"))));
        assert_eq!(s.selection(), &Selection::None);

        s.apply(&SurfaceEvent::SelectCountry);
        s.apply(&SurfaceEvent::SelectCountry);
        assert_eq!(s.selection(), &Selection::None);
    }

    #[test]
    fn switching_regions_keeps_a_single_selection() {
        let mut s = SelectionState::new();
        s.apply(&SurfaceEvent::Select(id("A")));
        s.apply(&SurfaceEvent::Select(id("B")));
        assert_eq!(s.selected_region(), Some(&id("B")));
        assert!(!s.is_region_active(&id("A")));
    }

    #[test]
    fn hover_marks_region_active_until_it_leaves() {
        let mut s = SelectionState::new();
        s.apply(&SurfaceEvent::HoverEnter(id("A")));
        assert!(s.is_region_active(&id("A")));
        // A stale leave for another region does not clear the hover.
        assert!(!s.apply(&SurfaceEvent::HoverLeave(id("B"))));
        assert!(s.apply(&SurfaceEvent::HoverLeave(id("A"))));
        assert!(!s.is_region_active(&id("A")));
    }

    #[test]
    fn country_hover_and_close_panel() {
        let mut s = SelectionState::new();
        s.apply(&SurfaceEvent::CountryHoverEnter);
        assert!(s.is_country_active());
        s.apply(&SurfaceEvent::CountryHoverLeave);
        assert!(!s.is_country_active());

        s.apply(&SurfaceEvent::Select(id("A")));
        assert!(s.apply(&SurfaceEvent::ClosePanel));
        assert_eq!(s.selection(), &Selection::None);
        assert!(!s.apply(&SurfaceEvent::ClosePanel));
    }
}
