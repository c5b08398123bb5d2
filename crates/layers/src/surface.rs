use std::collections::BTreeMap;
use std::fmt::Write as _;

use catalog::RegionCatalog;
use foundation::{RegionId, ViewFrame};
use scene::SelectionState;
use streaming::{LoadOutcome, LoadProgress};

use crate::marker::CountryMarker;
use crate::projector::Projection;

pub const BASE_FILL_COLOR: &str = "#68d070";
pub const ACTIVE_FILL_COLOR: &str = "#55b85f";
const STROKE_COLOR: &str = "#ffffff";

/// What the surface should show instead of (or along with) the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceStatus {
    Loading(LoadProgress),
    /// Blocking error; replaces the map entirely.
    Failed(String),
    Ready { failed: usize },
}

impl SurfaceStatus {
    /// Derives the status from per-region outcomes.
    pub fn from_outcomes(outcomes: &BTreeMap<RegionId, LoadOutcome>) -> Self {
        let total = outcomes.len();
        let settled = outcomes.values().filter(|o| o.is_settled()).count();
        if settled < total {
            return SurfaceStatus::Loading(LoadProgress::new(settled, total));
        }
        let failed = outcomes
            .values()
            .filter(|o| **o == LoadOutcome::Failed)
            .count();
        if total > 0 && failed == total {
            return SurfaceStatus::Failed(
                "No se pudieron cargar las provincias. Verificá tu conexión a Internet.".to_string(),
            );
        }
        SurfaceStatus::Ready { failed }
    }
}

/// Renders projected paths as a standalone SVG document.
///
/// Source data has Y growing north, so paths are drawn inside a
/// `scale(1,-1)` group and the viewBox is mirrored to match.
pub struct SvgSurface<'a> {
    projection: &'a Projection,
    catalog: &'a RegionCatalog,
}

impl<'a> SvgSurface<'a> {
    pub fn new(projection: &'a Projection, catalog: &'a RegionCatalog) -> Self {
        Self {
            projection,
            catalog,
        }
    }

    pub fn render(&self, status: &SurfaceStatus, interaction: &SelectionState) -> String {
        let frame = self.projection.view_frame();
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}" preserveAspectRatio="xMidYMid meet">"#,
            flipped_view_box(&frame)
        );

        match status {
            SurfaceStatus::Loading(progress) => {
                let message = format!("Cargando mapa... {}%", progress.percent());
                write_message(&mut out, &frame, &message);
            }
            SurfaceStatus::Failed(message) => write_message(&mut out, &frame, message),
            SurfaceStatus::Ready { failed } => {
                self.write_map(&mut out, interaction);
                if *failed > 0 {
                    let _ = writeln!(
                        out,
                        r#"  <text class="retry" data-action="retry-failed" x="{}" y="{}" font-size="{}" text-anchor="end">Recargar provincias ({failed})</text>"#,
                        frame.x + frame.width,
                        -frame.y,
                        frame.height * 0.03
                    );
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }

    fn write_map(&self, out: &mut String, interaction: &SelectionState) {
        out.push_str("  <g transform=\"scale(1,-1)\">\n");

        if let Some(bounds) = &self.projection.bounds {
            let marker =
                CountryMarker::place(bounds, self.projection.distinguished_bounds.as_ref());
            let fill = fill_for(interaction.is_country_active());
            let _ = writeln!(
                out,
                r#"    <circle class="country" data-action="select-country" cx="{}" cy="{}" r="{}" fill="{fill}" stroke="{STROKE_COLOR}" stroke-width="0.25" aria-pressed="{}"><title>Ver información general de Argentina</title></circle>"#,
                marker.cx,
                marker.cy,
                marker.r,
                interaction.country_selected()
            );
        }

        for (id, d) in &self.projection.paths {
            let active = interaction.is_region_active(id);
            let stroke_width = if active { "0.25" } else { "0.15" };
            let selected = interaction.selected_region() == Some(id);
            let _ = writeln!(
                out,
                r#"    <path data-region="{}" d="{d}" fill="{}" stroke="{STROKE_COLOR}" stroke-width="{stroke_width}" aria-pressed="{selected}"><title>Seleccionar provincia {}</title></path>"#,
                escape_xml(id.as_str()),
                fill_for(active),
                escape_xml(self.catalog.display_name(id))
            );
        }

        out.push_str("  </g>\n");
    }
}

fn fill_for(active: bool) -> &'static str {
    if active {
        ACTIVE_FILL_COLOR
    } else {
        BASE_FILL_COLOR
    }
}

/// The frame as seen after the `scale(1,-1)` flip.
fn flipped_view_box(frame: &ViewFrame) -> ViewFrame {
    ViewFrame {
        y: -(frame.y + frame.height),
        ..*frame
    }
}

fn write_message(out: &mut String, frame: &ViewFrame, message: &str) {
    let flipped = flipped_view_box(frame);
    let _ = writeln!(
        out,
        r#"  <text class="status" x="{}" y="{}" font-size="{}" text-anchor="middle">{}</text>"#,
        flipped.x + flipped.width / 2.0,
        flipped.y + flipped.height / 2.0,
        flipped.height * 0.04,
        escape_xml(message)
    );
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{ACTIVE_FILL_COLOR, BASE_FILL_COLOR, SurfaceStatus, SvgSurface, escape_xml};
    use crate::projector::project;
    use catalog::RegionCatalog;
    use formats::GeometryDocument;
    use foundation::RegionId;
    use scene::{SelectionState, SurfaceEvent};
    use std::collections::BTreeMap;
    use streaming::{LoadOutcome, LoadProgress};

    fn documents() -> BTreeMap<RegionId, GeometryDocument> {
        let square = GeometryDocument::from_geojson_str(
            r#"{"features":[{"geometry":{"type":"Polygon",
                "coordinates":[[[0,0],[10,0],[10,10],[0,10]]]}}]}"#,
        )
        .expect("document");
        let mut m = BTreeMap::new();
        m.insert(RegionId::new("SALTA"), square.clone());
        m.insert(RegionId::new("JUJUY"), square);
        m
    }

    #[test]
    fn status_follows_outcomes() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(RegionId::new("A"), LoadOutcome::Loaded);
        outcomes.insert(RegionId::new("B"), LoadOutcome::Pending);
        assert_eq!(
            SurfaceStatus::from_outcomes(&outcomes),
            SurfaceStatus::Loading(LoadProgress::new(1, 2))
        );

        outcomes.insert(RegionId::new("B"), LoadOutcome::Failed);
        assert_eq!(
            SurfaceStatus::from_outcomes(&outcomes),
            SurfaceStatus::Ready { failed: 1 }
        );

        outcomes.insert(RegionId::new("A"), LoadOutcome::Failed);
        assert!(matches!(
            SurfaceStatus::from_outcomes(&outcomes),
            SurfaceStatus::Failed(_)
        ));
    }

    #[test]
    fn renders_one_path_per_region_with_flipped_frame() {
        let catalog = RegionCatalog::argentina();
        let projection = project(&documents(), None);
        let svg = SvgSurface::new(&projection, &catalog)
            .render(&SurfaceStatus::Ready { failed: 0 }, &SelectionState::new());

        assert!(svg.contains(r#"viewBox="-0.5 -10.5 11 11""#), "{svg}");
        assert!(svg.contains(r#"<g transform="scale(1,-1)">"#));
        assert_eq!(svg.matches("<path ").count(), 2);
        assert!(svg.contains("Seleccionar provincia Salta"));
        assert!(svg.contains(r#"d="M 0,0 L 10,0 L 10,10 L 0,10 Z""#));
        assert!(svg.contains("<circle class=\"country\""));
        assert!(!svg.contains("retry-failed"));
    }

    #[test]
    fn active_regions_use_active_fill() {
        let catalog = RegionCatalog::argentina();
        let projection = project(&documents(), None);
        let mut interaction = SelectionState::new();
        interaction.apply(&SurfaceEvent::Select(RegionId::new("SALTA")));
        let svg = SvgSurface::new(&projection, &catalog)
            .render(&SurfaceStatus::Ready { failed: 2 }, &interaction);

        let salta = svg
            .lines()
            .find(|l| l.contains(r#"data-region="SALTA""#))
            .expect("salta path");
        assert!(salta.contains(ACTIVE_FILL_COLOR));
        assert!(salta.contains(r#"aria-pressed="true""#));
        let jujuy = svg
            .lines()
            .find(|l| l.contains(r#"data-region="JUJUY""#))
            .expect("jujuy path");
        assert!(jujuy.contains(BASE_FILL_COLOR));
        assert!(svg.contains("Recargar provincias (2)"));
    }

    #[test]
    fn failed_status_replaces_the_map() {
        let catalog = RegionCatalog::argentina();
        let projection = project(&BTreeMap::new(), None);
        let svg = SvgSurface::new(&projection, &catalog).render(
            &SurfaceStatus::Failed("sin conexión".to_string()),
            &SelectionState::new(),
        );
        assert!(!svg.contains("<path"));
        assert!(svg.contains("sin conexión"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
    }
}
