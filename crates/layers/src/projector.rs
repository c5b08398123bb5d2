use std::collections::BTreeMap;
use std::fmt::Write as _;

use formats::{GeometryDocument, GeometryIssue, Ring};
use foundation::{BoundingBox, BoundsAccumulator, DISPLAY_MARGIN, RegionId, ViewFrame};

/// Region id → flattened SVG path data (all rings of the region).
pub type PathDescriptor = BTreeMap<RegionId, String>;

/// Output of one projection pass over the loaded documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub paths: PathDescriptor,
    /// `None` until at least one coordinate has been seen.
    pub bounds: Option<BoundingBox>,
    pub distinguished_bounds: Option<BoundingBox>,
    /// Features dropped while decoding, per region.
    pub issues: Vec<(RegionId, GeometryIssue)>,
}

impl Projection {
    /// Data bounds with the display margin applied on every side.
    pub fn view_frame(&self) -> ViewFrame {
        self.bounds
            .map(|b| b.with_margin(DISPLAY_MARGIN))
            .unwrap_or_else(ViewFrame::placeholder)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Converts every loaded document into path data and folds all coordinates
/// into the global bounds (and the distinguished region's bounds).
///
/// Coordinates are copied verbatim: no axis flip, rounding or simplification.
/// The whole input is reprocessed on every call.
pub fn project(
    documents: &BTreeMap<RegionId, GeometryDocument>,
    distinguished: Option<&RegionId>,
) -> Projection {
    let mut paths = PathDescriptor::new();
    let mut bounds = BoundsAccumulator::new();
    let mut region_bounds = BoundsAccumulator::new();
    let mut issues = Vec::new();

    for (id, doc) in documents {
        let is_distinguished = distinguished == Some(id);
        let mut path = String::new();

        for feature in &doc.features {
            for ring in feature.geometry.rings() {
                for &[x, y] in ring {
                    bounds.include(x, y);
                    if is_distinguished {
                        region_bounds.include(x, y);
                    }
                }
                append_ring(&mut path, ring);
            }
        }

        issues.extend(doc.issues.iter().cloned().map(|issue| (id.clone(), issue)));
        if !path.is_empty() {
            paths.insert(id.clone(), path);
        }
    }

    Projection {
        paths,
        bounds: bounds.finish(),
        distinguished_bounds: region_bounds.finish(),
        issues,
    }
}

/// `M x0,y0 L x1,y1 ... Z`; empty rings emit nothing.
fn append_ring(path: &mut String, ring: &Ring) {
    let mut points = ring.iter();
    let Some([x0, y0]) = points.next() else {
        return;
    };
    // Writing to a String cannot fail.
    let _ = write!(path, "M {x0},{y0}");
    for [x, y] in points {
        let _ = write!(path, " L {x},{y}");
    }
    path.push_str(" Z");
}

#[cfg(test)]
mod tests {
    use super::project;
    use formats::GeometryDocument;
    use foundation::RegionId;
    use std::collections::BTreeMap;

    fn doc(payload: &str) -> GeometryDocument {
        GeometryDocument::from_geojson_str(payload).expect("document")
    }

    fn square() -> GeometryDocument {
        doc(r#"{"features":[{"geometry":{"type":"Polygon",
            "coordinates":[[[0,0],[10,0],[10,10],[0,10]]]}}]}"#)
    }

    fn two_rings() -> GeometryDocument {
        doc(r#"{"features":[{"geometry":{"type":"MultiPolygon","coordinates":[
            [[[2,2],[4,2],[4,4]]],
            [[[6.5,6],[8,6],[8,8.25]]]
        ]}}]}"#)
    }

    fn docs(entries: Vec<(&str, GeometryDocument)>) -> BTreeMap<RegionId, GeometryDocument> {
        entries
            .into_iter()
            .map(|(id, d)| (RegionId::new(id), d))
            .collect()
    }

    #[test]
    fn single_ring_path_syntax() {
        let p = project(&docs(vec![("A", square())]), None);
        assert_eq!(p.paths["A"], "M 0,0 L 10,0 L 10,10 L 0,10 Z");
    }

    #[test]
    fn rings_accumulate_in_source_order() {
        let p = project(&docs(vec![("B", two_rings())]), None);
        assert_eq!(
            p.paths["B"],
            "M 2,2 L 4,2 L 4,4 ZM 6.5,6 L 8,6 L 8,8.25 Z"
        );
    }

    #[test]
    fn bounds_cover_every_coordinate() {
        let input = docs(vec![("A", square()), ("B", two_rings())]);
        let p = project(&input, None);
        let b = p.bounds.expect("bounds");
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 10.0, 10.0));
        for d in input.values() {
            for f in &d.features {
                for ring in f.geometry.rings() {
                    for &[x, y] in ring {
                        assert!(b.contains(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn empty_document_has_no_path_entry() {
        let empty = doc(r#"{"type":"FeatureCollection","features":[]}"#);
        let p = project(&docs(vec![("A", empty), ("B", square())]), None);
        assert!(!p.paths.contains_key("A"));
        assert!(p.paths.contains_key("B"));
    }

    #[test]
    fn path_entry_exists_exactly_when_rings_are_drawable() {
        let hollow = doc(r#"{"features":[{"geometry":{"type":"Polygon","coordinates":[[]]}}]}"#);
        let regions = docs(vec![("A", hollow), ("B", square())]);
        let p = project(&regions, None);
        for (id, d) in &regions {
            assert_eq!(p.paths.contains_key(id), d.ring_count() > 0, "{id}");
        }
    }

    #[test]
    fn nothing_loaded_means_no_bounds() {
        let p = project(&BTreeMap::new(), None);
        assert!(p.is_empty());
        assert!(p.bounds.is_none());
        assert_eq!(p.view_frame().to_string(), "0 0 800 800");
    }

    #[test]
    fn distinguished_region_gets_its_own_bounds() {
        let input = docs(vec![("A", square()), ("B", two_rings())]);
        let b_id = RegionId::new("B");
        let p = project(&input, Some(&b_id));
        let rb = p.distinguished_bounds.expect("region bounds");
        assert_eq!((rb.min_x, rb.min_y, rb.max_x, rb.max_y), (2.0, 2.0, 8.0, 8.25));

        let missing = RegionId::new("Z");
        assert!(project(&input, Some(&missing)).distinguished_bounds.is_none());
    }

    #[test]
    fn projection_is_idempotent() {
        let input = docs(vec![("A", square()), ("B", two_rings())]);
        let first = project(&input, Some(&RegionId::new("A")));
        let second = project(&input, Some(&RegionId::new("A")));
        assert_eq!(first, second);
    }

    #[test]
    fn frame_adds_five_percent_each_side() {
        let p = project(&docs(vec![("A", square())]), None);
        let frame = p.view_frame();
        let b = p.bounds.expect("bounds");
        assert!((frame.width - 1.1 * b.width).abs() < 1e-12);
        assert!((frame.height - 1.1 * b.height).abs() < 1e-12);
        assert_eq!(frame.to_string(), "-0.5 -0.5 11 11");
    }

    #[test]
    fn decoding_issues_are_carried_through() {
        let with_point = doc(r#"{"features":[
            {"geometry":{"type":"Point","coordinates":[1,1]}},
            {"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}}
        ]}"#);
        let p = project(&docs(vec![("A", with_point)]), None);
        assert_eq!(p.issues.len(), 1);
        assert_eq!(p.issues[0].0.as_str(), "A");
        assert!(p.paths.contains_key("A"));
    }
}
