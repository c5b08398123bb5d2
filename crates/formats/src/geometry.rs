use serde_json::{Map, Value};

/// One closed boundary loop, as `[x, y]` pairs in source order.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// All rings in source order; multi-polygons are flattened.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            Geometry::Polygon(rings) => Box::new(rings.iter()),
            Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

/// A feature that was present in the payload but could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryIssue {
    pub feature_index: usize,
    pub reason: String,
}

impl std::fmt::Display for GeometryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feature {}: {}", self.feature_index, self.reason)
    }
}

/// Polygon data for one region, decoded from a GeoJSON FeatureCollection.
///
/// Features without geometry are dropped silently. Features with an
/// unsupported or malformed geometry are dropped and reported in `issues`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryDocument {
    pub features: Vec<Feature>,
    pub issues: Vec<GeometryIssue>,
}

#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
    NotAnObject,
    FeaturesNotAnArray,
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Json(e) => write!(f, "JSON parse error: {e}"),
            DocumentError::NotAnObject => write!(f, "expected a GeoJSON object"),
            DocumentError::FeaturesNotAnArray => write!(f, "`features` must be an array"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl GeometryDocument {
    pub fn from_geojson_str(payload: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(payload).map_err(DocumentError::Json)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_slice(payload: &[u8]) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_slice(payload).map_err(DocumentError::Json)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, DocumentError> {
        let obj = value.as_object().ok_or(DocumentError::NotAnObject)?;
        let features_val = match obj.get("features") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(v) => v.as_array().ok_or(DocumentError::FeaturesNotAnArray)?,
        };

        let mut doc = Self::default();
        for (index, feat_val) in features_val.iter().enumerate() {
            let Some(feat_obj) = feat_val.as_object() else {
                doc.issues.push(GeometryIssue {
                    feature_index: index,
                    reason: "feature must be an object".to_string(),
                });
                continue;
            };

            let geometry_val = match feat_obj.get("geometry") {
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };

            match parse_geometry(geometry_val) {
                Ok(Some(geometry)) => doc.features.push(Feature {
                    properties: feat_obj
                        .get("properties")
                        .and_then(|v| v.as_object())
                        .cloned()
                        .unwrap_or_default(),
                    geometry,
                }),
                Ok(None) => {}
                Err(reason) => doc.issues.push(GeometryIssue {
                    feature_index: index,
                    reason,
                }),
            }
        }

        Ok(doc)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rings with at least one position; zero-position rings draw nothing.
    pub fn ring_count(&self) -> usize {
        self.features
            .iter()
            .map(|f| f.geometry.rings().filter(|r| !r.is_empty()).count())
            .sum()
    }
}

/// `Ok(None)` means "no usable coordinates, skip quietly".
fn parse_geometry(value: &Value) -> Result<Option<Geometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;

    let coords = match obj.get("coordinates") {
        None | Some(Value::Null) => return Ok(None),
        Some(c) => c,
    };

    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" => Ok(Some(Geometry::Polygon(parse_polygon(coords)?))),
        "MultiPolygon" => Ok(Some(Geometry::MultiPolygon(parse_multi_polygon(coords)?))),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<[f64; 2], String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok([x, y])
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{DocumentError, Geometry, GeometryDocument};

    #[test]
    fn parses_polygon_feature() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"nombre": "A"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10]]]}
            }]
        }"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 1);
        assert!(doc.issues.is_empty());
        let Geometry::Polygon(rings) = &doc.features[0].geometry else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0], vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        assert_eq!(doc.features[0].properties["nombre"], "A");
    }

    #[test]
    fn multi_polygon_flattens_rings_in_order() {
        let payload = r#"{"features": [{"geometry": {"type": "MultiPolygon", "coordinates": [
            [[[1,1],[2,1],[2,2]]],
            [[[5,5],[6,5],[6,6]], [[5.2,5.2],[5.4,5.2],[5.4,5.4]]]
        ]}}]}"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        assert_eq!(doc.ring_count(), 3);
        let firsts: Vec<[f64; 2]> = doc.features[0].geometry.rings().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![[1.0, 1.0], [5.0, 5.0], [5.2, 5.2]]);
    }

    #[test]
    fn position_free_rings_are_not_counted() {
        let payload = r#"{"features": [
            {"geometry": {"type": "Polygon", "coordinates": [[]]}},
            {"geometry": {"type": "MultiPolygon", "coordinates": [[[], [[1,1],[2,1],[2,2]]]]}}
        ]}"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 2);
        assert_eq!(doc.ring_count(), 1);
    }

    #[test]
    fn features_without_geometry_are_skipped_quietly() {
        let payload = r#"{"features": [
            {"type": "Feature", "properties": {}},
            {"type": "Feature", "geometry": null},
            {"type": "Feature", "geometry": {"type": "Polygon"}}
        ]}"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        assert!(doc.is_empty());
        assert!(doc.issues.is_empty());
    }

    #[test]
    fn unsupported_and_malformed_geometry_is_reported() {
        let payload = r#"{"features": [
            {"geometry": {"type": "Point", "coordinates": [1, 2]}},
            {"geometry": {"type": "Polygon", "coordinates": [[["a", 0]]]}},
            {"geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]]}}
        ]}"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 1);
        assert_eq!(doc.issues.len(), 2);
        assert_eq!(doc.issues[0].feature_index, 0);
        assert!(doc.issues[0].reason.contains("Point"));
        assert_eq!(doc.issues[1].feature_index, 1);
    }

    #[test]
    fn altitude_ordinate_is_ignored() {
        let payload = r#"{"features": [{"geometry": {"type": "Polygon",
            "coordinates": [[[1,2,300],[3,4,300],[5,6,300]]]}}]}"#;
        let doc = GeometryDocument::from_geojson_str(payload).expect("parse");
        let ring = doc.features[0].geometry.rings().next().expect("ring");
        assert_eq!(ring[1], [3.0, 4.0]);
    }

    #[test]
    fn empty_collection_and_missing_features_are_empty_documents() {
        let doc =
            GeometryDocument::from_geojson_str(r#"{"type":"FeatureCollection","features":[]}"#)
                .expect("parse");
        assert!(doc.is_empty());
        let doc = GeometryDocument::from_geojson_str("{}").expect("parse");
        assert!(doc.is_empty());
    }

    #[test]
    fn rejects_non_documents() {
        assert!(matches!(
            GeometryDocument::from_geojson_str("not json"),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            GeometryDocument::from_geojson_str("[1,2]"),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(
            GeometryDocument::from_geojson_str(r#"{"features": 3}"#),
            Err(DocumentError::FeaturesNotAnArray)
        ));
    }
}
