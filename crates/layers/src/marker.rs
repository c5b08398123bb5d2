use foundation::BoundingBox;

pub const COUNTRY_MARKER_RADIUS: f64 = 2.0;

/// Clickable circle standing for the whole country.
///
/// Sits to the right of and below the anchor region, clamped so it stays
/// inside the map frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CountryMarker {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl CountryMarker {
    pub fn place(bounds: &BoundingBox, anchor: Option<&BoundingBox>) -> Self {
        let w = bounds.width;
        let h = bounds.height;
        let [ax, ay] = anchor
            .map(BoundingBox::center)
            .unwrap_or([bounds.max_x, bounds.min_y]);

        let cx = (bounds.max_x + w * 0.015).max((bounds.max_x + w * 0.045).min(ax + w * 0.12));
        let cy = (bounds.min_y + h * 0.01).max((bounds.max_y - h * 0.01).min(ay - h * 0.08));

        Self {
            cx,
            cy,
            r: COUNTRY_MARKER_RADIUS,
        }
    }
}
