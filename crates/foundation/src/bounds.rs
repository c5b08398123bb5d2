use std::fmt;

/// Margin added on every side of the data extent when framing the map.
pub const DISPLAY_MARGIN: f64 = 0.05;

/// Running min/max fold over 2D coordinates.
///
/// Starts empty (`+inf`/`-inf`); `finish` only yields a box once at least one
/// coordinate has been observed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundsAccumulator {
    min: [f64; 2],
    max: [f64; 2],
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
    }

    pub fn is_empty(&self) -> bool {
        !(self.min[0].is_finite()
            && self.min[1].is_finite()
            && self.max[0].is_finite()
            && self.max[1].is_finite())
    }

    pub fn finish(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        Some(BoundingBox::from_extent(self.min, self.max))
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned box over a set of coordinates.
///
/// `width`/`height` are stored alongside the extent and always equal
/// `max - min` on their axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn from_extent(min: [f64; 2], max: [f64; 2]) -> Self {
        Self {
            min_x: min[0],
            min_y: min[1],
            max_x: max[0],
            max_y: max[1],
            width: max[0] - min[0],
            height: max[1] - min[1],
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ]
    }

    /// Expands the box by `fraction` of its width/height on every side.
    pub fn with_margin(&self, fraction: f64) -> ViewFrame {
        let mx = self.width * fraction;
        let my = self.height * fraction;
        ViewFrame {
            x: self.min_x - mx,
            y: self.min_y - my,
            width: self.width + 2.0 * mx,
            height: self.height + 2.0 * my,
        }
    }
}

/// Display frame in source coordinates (an SVG `viewBox`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewFrame {
    /// Frame used before any geometry is available.
    pub fn placeholder() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 800.0,
        }
    }
}

impl fmt::Display for ViewFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}
