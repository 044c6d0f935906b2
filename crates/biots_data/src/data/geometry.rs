use serde::{Deserialize, Serialize};

/// World position of a cell or resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn distance_to_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Point `distance` away along `angle`. Negative distances step backwards.
    #[must_use]
    pub fn offset(&self, angle: f64, distance: f64) -> Self {
        let unit = Self::from_angle(angle);
        Self {
            x: self.x + unit.x * distance,
            y: self.y + unit.y * distance,
        }
    }
}
