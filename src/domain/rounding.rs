//! Directional price rounding to a tick size.

/// Rounding direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ceiling,
    Floor,
}

/// Tolerance, in steps, under which a value counts as an exact multiple.
const SNAP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rounding {
    pub direction: Direction,
    pub decimals: u32,
}

impl Rounding {
    pub fn ceiling(decimals: u32) -> Self {
        Self {
            direction: Direction::Ceiling,
            decimals,
        }
    }

    pub fn floor(decimals: u32) -> Self {
        Self {
            direction: Direction::Floor,
            decimals,
        }
    }

    /// Moves `value` onto a multiple of `step` in this direction, then trims
    /// the result to `decimals` places in the same direction.
    pub fn round(&self, value: f64, step: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let scale = 10f64.powi(self.decimals as i32);
        if step <= 0.0 {
            return self.snap(value * scale) / scale;
        }
        let snapped = self.snap(value / step) * step;
        self.snap(snapped * scale) / scale
    }

    fn snap(&self, units: f64) -> f64 {
        let nearest = units.round();
        // Large unit counts carry more float error than the fixed tolerance.
        let tolerance = SNAP_TOLERANCE.max(nearest.abs() * 16.0 * f64::EPSILON);
        if (units - nearest).abs() < tolerance {
            return nearest;
        }
        match self.direction {
            Direction::Ceiling => units.ceil(),
            Direction::Floor => units.floor(),
        }
    }
}
