//! # Unit-Circle Lookup Table
//!
//! Every tick and hand on the dial is placed by scaling one of 360 precomputed
//! unit vectors, so the frame loop never calls into trigonometry.
//!
//! ## Orientation
//! - **Index 0** points straight up (12 o'clock)
//! - **Indices increase clockwise**: 90 = 3 o'clock, 180 = 6 o'clock, 270 = 9 o'clock
//! - **Storage**: entries keep the mathematical convention (y grows upward);
//!   [`UnitCircleTable::point`] flips y when converting to screen space

use serde::Serialize;
use std::f64::consts::PI;

/// Number of whole-degree entries in the table.
pub const DEGREES: usize = 360;

/// A single `(cos θ, sin θ)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UnitVector {
    pub x: f64,
    pub y: f64,
}

/// A pixel position in screen space (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Immutable table of 360 unit vectors, built once and shared for the
/// lifetime of the renderer.
#[derive(Clone, Debug)]
pub struct UnitCircleTable {
    entries: Box<[UnitVector]>,
}

impl UnitCircleTable {
    pub fn new() -> Self {
        let entries = (0..DEGREES)
            .map(|i| {
                let rad = PI / 2.0 - i as f64 * PI / 180.0;
                UnitVector {
                    x: rad.cos(),
                    y: rad.sin(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Unit vector for degree index `degree` (0..360).
    ///
    /// Panics if `degree >= 360`; callers reduce angles before lookup.
    pub fn get(&self, degree: usize) -> UnitVector {
        self.entries[degree]
    }

    /// Screen position `length` pixels from `center` in direction `degree`.
    ///
    /// Each scaled component is truncated toward zero before it is added to
    /// the center, so symmetric positions land on symmetric pixels.
    pub fn point(&self, center: Pos, length: i32, degree: usize) -> Pos {
        let unit = self.get(degree);
        let dx = (length as f64 * unit.x) as i32;
        let dy = (length as f64 * unit.y) as i32;
        Pos::new(center.x + dx, center.y - dy)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitVector> {
        self.entries.iter()
    }
}

impl Default for UnitCircleTable {
    fn default() -> Self {
        Self::new()
    }
}
