//! # Size-Derived Layout Metrics
//!
//! All pixel measurements of the dial derive from a single number: the widget
//! size. [`LayoutMetrics`] is an immutable snapshot of those measurements and
//! [`LayoutModel`] keeps the snapshot for the current size, rebuilding it
//! wholesale whenever the size changes.
//!
//! ## Derivation
//! For a widget of `size` pixels (the widget is always square):
//! - **Diameter**: `size - 3`, leaving a margin for the outer ring stroke
//! - **Radius**: `diameter / 2`
//! - **Unit scale**: `size / 100`, the base unit for strokes, tick length and font
//! - **Tick length**: `5 * unit`
//! - **Hands**: hour = `radius / 2`, minute = second = `radius - 10 * unit`
//! - **Strokes**: thin = `max(1, unit / 2)`, medium = `3 * thin`, thick = `5 * thin`
//! - **Font size**: `10 * unit`
//!
//! All divisions are integer divisions. Sizes too small to hold a dial clamp
//! every length to zero instead of going negative.

use crate::unit_circle::Pos;
use serde::Serialize;

/// Margin reserved around the face for the outer ring stroke.
const RING_MARGIN: i32 = 3;

/// Offset of the face disc from the widget's top-left corner.
const FACE_ORIGIN: Pos = Pos::new(1, 1);

/// Stroke widths used by ticks, hands and the ring. All strokes use round
/// caps and round joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StrokeWidths {
    pub thin: u32,
    pub medium: u32,
    pub thick: u32,
}

/// Snapshot of every size-dependent measurement of the dial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutMetrics {
    /// Raw widget size the metrics were derived from
    pub size: i32,
    /// Diameter of the face disc (`size - 3`)
    pub diameter: i32,
    pub radius: i32,
    /// Top-left corner of the face disc's bounding square
    pub origin: Pos,
    pub center: Pos,
    /// Base stroke unit (`size / 100`)
    pub unit_scale: i32,
    pub tick_length: i32,
    pub hour_hand_length: i32,
    pub minute_hand_length: i32,
    pub second_hand_length: i32,
    pub strokes: StrokeWidths,
    /// Nominal label font height in pixels
    pub font_size: u32,
}

impl LayoutMetrics {
    /// Derive the full metric set for a widget of `size` pixels.
    ///
    /// Pure function of `size`; values below the practical range yield a
    /// degenerate (zero radius) but valid layout.
    pub fn recompute(size: i32) -> Self {
        let diameter = (size - RING_MARGIN).max(0);
        let radius = diameter / 2;
        let unit_scale = (size / 100).max(0);

        let tick_length = 5 * unit_scale;
        let hour_hand_length = radius / 2;
        let minute_hand_length = (radius - 10 * unit_scale).max(0);

        let thin = (unit_scale / 2).max(1) as u32;

        Self {
            size,
            diameter,
            radius,
            origin: FACE_ORIGIN,
            center: Pos::new(FACE_ORIGIN.x + radius, FACE_ORIGIN.y + radius),
            unit_scale,
            tick_length,
            hour_hand_length,
            minute_hand_length,
            second_hand_length: minute_hand_length,
            strokes: StrokeWidths {
                thin,
                medium: 3 * thin,
                thick: 5 * thin,
            },
            font_size: (unit_scale * 10) as u32,
        }
    }
}

/// Holds the metrics for the widget's current size.
///
/// Metrics are rebuilt only when [`LayoutModel::resize`] sees a new size;
/// repeated paints at the same size reuse the cached snapshot.
#[derive(Clone, Debug)]
pub struct LayoutModel {
    metrics: LayoutMetrics,
}

impl LayoutModel {
    pub fn new(size: i32) -> Self {
        Self {
            metrics: LayoutMetrics::recompute(size),
        }
    }

    /// Update the widget size. Returns `true` if the metrics were rebuilt.
    pub fn resize(&mut self, size: i32) -> bool {
        if size == self.metrics.size {
            return false;
        }
        self.metrics = LayoutMetrics::recompute(size);
        true
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_size_403() {
        let m = LayoutMetrics::recompute(403);
        assert_eq!(m.diameter, 400);
        assert_eq!(m.radius, 200);
        assert_eq!(m.unit_scale, 4);
        assert_eq!(m.tick_length, 20);
        assert_eq!(m.hour_hand_length, 100);
        assert_eq!(m.minute_hand_length, 160);
        assert_eq!(m.second_hand_length, 160);
        assert_eq!(
            m.strokes,
            StrokeWidths {
                thin: 2,
                medium: 6,
                thick: 10
            }
        );
        assert_eq!(m.font_size, 40);
        assert_eq!(m.center, Pos::new(201, 201));
    }

    #[test]
    fn test_default_size_400() {
        let m = LayoutMetrics::recompute(400);
        assert_eq!(m.diameter, 397);
        assert_eq!(m.radius, 198);
        assert_eq!(m.unit_scale, 4);
        assert_eq!(m.center, Pos::new(199, 199));
    }

    #[test]
    fn test_radius_rule_over_full_range() {
        for size in 1..=2048 {
            let m = LayoutMetrics::recompute(size);
            assert!(m.radius >= 0, "negative radius at size {size}");
            if size >= 3 {
                assert_eq!(m.radius, (size - 3) / 2, "radius mismatch at size {size}");
            } else {
                assert_eq!(m.radius, 0);
            }
            assert!(m.tick_length >= 0);
            assert!(m.hour_hand_length >= 0);
            assert!(m.minute_hand_length >= 0);
            assert!(m.strokes.thin >= 1);
        }
    }

    #[test]
    fn test_small_sizes_use_minimum_thin_stroke() {
        // unit scale 1 -> 1/2 == 0 -> clamped to 1
        let m = LayoutMetrics::recompute(150);
        assert_eq!(m.unit_scale, 1);
        assert_eq!(m.strokes.thin, 1);
        assert_eq!(m.strokes.medium, 3);
        assert_eq!(m.strokes.thick, 5);
        assert_eq!(m.font_size, 10);
    }

    #[test]
    fn test_degenerate_sizes_do_not_panic() {
        for size in [-10, 0, 1, 2, 3] {
            let m = LayoutMetrics::recompute(size);
            assert_eq!(m.radius, 0);
            assert_eq!(m.diameter.max(0), m.diameter);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        for size in [100, 403, 777, 2048] {
            assert_eq!(LayoutMetrics::recompute(size), LayoutMetrics::recompute(size));
        }
    }

    #[test]
    fn test_model_rebuilds_only_on_size_change() {
        let mut model = LayoutModel::new(400);
        assert!(!model.resize(400));
        assert_eq!(model.metrics().size, 400);

        assert!(model.resize(420));
        assert_eq!(*model.metrics(), LayoutMetrics::recompute(420));
    }
}
