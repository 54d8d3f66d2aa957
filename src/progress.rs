//! Scroll progress and indicator visibility.

use crate::geometry::Geometry;

/// Percentage of the scrollable range consumed, in `[0, 100]`.
///
/// A document that does not overflow the viewport reports 0.
pub fn progress(geometry: &Geometry) -> f64 {
    let range = geometry.scroll_range();
    if range <= 0.0 {
        return 0.0;
    }
    let pct = geometry.scroll_offset / range * 100.0;
    if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 }
}

/// The indicator shows once the page has scrolled past `threshold_px`.
pub fn is_visible(geometry: &Geometry, threshold_px: f64) -> bool {
    geometry.scroll_offset > threshold_px
}

/// True when two readings differ by more than `epsilon` percentage points.
pub fn progress_changed(old: f64, new: f64, epsilon: f64) -> bool {
    (new - old).abs() > epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfway_through_the_scroll_range() {
        let g = Geometry::new(2100.0, 800.0, 5000.0);
        assert!((progress(&g) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_documents_report_zero() {
        assert_eq!(progress(&Geometry::new(0.0, 800.0, 800.0)), 0.0);
        assert_eq!(progress(&Geometry::new(40.0, 900.0, 600.0)), 0.0);
    }

    #[test]
    fn overscroll_is_clamped() {
        assert_eq!(progress(&Geometry::new(6000.0, 800.0, 5000.0)), 100.0);
    }

    #[test]
    fn progress_is_monotone_and_bounded() {
        let (viewport, document) = (733.0, 9_871.0);
        let mut previous = -1.0;
        let mut offset = 0.0;
        while offset <= document - viewport {
            let pct = progress(&Geometry::new(offset, viewport, document));
            assert!((0.0..=100.0).contains(&pct), "offset={offset} pct={pct}");
            assert!(pct >= previous, "progress must not decrease at offset={offset}");
            previous = pct;
            offset += 17.3;
        }
        let end = progress(&Geometry::new(document - viewport, viewport, document));
        assert_eq!(end, 100.0);
    }

    #[test]
    fn visibility_threshold_is_exclusive() {
        assert!(!is_visible(&Geometry::new(300.0, 800.0, 5000.0), 300.0));
        assert!(is_visible(&Geometry::new(300.5, 800.0, 5000.0), 300.0));
    }

    #[test]
    fn sub_epsilon_jitter_is_not_a_change() {
        assert!(!progress_changed(42.0, 42.005, 0.01));
        assert!(progress_changed(42.0, 42.5, 0.01));
    }
}
