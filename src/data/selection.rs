use super::model::XySeries;

// ---------------------------------------------------------------------------
// View window: the rectangle the user is looking at in the plot
// ---------------------------------------------------------------------------

/// A rectangle in data coordinates. Corners may arrive in either order from
/// the plot; [`ViewWindow::normalized`] orders them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl ViewWindow {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Same window with `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            x1: self.x0.max(self.x1),
            y0: self.y0.min(self.y1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Smallest window containing every point, or `None` for an empty series.
    pub fn bounding(series: &XySeries) -> Option<Self> {
        let mut points = series.points();
        let (x, y) = points.next()?;
        let init = Self::new(x, x, y, y);
        Some(points.fold(init, |w, (x, y)| Self {
            x0: w.x0.min(x),
            x1: w.x1.max(x),
            y0: w.y0.min(y),
            y1: w.y1.max(y),
        }))
    }

    /// Inclusive containment test against the normalized window.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let w = self.normalized();
        x >= w.x0 && x <= w.x1 && y >= w.y0 && y <= w.y1
    }

    /// Points of `series` inside the window, in their original order.
    pub fn select(&self, series: &XySeries) -> XySeries {
        let w = self.normalized();
        let mut out = XySeries::default();
        for (x, y) in series.points().filter(|&(x, y)| w.contains(x, y)) {
            out.push(x, y);
        }
        out
    }

    /// Whether two windows match within `tol` relative to the window size.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        let sx = (a.x1 - a.x0).abs().max(f64::MIN_POSITIVE);
        let sy = (a.y1 - a.y0).abs().max(f64::MIN_POSITIVE);
        (a.x0 - b.x0).abs() <= tol * sx
            && (a.x1 - b.x1).abs() <= tol * sx
            && (a.y0 - b.y0).abs() <= tol * sy
            && (a.y1 - b.y1).abs() <= tol * sy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> XySeries {
        let mut s = XySeries::default();
        for &(x, y) in points {
            s.push(x, y);
        }
        s
    }

    #[test]
    fn test_normalized_swaps_reversed_corners() {
        let w = ViewWindow::new(10.0, 2.0, 5.0, -1.0).normalized();
        assert_eq!(w, ViewWindow::new(2.0, 10.0, -1.0, 5.0));
    }

    #[test]
    fn test_select_is_inclusive_and_ordered() {
        let s = series(&[(0.0, 100.0), (1.0, 60.0), (2.0, 35.0), (3.0, 20.0)]);
        let picked = ViewWindow::new(3.0, 1.0, 20.0, 60.0).select(&s);
        assert_eq!(picked.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(picked.y, vec![60.0, 35.0, 20.0]);
    }

    #[test]
    fn test_select_filters_on_y_too() {
        let s = series(&[(0.0, 100.0), (1.0, 60.0)]);
        assert!(ViewWindow::new(0.0, 1.0, 0.0, 50.0).select(&s).is_empty());
    }

    #[test]
    fn test_bounding() {
        let s = series(&[(1.0, 5.0), (-2.0, 7.0), (4.0, 3.0)]);
        assert_eq!(
            ViewWindow::bounding(&s),
            Some(ViewWindow::new(-2.0, 4.0, 3.0, 7.0))
        );
        assert_eq!(ViewWindow::bounding(&XySeries::default()), None);
    }

    #[test]
    fn test_approx_eq_tolerates_jitter() {
        let a = ViewWindow::new(0.0, 100.0, 0.0, 10.0);
        let b = ViewWindow::new(0.0001, 100.0, 0.0, 10.00001);
        assert!(a.approx_eq(&b, 1e-4));
        assert!(!a.approx_eq(&ViewWindow::new(5.0, 100.0, 0.0, 10.0), 1e-4));
    }
}
