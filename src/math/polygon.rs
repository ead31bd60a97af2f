//! Closed 2D polygon used for terrain chunks, mountain tiles and branch shells.

use crate::core::types::DVec2;
use crate::math::Aabb;

/// Closed polygon; the last point connects back to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<DVec2>,
}

impl Polygon {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    /// Close a left-to-right profile line into a filled polygon reaching
    /// down to `bottom` (screen y).
    pub fn below_profile(profile: &[DVec2], bottom: f64) -> Self {
        let mut points = profile.to_vec();
        if let (Some(first), Some(last)) = (profile.first(), profile.last()) {
            points.push(DVec2::new(last.x, bottom));
            points.push(DVec2::new(first.x, bottom));
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three points encloses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
    }

    /// Signed shoelace area. Positive for counter-clockwise in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.perp_dot(b);
        }
        sum * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Even-odd point containment.
    pub fn contains(&self, p: DVec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_profile() {
        let profile = [DVec2::new(0.0, 5.0), DVec2::new(5.0, 2.0), DVec2::new(10.0, 5.0)];
        let poly = Polygon::below_profile(&profile, 10.0);
        assert_eq!(poly.len(), 5);
        assert_eq!(poly.points[3], DVec2::new(10.0, 10.0));
        assert_eq!(poly.points[4], DVec2::new(0.0, 10.0));
        assert!((poly.area() - 65.0).abs() < 1e-9);
        assert!(Polygon::below_profile(&[], 10.0).is_empty());
    }

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_area() {
        assert!((unit_square().area() - 1.0).abs() < 1e-12);
        assert!(unit_square().signed_area() > 0.0);
    }

    #[test]
    fn test_contains() {
        let sq = unit_square();
        assert!(sq.contains(DVec2::new(0.5, 0.5)));
        assert!(!sq.contains(DVec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_degenerate() {
        let line = Polygon::new(vec![DVec2::ZERO, DVec2::ONE]);
        assert!(line.is_degenerate());
        assert_eq!(line.area(), 0.0);
        assert!(!line.contains(DVec2::splat(0.5)));
    }

    #[test]
    fn test_bounds() {
        let b = unit_square().bounds();
        assert_eq!(b.min, DVec2::ZERO);
        assert_eq!(b.max, DVec2::ONE);
    }
}
